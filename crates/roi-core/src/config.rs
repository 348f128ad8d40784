//! YAML calculator configuration.

use crate::{
    default_scenarios, CurvePolicy, FunnelInputs, Period, Scenario, ValueMode,
    DEFAULT_HORIZON_MONTHS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("yaml error: {0}")]
    Yaml(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e.to_string())
    }
}

/// Calculator settings. Every field is optional in the file.
///
/// ```yaml
/// curve: linear
/// horizon_months: 12
/// value_mode: revenue
/// scenarios:
///   - { name: Cautious, lift_percent: 5 }
/// inputs:
///   investment: 5000
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub curve: CurvePolicy,
    pub horizon_months: u32,
    pub value_mode: ValueMode,
    pub period: Period,
    pub scenarios: Vec<Scenario>,
    /// Replaces the built-in adoption table for the discrete curve.
    pub discrete_table: Option<Vec<Decimal>>,
    pub inputs: FunnelInputs,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            curve: CurvePolicy::default(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            value_mode: ValueMode::default(),
            period: Period::default(),
            scenarios: default_scenarios(),
            discrete_table: None,
            inputs: FunnelInputs::default(),
        }
    }
}

impl CalculatorConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: CalculatorConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_months == 0 {
            return Err(ConfigError::Invalid(
                "horizon_months must be at least 1".into(),
            ));
        }
        if self.scenarios.is_empty() {
            return Err(ConfigError::Invalid("at least one scenario is required".into()));
        }
        crate::validate_funnel(&self.inputs).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(table) = &self.discrete_table {
            validate_table(table)?;
        }
        Ok(())
    }
}

/// An adoption table must start at 0, end at 1 and never decrease.
pub fn validate_table(table: &[Decimal]) -> Result<(), ConfigError> {
    match (table.first(), table.last()) {
        (Some(first), Some(last)) if *first == Decimal::ZERO && *last == Decimal::ONE => {}
        _ => {
            return Err(ConfigError::Invalid(
                "discrete_table must start at 0 and end at 1".into(),
            ))
        }
    }
    if table.windows(2).any(|w| w[1] < w[0]) {
        return Err(ConfigError::Invalid(
            "discrete_table must be non-decreasing".into(),
        ));
    }
    Ok(())
}

/// Read and validate a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CalculatorConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let cfg = CalculatorConfig::from_yaml_str(&text)?;
    debug!(path = %path.display(), curve = ?cfg.curve, horizon = cfg.horizon_months, "loaded config");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = CalculatorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, CalculatorConfig::default());
        assert_eq!(cfg.scenarios.len(), 3);
    }

    #[test]
    fn overrides_are_applied() {
        let text = r#"
curve: linear
horizon_months: 18
value_mode: revenue
period: yearly
scenarios:
  - { name: Cautious, lift_percent: 5 }
inputs:
  investment: 5000
  margin_percent: 30
"#;
        let cfg = CalculatorConfig::from_yaml_str(text).unwrap();
        assert_eq!(cfg.curve, CurvePolicy::Linear);
        assert_eq!(cfg.horizon_months, 18);
        assert_eq!(cfg.value_mode, ValueMode::Revenue);
        assert_eq!(cfg.period, Period::Yearly);
        assert_eq!(cfg.scenarios, vec![Scenario::new("Cautious", Decimal::from(5u32))]);
        assert_eq!(cfg.inputs.investment, Decimal::from(5_000u32));
        assert_eq!(cfg.inputs.margin_percent, Decimal::from(30u32));
        assert_eq!(cfg.inputs.sessions, Decimal::from(350_000u32));
    }

    #[test]
    fn zero_horizon_is_invalid() {
        let err = CalculatorConfig::from_yaml_str("horizon_months: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn table_must_reach_one() {
        let err = CalculatorConfig::from_yaml_str("discrete_table: [0, 0.5, 0.9]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = CalculatorConfig::from_yaml_str("discrete_table: [0, 0.6, 0.5, 1]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let cfg = CalculatorConfig::from_yaml_str("discrete_table: [0, 0.5, 1]").unwrap();
        assert_eq!(cfg.discrete_table.map(|t| t.len()), Some(3));
    }

    #[test]
    fn unknown_curve_is_a_yaml_error() {
        let err = CalculatorConfig::from_yaml_str("curve: cubic").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/nonexistent/roi.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

#![deny(warnings)]

//! Core domain models and invariants for the ROI calculator.
//!
//! This crate defines the serializable inputs and results shared by the
//! forecast engine, the companion economics helpers and the front ends, plus
//! validation helpers that reject out-of-domain input at the boundary.

mod config;

pub use config::{load_config, validate_table, CalculatorConfig, ConfigError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Horizon used by every forecast panel.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Convert a percentage (e.g. 45 for 45%) to a fraction (0.45).
pub fn percent(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

/// What a forecast accumulates month over month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    /// Incremental revenue scaled by gross margin.
    #[default]
    Profit,
    /// Incremental revenue as-is.
    Revenue,
}

/// Shape of the lift adoption curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurvePolicy {
    /// Fixed month-by-month adoption table.
    #[default]
    Discrete,
    /// Zero in the first month, then a straight line to full lift.
    Linear,
}

/// Reporting period for the headline results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    /// Number of months one period spans.
    pub fn multiplier(self) -> Decimal {
        match self {
            Period::Monthly => Decimal::ONE,
            Period::Yearly => Decimal::from(12u32),
        }
    }

    /// Label used in result captions ("Monthly" / "Yearly").
    pub fn label(self) -> &'static str {
        match self {
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }
}

/// A named forecast scenario at a fixed target lift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name, e.g. "Conservative".
    pub name: String,
    /// Target conversion lift in percent.
    pub lift_percent: Decimal,
}

impl Scenario {
    pub fn new(name: impl Into<String>, lift_percent: Decimal) -> Self {
        Self {
            name: name.into(),
            lift_percent,
        }
    }
}

/// Conservative (10%), target (20%) and best case (40%) scenarios.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("Conservative", Decimal::from(10u32)),
        Scenario::new("Target", Decimal::from(20u32)),
        Scenario::new("Best Case", Decimal::from(40u32)),
    ]
}

/// Steady-state business metrics for one forecast run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastInputs {
    /// Baseline monthly revenue (>= 0).
    pub monthly_revenue: Decimal,
    /// Gross margin in percent; <= 0 means unknown and forces revenue mode.
    pub gross_margin_percent: Decimal,
    /// Monthly optimisation spend (>= 0, 0 means none).
    pub monthly_investment: Decimal,
    /// Lift reached at the end of the ramp, in percent. May be negative.
    pub target_lift_percent: Decimal,
    /// Number of months to project (> 0).
    pub horizon_months: u32,
    /// Requested value mode.
    pub value_mode: ValueMode,
}

impl ForecastInputs {
    /// The value mode actually applied: without margin data only revenue can be counted.
    pub fn effective_mode(&self) -> ValueMode {
        if self.gross_margin_percent <= Decimal::ZERO {
            ValueMode::Revenue
        } else {
            self.value_mode
        }
    }

    /// Same inputs with a different target lift.
    pub fn with_lift(&self, target_lift_percent: Decimal) -> Self {
        Self {
            target_lift_percent,
            ..self.clone()
        }
    }
}

/// One month of a projected scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// 1-based month index.
    pub month: u32,
    pub cumulative_investment: Decimal,
    pub cumulative_value: Decimal,
    /// `cumulative_value - cumulative_investment`.
    pub net_value: Decimal,
    /// Incremental revenue earned in this month alone.
    pub incremental_revenue: Decimal,
    /// Value (profit or revenue) counted in this month alone.
    pub value: Decimal,
}

/// Complete projection of one scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// One point per month, in month order.
    pub points: Vec<MonthlyPoint>,
    /// Net value at the final month.
    pub year1_net_value: Decimal,
    /// Net value over cumulative investment in percent, 0 without investment.
    pub year1_roi_percent: Decimal,
    /// Mode the values were computed in after the margin fallback.
    pub value_mode: ValueMode,
}

impl ScenarioResult {
    /// Cumulative investment at the final month.
    pub fn total_investment(&self) -> Decimal {
        self.points
            .last()
            .map(|p| p.cumulative_investment)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Raw calculator form values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelInputs {
    /// Monthly sessions.
    pub sessions: Decimal,
    /// Baseline conversion rate in percent.
    pub conversion_rate_percent: Decimal,
    /// Target lift in percent.
    pub lift_percent: Decimal,
    /// Monthly revenue.
    pub revenue: Decimal,
    /// Monthly sales (orders).
    pub sales: Decimal,
    /// Average order value, derived from revenue and sales.
    pub average_order_value: Decimal,
    /// Gross margin in percent; 0 when unknown.
    pub margin_percent: Decimal,
    /// Current customer acquisition cost; 0 when unknown.
    pub cac: Decimal,
    /// Monthly optimisation investment; 0 when none.
    pub investment: Decimal,
}

impl Default for FunnelInputs {
    fn default() -> Self {
        Self {
            sessions: Decimal::from(350_000u32),
            conversion_rate_percent: Decimal::from(2u32),
            lift_percent: Decimal::from(20u32),
            revenue: Decimal::from(420_000u32),
            sales: Decimal::from(7_000u32),
            average_order_value: Decimal::from(60u32),
            margin_percent: Decimal::from(45u32),
            cac: Decimal::from(25u32),
            investment: Decimal::ZERO,
        }
    }
}

impl FunnelInputs {
    /// Forecast inputs for these form values at the form's lift.
    pub fn forecast_inputs(&self, horizon_months: u32, value_mode: ValueMode) -> ForecastInputs {
        ForecastInputs {
            monthly_revenue: self.revenue,
            gross_margin_percent: self.margin_percent,
            monthly_investment: self.investment,
            target_lift_percent: self.lift_percent,
            horizon_months,
            value_mode,
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A value lies outside the domain the calculations are defined on.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::InvalidInput {
            field,
            reason: "must be non-negative",
        });
    }
    Ok(())
}

/// Validate forecast inputs. Margin and lift may take any value.
pub fn validate_forecast_inputs(inputs: &ForecastInputs) -> Result<(), ValidationError> {
    if inputs.horizon_months == 0 {
        return Err(ValidationError::InvalidInput {
            field: "horizon_months",
            reason: "must be at least one month",
        });
    }
    non_negative("monthly_revenue", inputs.monthly_revenue)?;
    non_negative("monthly_investment", inputs.monthly_investment)?;
    Ok(())
}

/// Validate raw form values. Lift and margin may take any value.
pub fn validate_funnel(f: &FunnelInputs) -> Result<(), ValidationError> {
    non_negative("sessions", f.sessions)?;
    non_negative("conversion_rate_percent", f.conversion_rate_percent)?;
    non_negative("revenue", f.revenue)?;
    non_negative("sales", f.sales)?;
    non_negative("average_order_value", f.average_order_value)?;
    non_negative("cac", f.cac)?;
    non_negative("investment", f.investment)?;
    Ok(())
}

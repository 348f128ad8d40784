#![deny(warnings)]

//! Forecast engine: turns a target conversion lift into a month-by-month
//! projection of cumulative investment, cumulative value and net return.
//!
//! The lift is phased in along an adoption curve ([`LiftCurve`]). Two curves
//! are provided:
//! - [`DiscreteCurve`]: a fixed month table decelerating towards full lift
//! - [`LinearRamp`]: a research month at zero, then a straight line
//!
//! Incremental revenue is always measured against the unchanging baseline
//! revenue; it is never compounded month over month.

use roi_core::{
    percent, validate_forecast_inputs, validate_table, CalculatorConfig, ConfigError,
    CurvePolicy, ForecastInputs, MonthlyPoint, Scenario, ScenarioResult, ValidationError,
    ValueMode,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Fraction of the target lift realised by a given month.
///
/// Implementations must return 0 for month 1, 1 for the final month of the
/// horizon, and never decrease in between.
pub trait LiftCurve {
    /// `month` is 1-based and `horizon` is the total number of months projected.
    fn fraction(&self, month: u32, horizon: u32) -> Decimal;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Month-indexed adoption table.
///
/// Months past the end of the table clamp to full lift. Horizons shorter
/// than the table resample it by linear interpolation so the final month
/// still reaches full lift.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteCurve {
    table: Vec<Decimal>,
}

impl DiscreteCurve {
    /// Adoption table used by the calculator's 12-month forecast.
    pub fn standard() -> Self {
        Self {
            table: vec![
                Decimal::ZERO,
                Decimal::new(8, 2),
                Decimal::new(20, 2),
                Decimal::new(35, 2),
                Decimal::new(50, 2),
                Decimal::new(63, 2),
                Decimal::new(73, 2),
                Decimal::new(81, 2),
                Decimal::new(88, 2),
                Decimal::new(93, 2),
                Decimal::new(97, 2),
                Decimal::ONE,
            ],
        }
    }

    /// Build from a custom table (entry `i` is the fraction for month `i + 1`).
    pub fn from_table(table: Vec<Decimal>) -> Result<Self, ConfigError> {
        validate_table(&table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &[Decimal] {
        &self.table
    }

    fn resampled(&self, month: u32, horizon: u32) -> Decimal {
        let last = self.table.len() - 1;
        let pos = Decimal::from(month - 1) * Decimal::from(last as u64) / Decimal::from(horizon - 1);
        let base = pos.floor();
        let i = base.to_usize().unwrap_or(last).min(last);
        if i == last {
            return self.table[last];
        }
        let (lo, hi) = (self.table[i], self.table[i + 1]);
        lo + (hi - lo) * (pos - base)
    }
}

impl Default for DiscreteCurve {
    fn default() -> Self {
        Self::standard()
    }
}

impl LiftCurve for DiscreteCurve {
    fn fraction(&self, month: u32, horizon: u32) -> Decimal {
        if month <= 1 {
            return Decimal::ZERO;
        }
        if month >= horizon {
            return Decimal::ONE;
        }
        if horizon as usize >= self.table.len() {
            self.table
                .get(month as usize - 1)
                .copied()
                .unwrap_or(Decimal::ONE)
        } else {
            self.resampled(month, horizon)
        }
    }

    fn name(&self) -> &'static str {
        "discrete"
    }
}

/// Research month at zero lift, then `(m - 1) / (horizon - 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearRamp;

impl LiftCurve for LinearRamp {
    fn fraction(&self, month: u32, horizon: u32) -> Decimal {
        if month <= 1 || horizon <= 1 {
            return Decimal::ZERO;
        }
        if month >= horizon {
            return Decimal::ONE;
        }
        Decimal::from(month - 1) / Decimal::from(horizon - 1)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Incremental revenue for one month: `revenue * target_lift * fraction / 100`.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn monthly_incremental_revenue(
    revenue: Decimal,
    target_lift_percent: Decimal,
    fraction: Decimal,
) -> Option<Decimal> {
    let lift = percent(target_lift_percent.checked_mul(fraction)?);
    revenue.checked_mul(lift)
}

fn too_large(field: &'static str) -> ValidationError {
    ValidationError::InvalidInput {
        field,
        reason: "too large to project",
    }
}

/// Project one scenario along `curve`.
///
/// Rejects a zero horizon and negative revenue or investment, as well as
/// amounts whose running totals would not fit in a `Decimal`. Every other
/// combination yields a defined (possibly all-zero) series.
pub fn project<C: LiftCurve + ?Sized>(
    inputs: &ForecastInputs,
    curve: &C,
) -> Result<ScenarioResult, ValidationError> {
    validate_forecast_inputs(inputs)?;
    let mode = inputs.effective_mode();
    if mode != inputs.value_mode {
        debug!(margin = %inputs.gross_margin_percent, "no margin data, counting revenue");
    }
    let margin = percent(inputs.gross_margin_percent);

    let mut points = Vec::with_capacity(inputs.horizon_months as usize);
    let mut cumulative_investment = Decimal::ZERO;
    let mut cumulative_value = Decimal::ZERO;
    for month in 1..=inputs.horizon_months {
        cumulative_investment = cumulative_investment
            .checked_add(inputs.monthly_investment)
            .ok_or_else(|| too_large("monthly_investment"))?;
        let fraction = curve.fraction(month, inputs.horizon_months);
        let incremental_revenue = monthly_incremental_revenue(
            inputs.monthly_revenue,
            inputs.target_lift_percent,
            fraction,
        )
        .ok_or_else(|| too_large("monthly_revenue"))?;
        let value = match mode {
            ValueMode::Revenue => Some(incremental_revenue),
            ValueMode::Profit => incremental_revenue.checked_mul(margin),
        }
        .ok_or_else(|| too_large("gross_margin_percent"))?;
        cumulative_value = cumulative_value
            .checked_add(value)
            .ok_or_else(|| too_large("monthly_revenue"))?;
        let net_value = cumulative_value
            .checked_sub(cumulative_investment)
            .ok_or_else(|| too_large("monthly_investment"))?;
        points.push(MonthlyPoint {
            month,
            cumulative_investment,
            cumulative_value,
            net_value,
            incremental_revenue,
            value,
        });
    }

    let year1_net_value = points.last().map(|p| p.net_value).unwrap_or(Decimal::ZERO);
    let year1_roi_percent = if cumulative_investment > Decimal::ZERO {
        year1_net_value
            .checked_div(cumulative_investment)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| too_large("monthly_investment"))?
    } else {
        Decimal::ZERO
    };
    debug!(
        curve = curve.name(),
        lift = %inputs.target_lift_percent,
        months = inputs.horizon_months,
        ?mode,
        net = %year1_net_value,
        "projected scenario"
    );
    Ok(ScenarioResult {
        points,
        year1_net_value,
        year1_roi_percent,
        value_mode: mode,
    })
}

/// The forecast panel is only meaningful with both spend and margin data.
pub fn should_show_forecast(investment: Decimal, margin_percent: Decimal) -> bool {
    investment > Decimal::ZERO && margin_percent > Decimal::ZERO
}

/// A scenario together with its projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioForecast {
    pub scenario: Scenario,
    pub result: ScenarioResult,
}

/// Projects scenarios along a configured adoption curve.
pub struct ForecastEngine {
    curve: Box<dyn LiftCurve + Send + Sync>,
}

impl ForecastEngine {
    /// Engine using the built-in curve for `policy`.
    pub fn new(policy: CurvePolicy) -> Self {
        match policy {
            CurvePolicy::Discrete => Self::with_curve(DiscreteCurve::standard()),
            CurvePolicy::Linear => Self::with_curve(LinearRamp),
        }
    }

    pub fn with_curve<C: LiftCurve + Send + Sync + 'static>(curve: C) -> Self {
        Self {
            curve: Box::new(curve),
        }
    }

    /// Engine for a config's curve policy, honouring a custom discrete table.
    pub fn from_config(cfg: &CalculatorConfig) -> Result<Self, ConfigError> {
        match (cfg.curve, &cfg.discrete_table) {
            (CurvePolicy::Discrete, Some(table)) => {
                Ok(Self::with_curve(DiscreteCurve::from_table(table.clone())?))
            }
            (policy, _) => Ok(Self::new(policy)),
        }
    }

    pub fn curve(&self) -> &dyn LiftCurve {
        self.curve.as_ref()
    }

    pub fn project(&self, inputs: &ForecastInputs) -> Result<ScenarioResult, ValidationError> {
        project(inputs, self.curve.as_ref())
    }

    /// Run `base` once per scenario, substituting each scenario's lift.
    pub fn project_scenarios(
        &self,
        base: &ForecastInputs,
        scenarios: &[Scenario],
    ) -> Result<Vec<ScenarioForecast>, ValidationError> {
        scenarios
            .iter()
            .map(|s| {
                let result = self.project(&base.with_lift(s.lift_percent))?;
                Ok::<_, ValidationError>(ScenarioForecast {
                    scenario: s.clone(),
                    result,
                })
            })
            .collect()
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(CurvePolicy::default())
    }
}

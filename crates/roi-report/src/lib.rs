#![deny(warnings)]

//! Result reports: the "copy results" text block, a full plain-text summary
//! and a serializable JSON report.

pub mod format;

pub use format::{format_cac, format_compact, format_currency, format_percent, payback_text};

use chrono::NaiveDate;
use roi_core::{FunnelInputs, Period, Scenario, ValidationError, ValueMode};
use roi_econ::{break_even_lift, cac_improvement, CacImpact, PeriodSummary};
use roi_forecast::{should_show_forecast, ForecastEngine, ScenarioForecast};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The four-line block placed on the clipboard by "Copy Results".
pub fn clipboard_text(summary: &PeriodSummary) -> String {
    let p = summary.period.label();
    format!(
        "Current {p} Revenue: {}\nProjected {p} Revenue: {}\nIncremental {p} Revenue: +{}\nIncremental {p} Profit: {}",
        format_currency(summary.current_revenue),
        format_currency(summary.projected_revenue),
        format_currency(summary.incremental_revenue),
        format_currency(summary.incremental_profit),
    )
}

/// Everything the calculator shows for one set of inputs.
#[derive(Clone, Debug, Serialize)]
pub struct ResultsReport {
    pub generated_on: NaiveDate,
    pub inputs: FunnelInputs,
    pub summary: PeriodSummary,
    /// Present when a CAC was entered and the lift leaves customers to acquire.
    pub cac: Option<CacImpact>,
    pub break_even_lift_percent: Decimal,
    /// Empty unless both investment and margin are positive.
    pub forecasts: Vec<ScenarioForecast>,
}

impl ResultsReport {
    pub fn build(
        inputs: &FunnelInputs,
        period: Period,
        engine: &ForecastEngine,
        scenarios: &[Scenario],
        horizon_months: u32,
        value_mode: ValueMode,
        generated_on: NaiveDate,
    ) -> Result<Self, ReportError> {
        roi_core::validate_funnel(inputs)?;
        let cac = if inputs.cac > Decimal::ZERO {
            match cac_improvement(inputs.cac, inputs.lift_percent) {
                Ok(impact) => Some(impact),
                Err(err) => {
                    warn!(%err, "skipping CAC impact");
                    None
                }
            }
        } else {
            None
        };
        let forecasts = if should_show_forecast(inputs.investment, inputs.margin_percent) {
            engine.project_scenarios(&inputs.forecast_inputs(horizon_months, value_mode), scenarios)?
        } else {
            Vec::new()
        };
        Ok(Self {
            generated_on,
            inputs: inputs.clone(),
            summary: PeriodSummary::compute(inputs, period),
            cac,
            break_even_lift_percent: break_even_lift(
                inputs.investment,
                inputs.margin_percent,
                inputs.sessions,
                inputs.conversion_rate_percent,
                inputs.average_order_value,
            ),
            forecasts,
        })
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering of the results panel, CAC impact and forecast cards.
    pub fn render_text(&self) -> String {
        let s = &self.summary;
        let p = s.period.label();
        let mut lines = vec![
            format!("ROI report ({})", self.generated_on),
            String::new(),
            format!("Current {p} Revenue:     {}", format_currency(s.current_revenue)),
            format!("Projected {p} Revenue:   {}", format_currency(s.projected_revenue)),
            format!("Incremental {p} Revenue: +{}", format_currency(s.incremental_revenue)),
        ];
        let profit = if self.inputs.margin_percent > Decimal::ZERO {
            format_currency(s.incremental_profit)
        } else {
            "—".to_string()
        };
        lines.push(format!("Incremental {p} Profit:  {profit}"));
        if self.inputs.investment > Decimal::ZERO {
            lines.push(format!("Net {p} Profit:          {}", format_currency(s.net_profit)));
            lines.push(format!("ROI:                     {}", format_percent(s.roi_percent, 1)));
            if s.payback_months > Decimal::ZERO {
                lines.push(format!("Payback:                 {}", payback_text(s.payback_months)));
            }
            if self.break_even_lift_percent > Decimal::ZERO {
                lines.push(format!(
                    "Break-even Lift:         {}",
                    format_percent(self.break_even_lift_percent, 2)
                ));
            }
        }
        if let Some(c) = &self.cac {
            // A negative lift raises CAC
            let reduction = if c.reduction < Decimal::ZERO {
                format!("+{}", format_cac(c.reduction.abs()))
            } else {
                format!("-{}", format_cac(c.reduction))
            };
            lines.extend([
                String::new(),
                "CAC Impact".to_string(),
                format!("Current CAC:  {}", format_cac(c.current)),
                format!("Improved CAC: {}", format_cac(c.improved)),
                format!(
                    "Reduction:    {reduction} ({})",
                    format_percent(c.reduction_percent, 1)
                ),
            ]);
        }
        if let Some(first) = self.forecasts.first() {
            lines.push(String::new());
            lines.push(format!("{}-Month Forecast", first.result.points.len()));
            lines.extend(self.forecasts.iter().map(|f| {
                format!(
                    "{} Scenario: {} | {}% conversion lift · {} ROI",
                    f.scenario.name,
                    format_compact(f.result.year1_net_value),
                    f.scenario.lift_percent.normalize(),
                    format_percent(f.result.year1_roi_percent, 1)
                )
            }));
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

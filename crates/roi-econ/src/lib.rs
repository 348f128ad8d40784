#![deny(warnings)]

//! Economic helpers that sit alongside the forecast.
//!
//! This module provides validated utilities for:
//! - Incremental revenue and profit from a conversion lift
//! - Customer acquisition cost (CAC) improvement
//! - Break-even lift for a monthly investment
//! - Period summaries (net profit, ROI, payback)
//! - Keeping sessions, conversion rate and sales consistent ([`sync`])

pub mod sync;

use roi_core::{percent, FunnelInputs, Period};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// A lift of -100% or less leaves nothing to divide by.
    #[error("lift must be greater than -100%, got {0}%")]
    InvalidLift(Decimal),
}

/// Round to whole units, halves away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly revenue and profit added by a lift.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncrementalValue {
    pub revenue: Decimal,
    pub profit: Decimal,
}

/// Incremental value of a lift on the current funnel.
///
/// revenue = sessions * cr * lift * aov (cr and lift in percent),
/// profit = revenue * margin.
///
/// Example:
/// let v = incremental_value(350_000.into(), 2.into(), 20.into(), 60.into(), 45.into());
/// assert_eq!(v.revenue, Decimal::from(84_000));
pub fn incremental_value(
    sessions: Decimal,
    conversion_rate_percent: Decimal,
    lift_percent: Decimal,
    average_order_value: Decimal,
    margin_percent: Decimal,
) -> IncrementalValue {
    let revenue = sessions
        * percent(conversion_rate_percent)
        * percent(lift_percent)
        * average_order_value;
    IncrementalValue {
        revenue,
        profit: revenue * percent(margin_percent),
    }
}

/// Change in customer acquisition cost from a lift.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacImpact {
    pub current: Decimal,
    pub improved: Decimal,
    pub reduction: Decimal,
    pub reduction_percent: Decimal,
}

/// Converting more of the same traffic spreads acquisition spend over more
/// customers: improved = cac / (1 + lift).
///
/// A non-positive CAC means "unknown" and yields an all-zero improvement.
pub fn cac_improvement(cac: Decimal, lift_percent: Decimal) -> Result<CacImpact, EconError> {
    let divisor = Decimal::ONE + percent(lift_percent);
    if divisor <= Decimal::ZERO {
        return Err(EconError::InvalidLift(lift_percent));
    }
    let improved = if cac > Decimal::ZERO {
        cac / divisor
    } else {
        Decimal::ZERO
    };
    let reduction = cac - improved;
    let reduction_percent = if cac.is_zero() {
        Decimal::ZERO
    } else {
        reduction / cac * Decimal::ONE_HUNDRED
    };
    Ok(CacImpact {
        current: cac,
        improved,
        reduction,
        reduction_percent,
    })
}

/// Lift (percent) at which incremental profit covers the monthly investment.
///
/// Defined only when investment, margin, sessions, conversion rate and AOV
/// are all positive; returns 0 otherwise.
pub fn break_even_lift(
    investment: Decimal,
    margin_percent: Decimal,
    sessions: Decimal,
    conversion_rate_percent: Decimal,
    average_order_value: Decimal,
) -> Decimal {
    let all_positive = [
        investment,
        margin_percent,
        sessions,
        conversion_rate_percent,
        average_order_value,
    ]
    .iter()
    .all(|v| *v > Decimal::ZERO);
    if !all_positive {
        return Decimal::ZERO;
    }
    let required_revenue = investment / percent(margin_percent);
    let baseline_revenue = sessions * percent(conversion_rate_percent) * average_order_value;
    required_revenue / baseline_revenue * Decimal::ONE_HUNDRED
}

/// Months of incremental profit needed to recover one month of investment.
/// Returns 0 when there is no investment or no profit to recover it from.
pub fn payback_months(investment: Decimal, incremental_profit: Decimal) -> Decimal {
    if investment > Decimal::ZERO && incremental_profit > Decimal::ZERO {
        investment / incremental_profit
    } else {
        Decimal::ZERO
    }
}

/// Headline results scaled to a reporting period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub current_revenue: Decimal,
    pub projected_revenue: Decimal,
    pub incremental_revenue: Decimal,
    pub incremental_profit: Decimal,
    pub net_profit: Decimal,
    pub roi_percent: Decimal,
    /// Always expressed in months, independent of the period.
    pub payback_months: Decimal,
}

impl PeriodSummary {
    pub fn compute(inputs: &FunnelInputs, period: Period) -> Self {
        let k = period.multiplier();
        let inc = incremental_value(
            inputs.sessions,
            inputs.conversion_rate_percent,
            inputs.lift_percent,
            inputs.average_order_value,
            inputs.margin_percent,
        );
        let net_profit = (inc.profit - inputs.investment) * k;
        let roi_percent = if inputs.investment > Decimal::ZERO {
            net_profit / (inputs.investment * k) * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        Self {
            period,
            current_revenue: inputs.revenue * k,
            projected_revenue: (inputs.revenue + inc.revenue) * k,
            incremental_revenue: inc.revenue * k,
            incremental_profit: inc.profit * k,
            net_profit,
            roi_percent,
            payback_months: payback_months(inputs.investment, inc.profit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn incremental_value_for_default_funnel() {
        let v = incremental_value(d(350_000), d(2), d(20), d(60), d(45));
        assert_eq!(v.revenue, d(84_000));
        assert_eq!(v.profit, d(37_800));
    }

    #[test]
    fn cac_improvement_at_twenty_percent() {
        let c = cac_improvement(d(25), d(20)).unwrap();
        assert_eq!(c.improved.round_dp(2), Decimal::new(2083, 2));
        assert_eq!(c.reduction.round_dp(2), Decimal::new(417, 2));
        assert_eq!(c.reduction_percent.round_dp(2), Decimal::new(1667, 2));
    }

    #[test]
    fn unknown_cac_is_zero() {
        let c = cac_improvement(Decimal::ZERO, d(20)).unwrap();
        assert_eq!(c.improved, Decimal::ZERO);
        assert_eq!(c.reduction, Decimal::ZERO);
        assert_eq!(c.reduction_percent, Decimal::ZERO);
    }

    #[test]
    fn total_loss_lift_is_rejected() {
        assert_eq!(
            cac_improvement(d(25), d(-100)),
            Err(EconError::InvalidLift(d(-100)))
        );
        assert!(cac_improvement(d(25), d(-50)).is_ok());
    }

    #[test]
    fn break_even_covers_investment() {
        // 5_000 / 0.45 = 11_111.11 revenue needed on a 420_000 baseline
        let lift = break_even_lift(d(5_000), d(45), d(350_000), d(2), d(60));
        let v = incremental_value(d(350_000), d(2), lift, d(60), d(45));
        assert!((v.profit - d(5_000)).abs() < Decimal::new(1, 10));
        assert_eq!(lift.round_dp(4), Decimal::new(26455, 4));
    }

    #[test]
    fn break_even_needs_positive_inputs() {
        assert_eq!(break_even_lift(d(0), d(45), d(350_000), d(2), d(60)), Decimal::ZERO);
        assert_eq!(break_even_lift(d(5_000), d(0), d(350_000), d(2), d(60)), Decimal::ZERO);
        assert_eq!(break_even_lift(d(5_000), d(45), d(350_000), d(2), d(0)), Decimal::ZERO);
    }

    #[test]
    fn monthly_summary_with_investment() {
        let inputs = FunnelInputs {
            investment: d(5_000),
            ..FunnelInputs::default()
        };
        let s = PeriodSummary::compute(&inputs, Period::Monthly);
        assert_eq!(s.current_revenue, d(420_000));
        assert_eq!(s.projected_revenue, d(504_000));
        assert_eq!(s.net_profit, d(32_800));
        assert_eq!(s.roi_percent, d(656));
        assert_eq!(s.payback_months.round_dp(4), Decimal::new(1323, 4));
    }

    #[test]
    fn yearly_summary_scales_but_keeps_roi() {
        let inputs = FunnelInputs {
            investment: d(5_000),
            ..FunnelInputs::default()
        };
        let m = PeriodSummary::compute(&inputs, Period::Monthly);
        let y = PeriodSummary::compute(&inputs, Period::Yearly);
        assert_eq!(y.incremental_revenue, m.incremental_revenue * d(12));
        assert_eq!(y.net_profit, m.net_profit * d(12));
        assert_eq!(y.roi_percent, m.roi_percent);
        assert_eq!(y.payback_months, m.payback_months);
    }

    #[test]
    fn no_investment_means_no_roi_or_payback() {
        let s = PeriodSummary::compute(&FunnelInputs::default(), Period::Monthly);
        assert_eq!(s.roi_percent, Decimal::ZERO);
        assert_eq!(s.payback_months, Decimal::ZERO);
        assert_eq!(s.net_profit, d(37_800));
    }

    #[test]
    fn round_whole_rounds_halves_up() {
        assert_eq!(round_whole(Decimal::new(25, 1)), d(3));
        assert_eq!(round_whole(Decimal::new(24, 1)), d(2));
    }

    proptest! {
        #[test]
        fn cac_never_increases_with_positive_lift(cents in 1i64..1_000_000, lift in 0i64..50_000) {
            let cac = Decimal::new(cents, 2);
            let c = cac_improvement(cac, Decimal::new(lift, 2)).unwrap();
            prop_assert!(c.improved <= cac);
            prop_assert!(c.reduction >= Decimal::ZERO);
            prop_assert!(c.reduction_percent < Decimal::ONE_HUNDRED);
        }

        #[test]
        fn incremental_revenue_scales_with_lift(sessions in 0i64..10_000_000, lift in 0i64..10_000, k in 1i64..10) {
            let a = incremental_value(d(sessions), d(2), Decimal::new(lift, 2), d(60), d(45));
            let b = incremental_value(d(sessions), d(2), Decimal::new(lift * k, 2), d(60), d(45));
            prop_assert_eq!(a.revenue * d(k), b.revenue);
        }
    }
}

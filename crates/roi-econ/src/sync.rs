//! Three-way sync between sessions, conversion rate and sales.
//!
//! Whichever field was edited last is authoritative; the others follow in a
//! single pass. Revenue follows sales at the current average order value, and
//! the average order value is always re-derived from revenue and sales.

use crate::round_whole;
use roi_core::{percent, FunnelInputs};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A single user edit to the funnel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FunnelEdit {
    Sessions(Decimal),
    ConversionRate(Decimal),
    Sales(Decimal),
    Revenue(Decimal),
}

fn refresh_aov(f: &mut FunnelInputs) {
    if f.sales > Decimal::ZERO && f.revenue > Decimal::ZERO {
        f.average_order_value = f.revenue / f.sales;
    }
}

fn sales_from_rate(f: &mut FunnelInputs) {
    if f.sessions > Decimal::ZERO && f.conversion_rate_percent > Decimal::ZERO {
        f.sales = round_whole(f.sessions * percent(f.conversion_rate_percent));
        revenue_from_sales(f);
    }
}

fn revenue_from_sales(f: &mut FunnelInputs) {
    if f.average_order_value > Decimal::ZERO {
        f.revenue = round_whole(f.sales * f.average_order_value);
    }
}

/// Apply `edit` and propagate it to the dependent fields.
///
/// Applying the same edit twice gives the same result as applying it once.
pub fn apply_edit(inputs: &FunnelInputs, edit: FunnelEdit) -> FunnelInputs {
    let mut f = inputs.clone();
    refresh_aov(&mut f);
    match edit {
        FunnelEdit::Sessions(v) => {
            f.sessions = v;
            sales_from_rate(&mut f);
        }
        FunnelEdit::ConversionRate(v) => {
            f.conversion_rate_percent = v;
            sales_from_rate(&mut f);
        }
        FunnelEdit::Sales(v) => {
            f.sales = v;
            if f.sessions > Decimal::ZERO && v > Decimal::ZERO {
                f.conversion_rate_percent = v / f.sessions * Decimal::ONE_HUNDRED;
            }
            if v > Decimal::ZERO {
                revenue_from_sales(&mut f);
            }
        }
        FunnelEdit::Revenue(v) => {
            f.revenue = v;
        }
    }
    refresh_aov(&mut f);
    trace!(?edit, sales = %f.sales, revenue = %f.revenue, aov = %f.average_order_value, "synced funnel");
    f
}

/// Re-derive sales from sessions and conversion rate, then AOV.
///
/// Used after loading values that were not entered one at a time.
pub fn derive_sales(inputs: &FunnelInputs) -> FunnelInputs {
    let mut f = inputs.clone();
    if f.sessions > Decimal::ZERO && f.conversion_rate_percent > Decimal::ZERO {
        f.sales = round_whole(f.sessions * percent(f.conversion_rate_percent));
    }
    refresh_aov(&mut f);
    f
}

//! Display formatting for money, percentages and payback periods.

use rust_decimal::{Decimal, RoundingStrategy};

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn sign(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Whole currency units with thousands separators: `$420,000`, `-$1,234`.
pub fn format_currency(value: Decimal) -> String {
    let whole = round(value, 0);
    let digits = format!("{:.0}", whole.abs());
    format!("{}${}", sign(whole), group_thousands(&digits))
}

/// Currency with cents: `$20.83`.
pub fn format_cac(value: Decimal) -> String {
    let v = round(value, 2);
    format!("{}${:.2}", sign(v), v.abs())
}

/// Compact currency for scenario cards: `$1.23M`, `$84k`, `$950`.
pub fn format_compact(value: Decimal) -> String {
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::ONE_THOUSAND;
    let abs = value.abs();
    let body = if abs >= million {
        format!("{:.2}M", round(abs / million, 2))
    } else if abs >= thousand {
        format!("{:.0}k", round(abs / thousand, 0))
    } else {
        format!("{:.0}", round(abs, 0))
    };
    let s = if body == "0" { "" } else { sign(value) };
    format!("{s}${body}")
}

/// Percentage with `dp` decimals: `16.7%`.
pub fn format_percent(value: Decimal, dp: u32) -> String {
    let v = round(value, dp);
    let p = dp as usize;
    format!("{:.*}%", p, v)
}

/// Human wording for a payback period given in months.
pub fn payback_text(months: Decimal) -> String {
    let twelve = Decimal::from(12);
    if months < Decimal::ONE {
        format!("{:.0} days", round(months * Decimal::from(30), 0))
    } else if months < twelve {
        format!("{:.1} months", round(months, 1))
    } else {
        format!("{:.1} years", round(months / twelve, 1))
    }
}

#![deny(warnings)]

//! Shareable links: calculator inputs as URL query parameters.

use roi_core::{validate_funnel, FunnelInputs, ValidationError};
use roi_econ::sync::derive_sales;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum ShareError {
    #[error("`{key}` is not a number: {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn field<'a>(inputs: &'a mut FunnelInputs, key: &str) -> Option<&'a mut Decimal> {
    Some(match key {
        "sessions" => &mut inputs.sessions,
        "cr" => &mut inputs.conversion_rate_percent,
        "lift" => &mut inputs.lift_percent,
        "revenue" => &mut inputs.revenue,
        "sales" => &mut inputs.sales,
        "margin" => &mut inputs.margin_percent,
        "cac" => &mut inputs.cac,
        "investment" => &mut inputs.investment,
        _ => return None,
    })
}

/// Encode inputs as `sessions=..&cr=..&..`.
pub fn to_query(inputs: &FunnelInputs) -> String {
    [
        ("sessions", inputs.sessions),
        ("cr", inputs.conversion_rate_percent),
        ("lift", inputs.lift_percent),
        ("revenue", inputs.revenue),
        ("sales", inputs.sales),
        ("margin", inputs.margin_percent),
        ("cac", inputs.cac),
        ("investment", inputs.investment),
    ]
    .iter()
    .map(|(k, v)| format!("{k}={}", v.normalize()))
    .collect::<Vec<_>>()
    .join("&")
}

/// Overlay the values in `query` on `defaults`.
///
/// Unknown keys and empty values are skipped. When anything was loaded,
/// sales and average order value are re-derived so the funnel is consistent.
pub fn from_query(query: &str, defaults: &FunnelInputs) -> Result<FunnelInputs, ShareError> {
    let mut inputs = defaults.clone();
    let mut loaded = false;
    let query = query.trim().trim_start_matches('?');
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if value.is_empty() {
            continue;
        }
        let Some(slot) = field(&mut inputs, key) else {
            warn!(key, "ignoring unknown share parameter");
            continue;
        };
        *slot = Decimal::from_str(value).map_err(|_| ShareError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        loaded = true;
    }
    if loaded {
        inputs = derive_sales(&inputs);
    }
    validate_funnel(&inputs)?;
    Ok(inputs)
}

/// Append the encoded inputs to `base`.
pub fn share_url(base: &str, inputs: &FunnelInputs) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{}", to_query(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_encode_compactly() {
        assert_eq!(
            to_query(&FunnelInputs::default()),
            "sessions=350000&cr=2&lift=20&revenue=420000&sales=7000&margin=45&cac=25&investment=0"
        );
    }

    #[test]
    fn defaults_roundtrip() {
        let d = FunnelInputs::default();
        assert_eq!(from_query(&to_query(&d), &d).unwrap(), d);
    }

    #[test]
    fn loading_rederives_sales() {
        let d = FunnelInputs::default();
        let f = from_query("?sessions=100000&cr=3&investment=2500", &d).unwrap();
        assert_eq!(f.sales, Decimal::from(3_000));
        assert_eq!(f.average_order_value, Decimal::from(140));
        assert_eq!(f.investment, Decimal::from(2_500));
        assert_eq!(f.margin_percent, d.margin_percent);
    }

    #[test]
    fn empty_and_unknown_are_skipped() {
        let d = FunnelInputs::default();
        assert_eq!(from_query("", &d).unwrap(), d);
        assert_eq!(from_query("utm_source=x&lift=&cac", &d).unwrap(), d);
    }

    #[test]
    fn every_key_loads_its_field() {
        let d = FunnelInputs::default();
        let f = from_query("lift=35&margin=30&cac=40&investment=1200&revenue=500000", &d).unwrap();
        assert_eq!(f.lift_percent, Decimal::from(35));
        assert_eq!(f.margin_percent, Decimal::from(30));
        assert_eq!(f.cac, Decimal::from(40));
        assert_eq!(f.investment, Decimal::from(1_200));
        assert_eq!(f.revenue, Decimal::from(500_000));
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = from_query("lift=lots", &FunnelInputs::default()).unwrap_err();
        assert_eq!(
            err,
            ShareError::InvalidNumber {
                key: "lift".into(),
                value: "lots".into()
            }
        );
    }

    #[test]
    fn negative_money_is_rejected() {
        let err = from_query("investment=-5", &FunnelInputs::default()).unwrap_err();
        assert!(matches!(err, ShareError::Invalid(_)));
    }

    #[test]
    fn url_joins_existing_query() {
        let d = FunnelInputs::default();
        assert!(share_url("https://example.com/roi", &d).starts_with("https://example.com/roi?sessions="));
        assert!(share_url("https://example.com/roi?ref=a", &d).starts_with("https://example.com/roi?ref=a&sessions="));
    }

    proptest! {
        #[test]
        fn form_values_survive_a_link(lift in -5_000i64..50_000, margin in 0i64..10_000, cac in 0i64..100_000, inv in 0i64..10_000_000) {
            let d = FunnelInputs::default();
            let f = FunnelInputs {
                lift_percent: Decimal::new(lift, 2),
                margin_percent: Decimal::new(margin, 2),
                cac: Decimal::new(cac, 2),
                investment: Decimal::new(inv, 2),
                ..d.clone()
            };
            prop_assert_eq!(from_query(&to_query(&f), &d).unwrap(), f);
        }
    }
}

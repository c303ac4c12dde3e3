//! Cross-rate derivation through a pivot currency.

use chrono::Utc;

use rates_types::{CrossRateError, Rate};

/// Derives `base -> target` rates from pivot-relative rates.
///
/// `pivot_rates` must all share the same pivot as `base` and quote
/// currency-per-pivot, so `p(target) / p(base)` is target-per-base. With
/// `p(X) = 2.0` and `p(Y) = 3.0`, `X -> Y` is `1.5`.
///
/// A missing base is fatal. A missing target is skipped, but at least one
/// target must resolve.
pub fn calculate_cross_rates(
    pivot_rates: &[Rate],
    base: &str,
    targets: &[String],
) -> Result<Vec<Rate>, CrossRateError> {
    let base_rate =
        find_rate(pivot_rates, base).ok_or_else(|| CrossRateError::BaseNotFound(base.to_string()))?;

    let fetched = Utc::now();
    let rates: Vec<Rate> = targets
        .iter()
        .filter_map(|target| {
            let target_rate = find_rate(pivot_rates, target)?;
            Some(Rate {
                base: base.to_string(),
                target: target.clone(),
                value: target_rate.value / base_rate.value,
                date: target_rate.date,
                source: target_rate.source.clone(),
                fetched,
                calculated: true,
            })
        })
        .collect();

    if rates.is_empty() {
        return Err(CrossRateError::NoTargetsFound);
    }

    Ok(rates)
}

fn find_rate<'a>(rates: &'a [Rate], currency: &str) -> Option<&'a Rate> {
    rates.iter().find(|r| r.target == currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pivot(target: &str, value: f64) -> Rate {
        Rate::direct(
            "EUR",
            target,
            value,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            "ECB",
            Utc::now(),
        )
    }

    fn targets(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_cross_rate_is_quotient() {
        let rates = vec![pivot("X", 2.0), pivot("Y", 3.0)];

        let cross = calculate_cross_rates(&rates, "X", &targets(&["Y"])).unwrap();

        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].base, "X");
        assert_eq!(cross[0].target, "Y");
        assert!((cross[0].value - 1.5).abs() < 1e-12);
        assert!(cross[0].calculated);
        assert_eq!(cross[0].source, "ECB");
        assert_eq!(cross[0].date, rates[1].date);
    }

    #[test]
    fn test_both_directions_multiply_to_one() {
        let rates = vec![pivot("USD", 1.0821), pivot("JPY", 161.37)];

        let ab = calculate_cross_rates(&rates, "USD", &targets(&["JPY"])).unwrap();
        let ba = calculate_cross_rates(&rates, "JPY", &targets(&["USD"])).unwrap();

        assert!((ab[0].value * ba[0].value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_base_fails() {
        let rates = vec![pivot("Y", 3.0)];

        let err = calculate_cross_rates(&rates, "X", &targets(&["Y"])).unwrap_err();

        assert_eq!(err, CrossRateError::BaseNotFound("X".into()));
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let rates = vec![pivot("X", 2.0), pivot("Y", 3.0)];

        let cross = calculate_cross_rates(&rates, "X", &targets(&["Q", "Y"])).unwrap();

        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].target, "Y");
    }

    #[test]
    fn test_no_targets_found() {
        let rates = vec![pivot("X", 2.0)];

        let err = calculate_cross_rates(&rates, "X", &targets(&["Q", "Z"])).unwrap_err();

        assert_eq!(err, CrossRateError::NoTargetsFound);
    }

    #[test]
    fn test_output_follows_target_order() {
        let rates = vec![pivot("X", 2.0), pivot("Y", 3.0), pivot("Z", 4.0)];

        let cross = calculate_cross_rates(&rates, "X", &targets(&["Z", "Y"])).unwrap();

        let order: Vec<&str> = cross.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(order, vec!["Z", "Y"]);
    }
}

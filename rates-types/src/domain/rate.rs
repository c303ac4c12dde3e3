//! Exchange rate domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One observed or derived exchange value for a currency pair on one date.
///
/// `value` is expressed as units of `target` per one unit of `base`.
/// The natural key is `(date, base, target)`; the store keeps at most one
/// row per key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rate {
    pub base: String,
    pub target: String,
    pub value: f64,
    /// Calendar day the rate applies to.
    pub date: NaiveDate,
    /// Provider that produced or calculated the rate.
    pub source: String,
    /// When the record was produced, for auditing. Distinct from `date`.
    pub fetched: DateTime<Utc>,
    /// `true` when derived through a pivot currency.
    pub calculated: bool,
}

impl Rate {
    /// Creates a rate taken directly from a provider.
    pub fn direct(
        base: impl Into<String>,
        target: impl Into<String>,
        value: f64,
        date: NaiveDate,
        source: impl Into<String>,
        fetched: DateTime<Utc>,
    ) -> Self {
        Self {
            base: base.into(),
            target: target.into(),
            value,
            date,
            source: source.into(),
            fetched,
            calculated: false,
        }
    }

    /// Returns true if the date was never set.
    ///
    /// The unset date is `NaiveDate::default()`, which is what
    /// `Rate::default()` carries.
    pub fn has_zero_date(&self) -> bool {
        self.date == NaiveDate::default()
    }
}

/// Inclusive span of stored dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_direct_rate_is_not_calculated() {
        let rate = Rate::direct("EUR", "USD", 1.08, day(2025, 3, 14), "ECB", Utc::now());
        assert!(!rate.calculated);
        assert_eq!(rate.date, day(2025, 3, 14));
        assert_eq!(rate.base, "EUR");
    }

    #[test]
    fn test_default_rate_has_zero_date() {
        assert!(Rate::default().has_zero_date());
        let rate = Rate::direct("EUR", "USD", 1.0, day(2025, 1, 2), "ECB", Utc::now());
        assert!(!rate.has_zero_date());
    }
}

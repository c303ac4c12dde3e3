//! Structural validation of rate sets.
//!
//! Every rate passes through here before it is returned by a provider or
//! handed to the store.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use rates_types::{Rate, ValidationError};

/// Upstream data may be stamped up to a day ahead (time zones, publication
/// lag). Anything beyond that is rejected.
const FUTURE_TOLERANCE_HOURS: i64 = 24;

/// Validates against the current clock. Fails on the first violation.
pub fn validate_rates(rates: &[Rate]) -> Result<(), ValidationError> {
    validate_rates_at(rates, Utc::now())
}

/// Validates with an explicit `now`.
pub fn validate_rates_at(rates: &[Rate], now: DateTime<Utc>) -> Result<(), ValidationError> {
    if rates.is_empty() {
        return Err(ValidationError::Empty);
    }

    let max_allowed = now + TimeDelta::hours(FUTURE_TOLERANCE_HOURS);

    rates
        .iter()
        .enumerate()
        .try_for_each(|(index, rate)| validate_rate(index, rate, max_allowed))
}

fn validate_rate(
    index: usize,
    rate: &Rate,
    max_allowed: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if rate.value.is_nan() || rate.value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            index,
            value: rate.value,
        });
    }

    if rate.base.is_empty() {
        return Err(ValidationError::EmptyBase { index });
    }

    if rate.target.is_empty() {
        return Err(ValidationError::EmptyTarget { index });
    }

    if rate.base == rate.target {
        return Err(ValidationError::SelfConversion {
            index,
            currency: rate.base.clone(),
        });
    }

    if rate.has_zero_date() {
        return Err(ValidationError::ZeroDate { index });
    }

    if rate.date.and_time(NaiveTime::MIN).and_utc() > max_allowed {
        return Err(ValidationError::FutureDate {
            index,
            date: rate.date,
        });
    }

    if rate.source.is_empty() {
        return Err(ValidationError::EmptySource { index });
    }

    Ok(())
}

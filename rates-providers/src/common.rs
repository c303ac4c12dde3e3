//! Fetch-policy steps shared by the adapters.

use rates_types::{ProviderError, Rate, RateRequest};

use crate::cross_rate::calculate_cross_rates;
use crate::validate::validate_rates;

/// Validates a direct fetch before handing it back.
pub(crate) fn validated(provider: &'static str, rates: Vec<Rate>) -> Result<Vec<Rate>, ProviderError> {
    validate_rates(&rates).map_err(|source| ProviderError::Validation { provider, source })?;
    Ok(rates)
}

/// Validates pivot-relative rates and derives the requested cross rates.
pub(crate) fn cross_from_pivot(
    provider: &'static str,
    pivot_rates: Vec<Rate>,
    req: &RateRequest,
) -> Result<Vec<Rate>, ProviderError> {
    let pivot_rates = validated(provider, pivot_rates)?;

    let rates = calculate_cross_rates(&pivot_rates, &req.base, &req.targets)
        .map_err(|source| ProviderError::Calculation { provider, source })?;

    tracing::debug!(
        provider,
        base = %req.base,
        derived = rates.len(),
        requested = req.targets.len(),
        "calculated cross rates"
    );

    Ok(rates)
}

/// Three ASCII upper-case letters.
pub(crate) fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

pub(crate) fn parse_error(provider: &'static str, reason: impl Into<String>) -> ProviderError {
    ProviderError::Parse {
        provider,
        reason: reason.into(),
    }
}

//! Error types for the rate ingester.

use chrono::NaiveDate;

/// Failures of a single HTTP GET.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("creating request: {0}")]
    Request(String),

    #[error("executing request: {0}")]
    Execute(String),

    #[error("http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("reading response: {0}")]
    Body(String),
}

/// Structural problems in a rate set. Each variant names the offending index.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no rates returned")]
    Empty,

    #[error("rate[{index}]: invalid value {value:.4}")]
    InvalidValue { index: usize, value: f64 },

    #[error("rate[{index}]: empty base currency")]
    EmptyBase { index: usize },

    #[error("rate[{index}]: empty target currency")]
    EmptyTarget { index: usize },

    #[error("rate[{index}]: base and target are the same ({currency})")]
    SelfConversion { index: usize, currency: String },

    #[error("rate[{index}]: zero date")]
    ZeroDate { index: usize },

    #[error("rate[{index}]: future date {date}")]
    FutureDate { index: usize, date: NaiveDate },

    #[error("rate[{index}]: empty source")]
    EmptySource { index: usize },
}

/// Terminal failures of the cross-rate calculation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrossRateError {
    #[error("base currency {0} not found")]
    BaseNotFound(String),

    #[error("no target currencies found")]
    NoTargetsFound,
}

/// Provider-level errors. Every variant carries the provider name.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("fetching from {provider}: {source}")]
    Fetch {
        provider: &'static str,
        source: TransportError,
    },

    #[error("parsing {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },

    #[error("validating {provider} rates: {source}")]
    Validation {
        provider: &'static str,
        source: ValidationError,
    },

    #[error("calculating {provider} cross rates: {source}")]
    Calculation {
        provider: &'static str,
        source: CrossRateError,
    },
}

/// Store-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_index() {
        let err = ValidationError::InvalidValue {
            index: 2,
            value: -1.0,
        };
        assert_eq!(err.to_string(), "rate[2]: invalid value -1.0000");
    }

    #[test]
    fn test_provider_error_keeps_context() {
        let err = ProviderError::Fetch {
            provider: "ECB",
            source: TransportError::Status {
                status: 503,
                body: "down".into(),
            },
        };
        assert_eq!(err.to_string(), "fetching from ECB: http 503: down");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_not_found() {
        assert!(StoreError::NotFound("x".into()).is_not_found());
        assert!(!StoreError::Database("x".into()).is_not_found());
    }
}

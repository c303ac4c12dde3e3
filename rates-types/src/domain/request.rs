//! Fetch request model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Input to a provider fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRequest {
    pub base: String,
    /// Ordered; the output of a fetch follows the upstream order, not this one.
    pub targets: Vec<String>,
    /// `None` means the most recent available observation.
    pub date: Option<NaiveDate>,
}

impl RateRequest {
    /// Request for the most recent rates. Codes are upper-cased.
    pub fn latest<I, S>(base: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            base: normalize_code(base),
            targets: targets
                .into_iter()
                .map(|t| normalize_code(t.as_ref()))
                .collect(),
            date: None,
        }
    }

    /// Request for rates on one exact date.
    pub fn on<I, S>(base: &str, targets: I, date: NaiveDate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            date: Some(date),
            ..Self::latest(base, targets)
        }
    }

    /// Base followed by the targets, as sent in a batched cross fetch.
    pub fn all_currencies(&self) -> Vec<&str> {
        std::iter::once(self.base.as_str())
            .chain(self.targets.iter().map(String::as_str))
            .collect()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

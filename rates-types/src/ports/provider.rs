//! Exchange rate provider port.
//!
//! Implementations fetch from one upstream source and normalize the
//! payload into [`Rate`]s.

use crate::domain::{Rate, RateRequest};
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable identifier, used as `Rate::source`.
    fn name(&self) -> &'static str;

    /// Currency the upstream natively quotes against.
    fn pivot(&self) -> &'static str;

    /// Fetches rates for `req.base` against every target.
    ///
    /// When the base is not the pivot the rates are derived through it and
    /// come back with `calculated = true`.
    async fn fetch_rates(&self, req: &RateRequest) -> Result<Vec<Rate>, ProviderError>;

    /// Hand-curated list of non-pivot currencies the source publishes.
    fn supported_currencies(&self) -> &'static [&'static str];

    /// Returns true if the pivot or the curated list covers `currency`.
    fn supports(&self, currency: &str) -> bool {
        currency == self.pivot() || self.supported_currencies().contains(&currency)
    }
}

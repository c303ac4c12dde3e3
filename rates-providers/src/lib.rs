//! # Rate Providers
//!
//! Adapters that fetch exchange rates from upstream central-bank sources and
//! normalize them into [`Rate`](rates_types::Rate)s.
//!
//! Each provider has one pivot currency. A request whose base is the pivot
//! is served directly; any other base is derived through the pivot with
//! [`calculate_cross_rates`]. Everything a provider returns has passed
//! [`validate_rates`].
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use rates_providers::{Provider, ProviderKind, ReqwestTransport};
//! use rates_types::{RateProvider, RateRequest};
//!
//! let transport = Arc::new(ReqwestTransport::with_default_timeout()?);
//! let ecb = Provider::new(ProviderKind::Ecb, transport);
//! let rates = ecb.fetch_rates(&RateRequest::latest("USD", ["JPY", "GBP"])).await?;
//! ```

pub mod bank_of_canada;
pub mod cross_rate;
pub mod ecb;
pub mod provider;
pub mod transport;
pub mod validate;

mod common;

#[cfg(test)]
mod test_support;

pub use bank_of_canada::BankOfCanadaProvider;
pub use cross_rate::calculate_cross_rates;
pub use ecb::EcbProvider;
pub use provider::{Provider, ProviderKind, build_providers};
pub use transport::{DEFAULT_TIMEOUT, ReqwestTransport};
pub use validate::{validate_rates, validate_rates_at};

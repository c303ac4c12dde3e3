//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The service layer depends on these traits, not concrete implementations.

mod provider;
mod store;
mod transport;

pub use provider::RateProvider;
pub use store::RateStore;
pub use transport::HttpTransport;

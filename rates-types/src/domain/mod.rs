//! Domain models for the rate ingester.

pub mod rate;
pub mod request;

pub use rate::{DateRange, Rate};
pub use request::RateRequest;

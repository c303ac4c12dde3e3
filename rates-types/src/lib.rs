//! # Rates Types
//!
//! Domain types and port traits for the exchange-rate ingester.
//! This crate has ZERO external IO dependencies - only data structures,
//! error types, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Pure domain types (Rate, RateRequest, DateRange)
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Transport, provider and store error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{DateRange, Rate, RateRequest};
pub use error::{CrossRateError, ProviderError, StoreError, TransportError, ValidationError};
pub use ports::{HttpTransport, RateProvider, RateStore};

//! # Rates Service
//!
//! Application service layer for the rate ingester.
//!
//! ## Architecture
//!
//! - `service` - Orchestrates provider fetches, validation and persistence
//! - `error` - Service-level error taxonomy
//!
//! The service is generic over `S: RateStore`, allowing different store
//! implementations to be injected.

pub mod error;
pub mod service;


pub use error::ServiceError;
pub use service::{AsOfRates, IngestReport, ProviderOutcome, RateService};

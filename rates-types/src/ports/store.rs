//! Rate store port trait.
//!
//! Adapters (SQLite, in-memory test doubles) implement this trait.

use chrono::NaiveDate;

use crate::domain::{DateRange, Rate};
use crate::error::StoreError;

/// Durable storage for rates keyed by `(date, base, target)`.
///
/// Every multi-target query returns an empty result for an empty target
/// list without touching the database.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts a rate, overwriting value/source/calculated/fetched on conflict.
    async fn upsert_rate(&self, rate: &Rate) -> Result<(), StoreError>;

    /// Upserts a batch atomically: all rows land or none do.
    async fn upsert_rates(&self, rates: &[Rate]) -> Result<(), StoreError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Single-rate lookups
    // ─────────────────────────────────────────────────────────────────────────────

    /// Exact `(date, base, target)` lookup.
    async fn get_rate(
        &self,
        date: NaiveDate,
        base: &str,
        target: &str,
    ) -> Result<Option<Rate>, StoreError>;

    /// Most recent rate for the pair.
    async fn get_latest_rate(&self, base: &str, target: &str) -> Result<Option<Rate>, StoreError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Multi-target lookups
    // ─────────────────────────────────────────────────────────────────────────────

    /// All rates for `base` and `targets` on one date.
    async fn get_rates_for_date(
        &self,
        date: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError>;

    /// Rates within `[start, end]`, ordered by `(date, target)`.
    async fn get_rates_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError>;

    /// Most recent rate for each target independently.
    async fn get_latest_rates(
        &self,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Largest stored date not after `date`. Fails with
    /// [`StoreError::NotFound`] when none qualifies.
    async fn get_nearest_date(&self, date: NaiveDate) -> Result<NaiveDate, StoreError>;

    /// Distinct targets with non-calculated data.
    async fn get_available_currencies(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct bases with non-calculated data.
    async fn get_available_bases(&self) -> Result<Vec<String>, StoreError>;

    /// Min and max stored date, `None` on an empty store.
    async fn get_date_range(&self) -> Result<Option<DateRange>, StoreError>;
}

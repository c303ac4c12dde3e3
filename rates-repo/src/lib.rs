//! # Rates Repository
//!
//! Concrete store implementation (adapter) for the rate ingester.
//! [`SqliteRateStore`] implements the `RateStore` port on an embedded
//! SQLite database in WAL mode.

pub mod sqlite;

mod types;


pub use sqlite::SqliteRateStore;

/// Build and initialize a store from a database URL.
///
/// This function:
/// 1. Creates the parent directory of an on-disk database
/// 2. Connects with WAL journaling and a bounded busy timeout
/// 3. Runs the migration and returns a ready-to-use store
///
/// # Examples
///
/// ```ignore
/// let store = build_store("sqlite://data/fxrates.db").await?;
/// let memory = build_store("sqlite::memory:").await?;
/// ```
pub async fn build_store(database_url: &str) -> anyhow::Result<SqliteRateStore> {
    SqliteRateStore::new(database_url).await
}

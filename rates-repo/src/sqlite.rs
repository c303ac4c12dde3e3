//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use rates_types::{DateRange, Rate, RateStore, StoreError};

use crate::types::{DbRate, date_key, parse_date};

/// How long a writer waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 8;

const MIGRATION: &str = include_str!("../migrations/0001_create_rates.sql");

const RATE_COLUMNS: &str = "date, base, target, rate, source, calculated, fetched_at";

const UPSERT_SQL: &str = r#"
    INSERT INTO rates (date, base, target, rate, source, calculated, fetched_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (date, base, target) DO UPDATE SET
        rate       = excluded.rate,
        source     = excluded.source,
        calculated = excluded.calculated,
        fetched_at = excluded.fetched_at
"#;

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Database(format!("{}: {}", context, e))
}

fn tx_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Transaction(format!("{}: {}", context, e))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation. Cloning shares the pool.
#[derive(Clone)]
pub struct SqliteRateStore {
    pool: SqlitePool,
}

impl SqliteRateStore {
    /// Opens (creating if missing) and migrates the database at `database_url`.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        Self::with_busy_timeout(database_url, BUSY_TIMEOUT).await
    }

    /// Like [`new`](Self::new), but a writer gives up on a locked database
    /// after `busy_timeout`.
    pub async fn with_busy_timeout(
        database_url: &str,
        busy_timeout: Duration,
    ) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        // An in-memory database lives only as long as its connections and has
        // no WAL, so it gets one long-lived connection.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(%database_url, "rate store ready");
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the schema. Safe to run repeatedly.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(MIGRATION)
            .execute(&self.pool)
            .await
            .map_err(db_err("creating schema"))?;
        Ok(())
    }

    async fn fetch_rates(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
        context: &'static str,
    ) -> Result<Vec<Rate>, StoreError> {
        let rows: Vec<DbRate> = query
            .build_query_as::<DbRate>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err(context))?;

        rows.into_iter().map(DbRate::into_domain).collect()
    }

    async fn fetch_codes(&self, sql: &str, context: &'static str) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err(context))
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

async fn execute_upsert<'e, E>(executor: E, rate: &Rate) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(UPSERT_SQL)
        .bind(date_key(rate.date))
        .bind(rate.base.as_str())
        .bind(rate.target.as_str())
        .bind(rate.value)
        .bind(rate.source.as_str())
        .bind(rate.calculated as i64)
        .bind(rate.fetched.to_rfc3339())
        .execute(executor)
        .await?;
    Ok(())
}

/// Appends `(?, ?, …)` binding every value. Callers guarantee `values` is
/// non-empty.
fn push_in_list<'a>(query: &mut QueryBuilder<'a, Sqlite>, values: &'a [String]) {
    query.push("(");
    let mut list = query.separated(", ");
    for value in values {
        list.push_bind(value.as_str());
    }
    list.push_unseparated(")");
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRateStore {
    async fn upsert_rate(&self, rate: &Rate) -> Result<(), StoreError> {
        execute_upsert(&self.pool, rate)
            .await
            .map_err(db_err("inserting rate"))
    }

    async fn upsert_rates(&self, rates: &[Rate]) -> Result<(), StoreError> {
        if rates.is_empty() {
            return Ok(());
        }

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(tx_err("beginning transaction"))?;

        // Returning early drops `db_tx`, which rolls the batch back.
        for rate in rates {
            execute_upsert(&mut *db_tx, rate)
                .await
                .map_err(|e| {
                    StoreError::Database(format!(
                        "inserting rate {} {}/{}: {}",
                        date_key(rate.date),
                        rate.base,
                        rate.target,
                        e
                    ))
                })?;
        }

        db_tx
            .commit()
            .await
            .map_err(tx_err("committing transaction"))?;

        tracing::debug!(count = rates.len(), "upserted rates");
        Ok(())
    }

    async fn get_rate(
        &self,
        date: NaiveDate,
        base: &str,
        target: &str,
    ) -> Result<Option<Rate>, StoreError> {
        let row: Option<DbRate> = sqlx::query_as(&format!(
            "SELECT {RATE_COLUMNS} FROM rates WHERE date = ? AND base = ? AND target = ?"
        ))
        .bind(date_key(date))
        .bind(base)
        .bind(target)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("querying rate"))?;

        row.map(DbRate::into_domain).transpose()
    }

    async fn get_latest_rate(&self, base: &str, target: &str) -> Result<Option<Rate>, StoreError> {
        let row: Option<DbRate> = sqlx::query_as(&format!(
            "SELECT {RATE_COLUMNS} FROM rates WHERE base = ? AND target = ? ORDER BY date DESC LIMIT 1"
        ))
        .bind(base)
        .bind(target)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("querying latest rate"))?;

        row.map(DbRate::into_domain).transpose()
    }

    async fn get_rates_for_date(
        &self,
        date: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {RATE_COLUMNS} FROM rates WHERE date = "));
        query
            .push_bind(date_key(date))
            .push(" AND base = ")
            .push_bind(base)
            .push(" AND target IN ");
        push_in_list(&mut query, targets);
        query.push(" ORDER BY target ASC");

        self.fetch_rates(query, "querying rates").await
    }

    async fn get_rates_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {RATE_COLUMNS} FROM rates WHERE base = "));
        query
            .push_bind(base)
            .push(" AND date >= ")
            .push_bind(date_key(start))
            .push(" AND date <= ")
            .push_bind(date_key(end))
            .push(" AND target IN ");
        push_in_list(&mut query, targets);
        query.push(" ORDER BY date ASC, target ASC");

        self.fetch_rates(query, "querying rates between dates").await
    }

    async fn get_latest_rates(
        &self,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, StoreError> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        // "latest" is per target: each target joins against its own max date
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"SELECT r1.date, r1.base, r1.target, r1.rate, r1.source, r1.calculated, r1.fetched_at
               FROM rates r1
               INNER JOIN (
                   SELECT target, MAX(date) AS max_date
                   FROM rates
                   WHERE base = "#,
        );
        query.push_bind(base).push(" AND target IN ");
        push_in_list(&mut query, targets);
        query
            .push(
                r#"
                   GROUP BY target
               ) r2 ON r1.target = r2.target AND r1.date = r2.max_date
               WHERE r1.base = "#,
            )
            .push_bind(base)
            .push(" ORDER BY r1.target ASC");

        self.fetch_rates(query, "querying latest rates").await
    }

    async fn get_nearest_date(&self, date: NaiveDate) -> Result<NaiveDate, StoreError> {
        let nearest: Option<String> =
            sqlx::query_scalar("SELECT date FROM rates WHERE date <= ? ORDER BY date DESC LIMIT 1")
                .bind(date_key(date))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err("querying nearest date"))?;

        match nearest {
            Some(found) => parse_date(&found),
            None => Err(StoreError::NotFound(format!(
                "no rates found on or before {}",
                date_key(date)
            ))),
        }
    }

    async fn get_available_currencies(&self) -> Result<Vec<String>, StoreError> {
        self.fetch_codes(
            "SELECT DISTINCT target FROM rates WHERE calculated = 0 ORDER BY target",
            "querying available currencies",
        )
        .await
    }

    async fn get_available_bases(&self) -> Result<Vec<String>, StoreError> {
        self.fetch_codes(
            "SELECT DISTINCT base FROM rates WHERE calculated = 0 ORDER BY base",
            "querying available bases",
        )
        .await
    }

    async fn get_date_range(&self) -> Result<Option<DateRange>, StoreError> {
        let (min, max): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT MIN(date), MAX(date) FROM rates")
                .fetch_one(&self.pool)
                .await
                .map_err(db_err("querying date range"))?;

        match (min, max) {
            (Some(min), Some(max)) => Ok(Some(DateRange {
                start: parse_date(&min)?,
                end: parse_date(&max)?,
            })),
            _ => Ok(None),
        }
    }
}

//! Database row types and their mapping to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use rates_types::{Rate, StoreError};

/// Storage format of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `2025-03-14`; sorts lexically in date order.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("invalid date {:?}: {}", value, e)))
}

/// Rate row from database.
#[derive(FromRow)]
pub struct DbRate {
    pub date: String,
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub source: String,
    pub calculated: i64,
    pub fetched_at: String,
}

impl DbRate {
    pub fn into_domain(self) -> Result<Rate, StoreError> {
        let date = parse_date(&self.date)?;
        let fetched = DateTime::parse_from_rfc3339(&self.fetched_at)
            .map_err(|e| {
                StoreError::Corrupt(format!("invalid fetched_at {:?}: {}", self.fetched_at, e))
            })?
            .with_timezone(&Utc);

        Ok(Rate {
            base: self.base,
            target: self.target,
            value: self.rate,
            date,
            source: self.source,
            fetched,
            calculated: self.calculated != 0,
        })
    }
}

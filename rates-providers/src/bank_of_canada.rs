//! Bank of Canada Valet API adapter.
//!
//! Each currency is a series named `FX{CUR}CAD` whose observations are
//! CAD per one unit of the foreign currency. The pivot-relative direction
//! used across providers is foreign-per-CAD, so every value is inverted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use rates_types::{HttpTransport, ProviderError, Rate, RateProvider, RateRequest};

use crate::common::{cross_from_pivot, is_currency_code, parse_error, validated};

pub const NAME: &str = "BankOfCanada";
pub const PIVOT: &str = "CAD";
pub const DEFAULT_BASE_URL: &str = "https://www.bankofcanada.ca/valet";

const SERIES_PREFIX: &str = "FX";
const DATE_FIELD: &str = "d";
const VALUE_FIELD: &str = "v";

// actively published series as of 2025
const SUPPORTED_CURRENCIES: &[&str] = &[
    "AUD", "BRL", "CNY", "EUR", "HKD", "INR", "IDR", "JPY", "MXN", "NZD", "NOK", "PEN", "RUB",
    "SAR", "SGD", "ZAR", "KRW", "SEK", "CHF", "TWD", "TRY", "GBP", "USD",
];

/// Bank of Canada provider. Holds configuration only and is safe to share.
#[derive(Clone)]
pub struct BankOfCanadaProvider {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

/// Entries stay untyped so one malformed observation cannot fail the batch.
#[derive(Debug, Deserialize)]
struct ValetResponse {
    #[serde(default)]
    observations: Option<Vec<Value>>,
}

impl BankOfCanadaProvider {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `USD` -> `FXUSDCAD`.
    pub fn series_name(currency: &str) -> String {
        format!("{SERIES_PREFIX}{currency}{PIVOT}")
    }

    /// Builds the single batched request for `currencies`.
    pub fn build_url(&self, currencies: &[&str], date: Option<NaiveDate>) -> String {
        let series: Vec<String> = currencies.iter().map(|c| Self::series_name(c)).collect();
        let mut url = format!("{}/observations/{}/json", self.base_url, series.join(","));

        match date {
            Some(date) => {
                let day = date.format("%Y-%m-%d");
                url.push_str(&format!("?start_date={day}&end_date={day}"));
            }
            None => url.push_str("?recent=1"),
        }

        url
    }

    async fn fetch_direct(&self, req: &RateRequest) -> Result<Vec<Rate>, ProviderError> {
        let targets: Vec<&str> = req.targets.iter().map(String::as_str).collect();
        let rates = self.fetch_pivot_rates(&targets, req.date).await?;
        validated(NAME, rates)
    }

    async fn fetch_cross(&self, req: &RateRequest) -> Result<Vec<Rate>, ProviderError> {
        let rates = self.fetch_pivot_rates(&req.all_currencies(), req.date).await?;
        cross_from_pivot(NAME, rates, req)
    }

    async fn fetch_pivot_rates(
        &self,
        currencies: &[&str],
        date: Option<NaiveDate>,
    ) -> Result<Vec<Rate>, ProviderError> {
        let url = self.build_url(currencies, date);

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|source| ProviderError::Fetch {
                provider: NAME,
                source,
            })?;

        let data: ValetResponse = serde_json::from_slice(&body)
            .map_err(|e| parse_error(NAME, format!("decoding json: {e}")))?;

        Ok(parse_observations(&data, date))
    }
}

#[async_trait]
impl RateProvider for BankOfCanadaProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pivot(&self) -> &'static str {
        PIVOT
    }

    async fn fetch_rates(&self, req: &RateRequest) -> Result<Vec<Rate>, ProviderError> {
        if req.base == PIVOT {
            self.fetch_direct(req).await
        } else {
            self.fetch_cross(req).await
        }
    }

    fn supported_currencies(&self) -> &'static [&'static str] {
        SUPPORTED_CURRENCIES
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON parsing
// ─────────────────────────────────────────────────────────────────────────────

fn parse_observations(data: &ValetResponse, request_date: Option<NaiveDate>) -> Vec<Rate> {
    let fetched = Utc::now();

    data.observations
        .iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|obs| {
            let date = observation_date(obs, request_date)?;
            Some(
                obs.iter()
                    .filter(|(key, _)| key.as_str() != DATE_FIELD)
                    .filter_map(move |(key, val)| parse_series_value(key, val, date, fetched)),
            )
        })
        .flatten()
        .collect()
}

fn observation_date(obs: &Map<String, Value>, request_date: Option<NaiveDate>) -> Option<NaiveDate> {
    let date = obs.get(DATE_FIELD)?.as_str()?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;

    if request_date.is_some_and(|wanted| wanted != date) {
        return None;
    }

    Some(date)
}

fn parse_series_value(
    series: &str,
    val: &Value,
    date: NaiveDate,
    fetched: DateTime<Utc>,
) -> Option<Rate> {
    let currency = extract_currency(series)?;

    let value = match val.as_object()?.get(VALUE_FIELD)? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some(Rate::direct(PIVOT, currency, 1.0 / value, date, NAME, fetched))
}

/// `FXUSDCAD` -> `USD`. Anything not shaped like a CAD FX series is `None`.
fn extract_currency(series: &str) -> Option<&str> {
    let currency = series.strip_prefix(SERIES_PREFIX)?.strip_suffix(PIVOT)?;
    is_currency_code(currency).then_some(currency)
}

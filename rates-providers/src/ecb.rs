//! European Central Bank adapter.
//!
//! Queries the ECB data portal (SDMX `EXR` dataflow) in `csvdata` format.
//! The ECB quotes every series as units of foreign currency per one EUR,
//! which already is the pivot-relative direction, so values are taken
//! as-is.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use csv::ByteRecord;

use rates_types::{HttpTransport, ProviderError, Rate, RateProvider, RateRequest};

use crate::common::{cross_from_pivot, is_currency_code, parse_error, validated};

pub const NAME: &str = "ECB";
pub const PIVOT: &str = "EUR";
pub const DEFAULT_BASE_URL: &str = "https://data-api.ecb.europa.eu";

// actively published reference rates as of 2025
const SUPPORTED_CURRENCIES: &[&str] = &[
    "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "GBP", "HKD", "HUF", "IDR", "ILS",
    "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON", "SEK", "SGD",
    "THB", "TRY", "USD", "ZAR",
];

/// ECB provider. Holds configuration only and is safe to share.
#[derive(Clone)]
pub struct EcbProvider {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl EcbProvider {
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

    /// Builds the single batched request for `currencies`.
    ///
    /// `D.USD+JPY.EUR.SP00.A` selects daily spot rates of each listed
    /// currency against EUR.
    pub fn build_url(&self, currencies: &[&str], date: Option<NaiveDate>) -> String {
        let series_key = format!("D.{}.EUR.SP00.A", currencies.join("+"));
        let mut url = format!(
            "{}/service/data/EXR/{}?format=csvdata",
            self.base_url, series_key
        );

        match date {
            Some(date) => {
                let day = date.format("%Y-%m-%d");
                url.push_str(&format!("&startPeriod={day}&endPeriod={day}"));
            }
            None => url.push_str("&lastNObservations=1"),
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

        parse_csv(&body, date)
    }
}

#[async_trait]
impl RateProvider for EcbProvider {
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
// CSV parsing
// ─────────────────────────────────────────────────────────────────────────────

struct Columns {
    currency: usize,
    date: usize,
    value: usize,
}

impl Columns {
    fn locate(header: &ByteRecord) -> Option<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|col| col.trim_ascii() == name.as_bytes())
        };
        Some(Self {
            currency: find("CURRENCY")?,
            date: find("TIME_PERIOD")?,
            value: find("OBS_VALUE")?,
        })
    }
}

/// Structural problems fail the whole batch; bad rows are skipped.
///
/// Records are read as raw bytes so that only the three used fields must be
/// valid UTF-8.
fn parse_csv(data: &[u8], request_date: Option<NaiveDate>) -> Result<Vec<Rate>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let header = reader
        .byte_headers()
        .map_err(|e| parse_error(NAME, format!("reading csv: {e}")))?
        .clone();

    let records = reader
        .byte_records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| parse_error(NAME, format!("reading csv: {e}")))?;

    if records.is_empty() {
        return Err(parse_error(NAME, "no data in response"));
    }

    let columns =
        Columns::locate(&header).ok_or_else(|| parse_error(NAME, "missing required csv columns"))?;

    let fetched = Utc::now();
    let rates: Vec<Rate> = records
        .iter()
        .filter_map(|record| parse_record(record, &columns, request_date, fetched))
        .collect();

    let skipped = records.len() - rates.len();
    if skipped > 0 {
        tracing::debug!(provider = NAME, skipped, "skipped csv rows");
    }

    Ok(rates)
}

fn text_field(record: &ByteRecord, index: usize) -> Option<&str> {
    std::str::from_utf8(record.get(index)?).ok().map(str::trim)
}

fn parse_record(
    record: &ByteRecord,
    columns: &Columns,
    request_date: Option<NaiveDate>,
    fetched: DateTime<Utc>,
) -> Option<Rate> {
    let currency = text_field(record, columns.currency)?;
    let date = text_field(record, columns.date)?;
    let value = text_field(record, columns.value)?;

    if !is_currency_code(currency) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    if request_date.is_some_and(|wanted| wanted != date) {
        return None;
    }

    let value: f64 = value.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some(Rate::direct(PIVOT, currency, value, date, NAME, fetched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CannedTransport;
    use rates_types::{CrossRateError, TransportError, ValidationError};

    const HEADER: &str = "KEY,FREQ,CURRENCY,CURRENCY_DENOM,EXR_TYPE,EXR_SUFFIX,TIME_PERIOD,OBS_VALUE,OBS_STATUS";

    fn row(currency: &str, date: &str, value: &str) -> String {
        format!("EXR.D.{currency}.EUR.SP00.A,D,{currency},EUR,SP00,A,{date},{value},A")
    }

    fn csv_body(rows: &[String]) -> String {
        let mut body = String::from(HEADER);
        for r in rows {
            body.push('\n');
            body.push_str(r);
        }
        body.push('\n');
        body
    }

    fn provider(body: String) -> (EcbProvider, Arc<CannedTransport>) {
        let transport = Arc::new(CannedTransport::ok(body));
        let provider = EcbProvider::with_base_url(transport.clone(), "http://ecb.test/");
        (provider, transport)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_build_url_latest() {
        let (provider, _) = provider(String::new());

        let url = provider.build_url(&["USD", "JPY"], None);

        assert_eq!(
            url,
            "http://ecb.test/service/data/EXR/D.USD+JPY.EUR.SP00.A?format=csvdata&lastNObservations=1"
        );
    }

    #[test]
    fn test_build_url_for_date() {
        let (provider, _) = provider(String::new());

        let url = provider.build_url(&["GBP"], Some(day("2025-03-14")));

        assert_eq!(
            url,
            "http://ecb.test/service/data/EXR/D.GBP.EUR.SP00.A?format=csvdata&startPeriod=2025-03-14&endPeriod=2025-03-14"
        );
    }

    #[tokio::test]
    async fn test_direct_rates_are_not_inverted() {
        let body = csv_body(&[
            row("USD", "2025-03-14", "1.0879"),
            row("GBP", "2025-03-14", "0.8398"),
        ]);
        let (provider, transport) = provider(body);

        let rates = provider
            .fetch_rates(&RateRequest::latest("EUR", ["USD", "GBP"]))
            .await
            .unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].target, "USD");
        assert!((rates[0].value - 1.0879).abs() < 1e-12);
        assert!((rates[1].value - 0.8398).abs() < 1e-12);
        for rate in &rates {
            assert_eq!(rate.base, "EUR");
            assert_eq!(rate.source, "ECB");
            assert!(!rate.calculated);
            assert_eq!(rate.date, day("2025-03-14"));
        }

        let urls = transport.urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("D.USD+GBP.EUR.SP00.A"));
    }

    #[tokio::test]
    async fn test_cross_rates_batch_base_and_targets() {
        let body = csv_body(&[
            row("XXX", "2025-03-14", "2.0"),
            row("YYY", "2025-03-14", "3.0"),
        ]);
        let (provider, transport) = provider(body);

        let rates = provider
            .fetch_rates(&RateRequest::latest("XXX", ["YYY", "ZZZ"]))
            .await
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].base, "XXX");
        assert_eq!(rates[0].target, "YYY");
        assert!((rates[0].value - 1.5).abs() < 1e-12);
        assert!(rates[0].calculated);

        let urls = transport.urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("D.XXX+YYY+ZZZ.EUR.SP00.A"));
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let body = csv_body(&[
            row("USD", "2025-03-14", "1.0879"),
            row("JPY", "2025-03-14", "not-a-number"),
            row("GBP", "2025-03-14", "-0.5"),
            row("CHF", "2025-03-14", ""),
            row("SEK", "14/03/2025", "11.02"),
            row("NOK", "2025-03-13", "11.50"),
            row("usd", "2025-03-14", "1.0"),
            "EXR.D.PLN.EUR.SP00.A,D,PLN".to_string(),
        ]);
        let (provider, _) = provider(body);

        let rates = provider
            .fetch_rates(&RateRequest::on(
                "EUR",
                ["USD", "JPY", "GBP", "CHF", "SEK", "NOK", "PLN"],
                day("2025-03-14"),
            ))
            .await
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].target, "USD");
    }

    #[tokio::test]
    async fn test_invalid_utf8_outside_used_columns_is_tolerated() {
        let mut body = b"KEY,CURRENCY,TIME_PERIOD,OBS_VALUE,TITLE\n".to_vec();
        body.extend_from_slice(b"k,USD,2025-03-14,1.08,US dollar\n");
        body.extend_from_slice(b"k,JPY,2025-03-14,161.2,Yen \xff\n");
        body.extend_from_slice(b"k,GBP,2025-03-14,0.8\xff,Pound\n");
        let transport = Arc::new(CannedTransport::ok(body));
        let provider = EcbProvider::with_base_url(transport, "http://ecb.test");

        let rates = provider
            .fetch_rates(&RateRequest::latest("EUR", ["USD", "JPY", "GBP"]))
            .await
            .unwrap();

        let targets: Vec<&str> = rates.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["USD", "JPY"]);
    }

    #[tokio::test]
    async fn test_other_dates_are_discarded_for_dated_request() {
        let body = csv_body(&[row("USD", "2025-03-13", "1.08")]);
        let (provider, _) = provider(body);

        let err = provider
            .fetch_rates(&RateRequest::on("EUR", ["USD"], day("2025-03-14")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Validation {
                source: ValidationError::Empty,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_required_column_fails() {
        let body = "KEY,CURRENCY,OBS_VALUE\nEXR.D.USD.EUR.SP00.A,USD,1.08\n".to_string();
        let (provider, _) = provider(body);

        let err = provider
            .fetch_rates(&RateRequest::latest("EUR", ["USD"]))
            .await
            .unwrap_err();

        match err {
            ProviderError::Parse { provider, reason } => {
                assert_eq!(provider, "ECB");
                assert_eq!(reason, "missing required csv columns");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_header_only_is_no_data() {
        let (provider, _) = provider(csv_body(&[]));

        let err = provider
            .fetch_rates(&RateRequest::latest("EUR", ["USD"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no data in response"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_wrapped() {
        let transport = Arc::new(CannedTransport::status(404, "No results found"));
        let provider = EcbProvider::with_base_url(transport, "http://ecb.test");

        let err = provider
            .fetch_rates(&RateRequest::latest("EUR", ["USD"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Fetch {
                provider: "ECB",
                source: TransportError::Status { status: 404, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_cross_without_base_fails() {
        let body = csv_body(&[row("JPY", "2025-03-14", "161.2")]);
        let (provider, _) = provider(body);

        let err = provider
            .fetch_rates(&RateRequest::latest("USD", ["JPY"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Calculation {
                source: CrossRateError::BaseNotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_supports_pivot_and_list() {
        let (provider, _) = provider(String::new());
        assert!(provider.supports("EUR"));
        assert!(provider.supports("USD"));
        assert!(!provider.supports("RUB"));
    }
}

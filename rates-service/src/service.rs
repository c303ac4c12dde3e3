//! Rate Application Service
//!
//! Orchestrates provider fetches and store access through the ports.
//! Contains NO infrastructure logic - pure orchestration.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use rates_providers::{Provider, ProviderKind, validate_rates};
use rates_types::{DateRange, Rate, RateProvider, RateRequest, RateStore};

use crate::error::ServiceError;

/// Result of one successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub provider: &'static str,
    pub stored: usize,
    pub calculated: usize,
}

/// Per-provider result of [`RateService::ingest_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderOutcome {
    Ingested(IngestReport),
    Skipped {
        provider: &'static str,
        reason: String,
    },
    Failed {
        provider: &'static str,
        error: String,
    },
}

/// Rates resolved for a requested date, possibly from an earlier day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsOfRates {
    pub requested: NaiveDate,
    pub resolved: NaiveDate,
    pub rates: Vec<Rate>,
}

/// Application service for rate operations.
///
/// Generic over `S: RateStore` - the adapter is injected at compile time.
/// Providers hold no mutable state, so one service can serve concurrent
/// callers.
pub struct RateService<S: RateStore> {
    store: S,
    providers: Vec<Provider>,
    deadline: Option<Duration>,
}

impl<S: RateStore> RateService<S> {
    /// Creates a new rate service with the given store and providers.
    pub fn new(store: S, providers: Vec<Provider>) -> Self {
        Self {
            store,
            providers,
            deadline: None,
        }
    }

    /// Bounds every provider and store call; an expired call is abandoned.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up a configured provider.
    pub fn provider(&self, kind: ProviderKind) -> Result<&Provider, ServiceError> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .ok_or_else(|| ServiceError::BadRequest(format!("provider {} is not configured", kind)))
    }

    async fn within<T, E, F>(&self, operation: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ServiceError>,
    {
        match self.deadline {
            Some(after) => tokio::time::timeout(after, fut)
                .await
                .map_err(|_| ServiceError::Timeout { operation, after })?
                .map_err(Into::into),
            None => fut.await.map_err(Into::into),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Ingestion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fetches from one provider and re-validates the output, which covers
    /// cross-calculated rates as well. Nothing is stored.
    pub async fn fetch(
        &self,
        kind: ProviderKind,
        req: &RateRequest,
    ) -> Result<Vec<Rate>, ServiceError> {
        check_request(req)?;
        let provider = self.provider(kind)?;

        let rates = self.within("fetch", provider.fetch_rates(req)).await?;

        validate_rates(&rates).map_err(|source| ServiceError::Validation {
            provider: provider.name(),
            source,
        })?;

        tracing::debug!(
            provider = provider.name(),
            base = %req.base,
            count = rates.len(),
            "fetched rates"
        );

        Ok(rates)
    }

    /// Fetches from one provider and upserts the batch atomically.
    pub async fn ingest(
        &self,
        kind: ProviderKind,
        req: &RateRequest,
    ) -> Result<IngestReport, ServiceError> {
        let rates = self.fetch(kind, req).await?;

        self.within("upsert", self.store.upsert_rates(&rates))
            .await?;

        let report = IngestReport {
            provider: self.provider(kind)?.name(),
            stored: rates.len(),
            calculated: rates.iter().filter(|r| r.calculated).count(),
        };

        tracing::info!(
            provider = report.provider,
            base = %req.base,
            stored = report.stored,
            calculated = report.calculated,
            "ingested rates"
        );

        Ok(report)
    }

    /// Ingests from every configured provider that covers the request.
    ///
    /// A failing provider does not stop the others; its error is reported
    /// in the returned outcome.
    pub async fn ingest_all(&self, req: &RateRequest) -> Result<Vec<ProviderOutcome>, ServiceError> {
        check_request(req)?;

        let mut outcomes = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let name = provider.name();

            if let Some(reason) = uncovered(provider, req) {
                tracing::debug!(provider = name, %reason, "skipping provider");
                outcomes.push(ProviderOutcome::Skipped {
                    provider: name,
                    reason,
                });
                continue;
            }

            match self.ingest(provider.kind(), req).await {
                Ok(report) => outcomes.push(ProviderOutcome::Ingested(report)),
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "ingest failed");
                    outcomes.push(ProviderOutcome::Failed {
                        provider: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Retrieval
    // ─────────────────────────────────────────────────────────────────────────────

    /// One pair on an exact date, or the latest stored when `date` is `None`.
    pub async fn rate(
        &self,
        base: &str,
        target: &str,
        date: Option<NaiveDate>,
    ) -> Result<Rate, ServiceError> {
        let found = match date {
            Some(date) => {
                self.within("get rate", self.store.get_rate(date, base, target))
                    .await?
            }
            None => {
                self.within("get latest rate", self.store.get_latest_rate(base, target))
                    .await?
            }
        };

        found.ok_or_else(|| {
            let when = date.map_or_else(|| "any date".to_string(), |d| d.to_string());
            ServiceError::NotFound(format!("rate {}/{} on {}", base, target, when))
        })
    }

    /// The most recent stored rate of each target.
    pub async fn latest_rates(
        &self,
        base: &str,
        targets: &[String],
    ) -> Result<Vec<Rate>, ServiceError> {
        self.within("get latest rates", self.store.get_latest_rates(base, targets))
            .await
    }

    /// Rates on `date`, falling back to the nearest earlier stored date.
    pub async fn rates_as_of(
        &self,
        base: &str,
        targets: &[String],
        date: NaiveDate,
    ) -> Result<AsOfRates, ServiceError> {
        let rates = self
            .within("get rates", self.store.get_rates_for_date(date, base, targets))
            .await?;
        if !rates.is_empty() || targets.is_empty() {
            return Ok(AsOfRates {
                requested: date,
                resolved: date,
                rates,
            });
        }

        let resolved = self
            .within("get nearest date", self.store.get_nearest_date(date))
            .await?;
        let rates = if resolved == date {
            Vec::new()
        } else {
            self.within("get rates", self.store.get_rates_for_date(resolved, base, targets))
                .await?
        };
        if rates.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no {} rates on or before {}",
                base, date
            )));
        }

        tracing::debug!(requested = %date, %resolved, count = rates.len(), "resolved as-of date");

        Ok(AsOfRates {
            requested: date,
            resolved,
            rates,
        })
    }

    /// Rates within `[start, end]`, ordered by date then target.
    pub async fn history(
        &self,
        base: &str,
        targets: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Rate>, ServiceError> {
        if start > end {
            return Err(ServiceError::BadRequest(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        self.within(
            "get rates between",
            self.store.get_rates_between(start, end, base, targets),
        )
        .await
    }

    pub async fn available_currencies(&self) -> Result<Vec<String>, ServiceError> {
        self.within("get currencies", self.store.get_available_currencies())
            .await
    }

    pub async fn available_bases(&self) -> Result<Vec<String>, ServiceError> {
        self.within("get bases", self.store.get_available_bases())
            .await
    }

    /// Overall stored date span.
    pub async fn date_range(&self) -> Result<DateRange, ServiceError> {
        self.within("get date range", self.store.get_date_range())
            .await?
            .ok_or_else(|| ServiceError::NotFound("no rates stored".into()))
    }
}

fn check_request(req: &RateRequest) -> Result<(), ServiceError> {
    if req.base.is_empty() {
        return Err(ServiceError::BadRequest("base currency is required".into()));
    }
    if req.targets.is_empty() {
        return Err(ServiceError::BadRequest(
            "at least one target currency is required".into(),
        ));
    }
    if req.targets.iter().any(|t| t.is_empty()) {
        return Err(ServiceError::BadRequest("target currency cannot be empty".into()));
    }
    if req.targets.iter().any(|t| *t == req.base) {
        return Err(ServiceError::BadRequest(format!(
            "target list contains the base currency {}",
            req.base
        )));
    }
    Ok(())
}

/// Why `provider` cannot serve `req`, if it cannot.
fn uncovered(provider: &Provider, req: &RateRequest) -> Option<String> {
    if !provider.supports(&req.base) {
        return Some(format!("base {} not published", req.base));
    }
    if !req.targets.iter().any(|t| provider.supports(t)) {
        return Some("no requested target is published".into());
    }
    None
}

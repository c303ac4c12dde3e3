//! The closed set of providers behind one [`RateProvider`] implementation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use rates_types::{HttpTransport, ProviderError, Rate, RateProvider, RateRequest};

use crate::bank_of_canada::BankOfCanadaProvider;
use crate::ecb::EcbProvider;

/// Identifies one of the built-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Ecb,
    BankOfCanada,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Ecb, ProviderKind::BankOfCanada]
    }

    /// Short CLI-friendly identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderKind::Ecb => "ecb",
            ProviderKind::BankOfCanada => "boc",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ecb" => Ok(ProviderKind::Ecb),
            "boc" | "bankofcanada" | "bank-of-canada" => Ok(ProviderKind::BankOfCanada),
            _ => Err(format!("Unknown provider: {}. Supported: ecb, boc", s)),
        }
    }
}

/// A built-in provider.
#[derive(Clone)]
pub enum Provider {
    Ecb(EcbProvider),
    BankOfCanada(BankOfCanadaProvider),
}

impl Provider {
    /// Creates the provider for `kind` with its default upstream URL.
    pub fn new(kind: ProviderKind, transport: Arc<dyn HttpTransport>) -> Self {
        match kind {
            ProviderKind::Ecb => Provider::Ecb(EcbProvider::new(transport)),
            ProviderKind::BankOfCanada => {
                Provider::BankOfCanada(BankOfCanadaProvider::new(transport))
            }
        }
    }

    /// Creates the provider for `kind` against another upstream root.
    pub fn with_base_url(
        kind: ProviderKind,
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
    ) -> Self {
        match kind {
            ProviderKind::Ecb => Provider::Ecb(EcbProvider::with_base_url(transport, base_url)),
            ProviderKind::BankOfCanada => {
                Provider::BankOfCanada(BankOfCanadaProvider::with_base_url(transport, base_url))
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Ecb(_) => ProviderKind::Ecb,
            Provider::BankOfCanada(_) => ProviderKind::BankOfCanada,
        }
    }

    fn inner(&self) -> &dyn RateProvider {
        match self {
            Provider::Ecb(p) => p,
            Provider::BankOfCanada(p) => p,
        }
    }
}

impl From<EcbProvider> for Provider {
    fn from(p: EcbProvider) -> Self {
        Provider::Ecb(p)
    }
}

impl From<BankOfCanadaProvider> for Provider {
    fn from(p: BankOfCanadaProvider) -> Self {
        Provider::BankOfCanada(p)
    }
}

#[async_trait]
impl RateProvider for Provider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn pivot(&self) -> &'static str {
        self.inner().pivot()
    }

    async fn fetch_rates(&self, req: &RateRequest) -> Result<Vec<Rate>, ProviderError> {
        self.inner().fetch_rates(req).await
    }

    fn supported_currencies(&self) -> &'static [&'static str] {
        self.inner().supported_currencies()
    }
}

/// Every built-in provider sharing one transport.
///
/// `base_url` may override the upstream root per provider; `None` keeps the
/// default.
pub fn build_providers<F>(transport: Arc<dyn HttpTransport>, base_url: F) -> Vec<Provider>
where
    F: Fn(ProviderKind) -> Option<String>,
{
    ProviderKind::all()
        .iter()
        .map(|&kind| match base_url(kind) {
            Some(url) => Provider::with_base_url(kind, transport.clone(), url),
            None => Provider::new(kind, transport.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CannedTransport;

    #[test]
    fn test_kind_parse() {
        assert_eq!("ECB".parse::<ProviderKind>().unwrap(), ProviderKind::Ecb);
        assert_eq!(
            "bankofcanada".parse::<ProviderKind>().unwrap(),
            ProviderKind::BankOfCanada
        );
        assert_eq!("boc".parse::<ProviderKind>().unwrap(), ProviderKind::BankOfCanada);
        assert!("fed".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_build_providers() {
        let transport = Arc::new(CannedTransport::ok(Vec::new()));
        let providers = build_providers(transport, |_| None);

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["ECB", "BankOfCanada"]);

        let pivots: Vec<&str> = providers.iter().map(|p| p.pivot()).collect();
        assert_eq!(pivots, vec!["EUR", "CAD"]);
        assert_eq!(providers[1].kind(), ProviderKind::BankOfCanada);
    }

    #[tokio::test]
    async fn test_build_providers_with_override() {
        let body = r#"{"observations": [{"d": "2025-02-03", "FXUSDCAD": {"v": "1.25"}}]}"#;
        let transport = Arc::new(CannedTransport::ok(body.as_bytes().to_vec()));
        let providers = build_providers(transport.clone(), |kind| {
            (kind == ProviderKind::BankOfCanada).then(|| "http://localhost:9000/valet/".to_string())
        });

        let Provider::Ecb(ecb) = &providers[0] else {
            panic!("expected ECB first");
        };
        assert_eq!(ecb.base_url(), crate::ecb::DEFAULT_BASE_URL);

        providers[1]
            .fetch_rates(&RateRequest::latest("CAD", ["USD"]))
            .await
            .unwrap();
        assert!(transport.urls()[0].starts_with("http://localhost:9000/valet/observations/"));
    }

    #[tokio::test]
    async fn test_dispatches_to_variant() {
        let body = r#"{"observations": [{"d": "2025-02-03", "FXUSDCAD": {"v": "1.25"}}]}"#;
        let transport = Arc::new(CannedTransport::ok(body.as_bytes().to_vec()));
        let provider = Provider::new(ProviderKind::BankOfCanada, transport.clone());

        let rates = provider
            .fetch_rates(&RateRequest::latest("CAD", ["USD"]))
            .await
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert!((rates[0].value - 0.8).abs() < 1e-12);
        assert!(transport.urls()[0].starts_with("https://www.bankofcanada.ca/valet/"));
    }
}

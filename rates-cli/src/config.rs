//! Configuration loading from environment.
//!
//! Connection flags (`--database-url`, `--timeout-secs`) live on the CLI
//! itself; this covers the settings that have no flag.

use std::env;

use rates_providers::ProviderKind;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Overrides the ECB data API root.
    pub ecb_url: Option<String>,
    /// Overrides the Bank of Canada Valet root.
    pub boc_url: Option<String>,
    /// Emit log lines as JSON instead of plain text.
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Upstream root override for `kind`, if configured.
    pub fn base_url(&self, kind: ProviderKind) -> Option<String> {
        match kind {
            ProviderKind::Ecb => self.ecb_url.clone(),
            ProviderKind::BankOfCanada => self.boc_url.clone(),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let url = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_json = match lookup("FXRATES_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => false,
            Some("json") => true,
            Some(other) => anyhow::bail!(
                "FXRATES_LOG_FORMAT must be \"text\" or \"json\", got {:?}",
                other
            ),
        };

        Ok(Self {
            ecb_url: url("FXRATES_ECB_URL"),
            boc_url: url("FXRATES_BOC_URL"),
            log_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("FXRATES_ECB_URL", " http://localhost:9000 "),
            ("FXRATES_BOC_URL", ""),
            ("FXRATES_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(
            config.base_url(ProviderKind::Ecb).as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.base_url(ProviderKind::BankOfCanada), None);
        assert!(config.log_json);
    }

    #[test]
    fn test_unknown_log_format() {
        let err = load(&[("FXRATES_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(err.to_string().contains("FXRATES_LOG_FORMAT"));
    }
}

//! Runtime configuration read from the environment.
//!
//! The registry stores remote CSV sources as relative names (e.g.
//! `dadosteste.csv`); `RELATORIO_BASE_URL` supplies the
//! origin they are resolved against. A `.env` file is honored via dotenvy.

use std::env;

/// Environment variable holding the origin for relative remote sources.
pub const BASE_URL_VAR: &str = "RELATORIO_BASE_URL";

/// Runtime configuration for the report pipeline.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Origin prepended to relative remote CSV names.
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            base_url: env::var(BASE_URL_VAR).ok(),
        }
    }

    /// Resolve a registry source string into a fetchable URL.
    ///
    /// Absolute URLs pass through untouched; relative names are joined onto
    /// the configured base URL. Without a base URL the relative name is
    /// returned as-is and the fetch will fail with a transport error, which
    /// the ingestion adapter reports as `SourceUnavailable`.
    pub fn resolve_url(&self, source: &str) -> String {
        if source.starts_with("http://") || source.starts_with("https://") {
            return source.to_string();
        }
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), source),
            None => source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_absolute_passthrough() {
        let config = Config { base_url: Some("https://example.com/data".into()) };
        assert_eq!(
            config.resolve_url("https://other.test/dados.csv"),
            "https://other.test/dados.csv"
        );
    }

    #[test]
    fn test_resolve_url_joins_base() {
        let config = Config { base_url: Some("https://example.com/data/".into()) };
        assert_eq!(
            config.resolve_url("dadosteste.csv"),
            "https://example.com/data/dadosteste.csv"
        );
    }

    #[test]
    fn test_resolve_url_without_base() {
        let config = Config::default();
        assert_eq!(config.resolve_url("dadosteste.csv"), "dadosteste.csv");
    }
}

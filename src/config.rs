//! Publication service configuration.
//!
//! Values come from CLI flags with `SCHOLARSEARCH_*` environment fallbacks
//! (see `main.rs`).

use crate::error::{Result, ScholarSearchError};
use std::time::Duration;
use url::Url;

/// Default publication service endpoint
pub const DEFAULT_API_URL: &str = "https://gis-python-413005.el.r.appspot.com";

/// Environment variable holding the service API key
pub const API_KEY_ENV: &str = "SCHOLARSEARCH_API_KEY";

/// Environment variable overriding the service URL
pub const API_URL_ENV: &str = "SCHOLARSEARCH_API_URL";

/// Connection settings for [`crate::client::PublicationClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_key: String,
    /// Request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Parsed base URL, always ending in `/` so endpoint paths join beneath it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| ScholarSearchError::Config(format!("Invalid API URL {:?}: {}", self.api_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScholarSearchError::Config(format!(
                "Unsupported API URL scheme: {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() -> Result<()> {
        let config = ClientConfig {
            api_url: "https://example.com/v1".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url()?.as_str(), "https://example.com/v1/");
        Ok(())
    }

    #[test]
    fn test_base_url_rejects_bad_input() {
        let bad = ClientConfig {
            api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad.base_url(), Err(ScholarSearchError::Config(_))));

        let garbage = ClientConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(garbage.base_url().is_err());
    }
}

//! Publication service client.
//!
//! Issues one `GET /query?author=..&author=..&api_key=..` request per search
//! and normalizes the `{author: {info, data}}` response into an
//! [`AuthorResultSet`].
//!
//! Service error statuses:
//! - 400 invalid or ambiguous author name
//! - 403 invalid API key
//! - 429 rate limited (one request per client every 10 seconds)

use crate::config::ClientConfig;
use crate::error::{OptionExt, Result, ScholarSearchError};
use crate::models::{AuthorResultSet, Publication};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

/// Cool-down the service enforces between requests from one client
const SERVICE_RATE_LIMIT_SECS: u64 = 10;

/// Split a comma-separated author query into trimmed, non-empty names.
pub fn parse_author_query(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// HTTP client for the publication service
#[derive(Debug, Clone)]
pub struct PublicationClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl PublicationClient {
    /// Create a new client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("scholarsearch/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScholarSearchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            api_key: config.api_key.clone(),
        })
    }

    /// Build the query URL for a list of authors
    pub fn build_query_url(&self, authors: &[String]) -> Result<Url> {
        let mut url = self
            .base_url
            .join("query")
            .map_err(|e| ScholarSearchError::Config(format!("Invalid API URL: {}", e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            for author in authors {
                pairs.append_pair("author", author);
            }
            pairs.append_pair("api_key", &self.api_key);
        }

        Ok(url)
    }

    /// Fetch publications for every author in one request.
    pub async fn query(&self, authors: &[String]) -> Result<AuthorResultSet> {
        if authors.is_empty() {
            return Err(ScholarSearchError::Validation("No author names given".to_string()));
        }

        let url = self.build_query_url(authors)?;
        info!(authors = ?authors, "Querying publication service");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = response.text().await?;
        let results = parse_response(&body)?;

        info!(
            authors = results.len(),
            publications = results.total_publications(),
            "Publication service query complete"
        );
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct AuthorEntry {
    #[serde(default)]
    info: serde_json::Value,
    #[serde(default)]
    data: Vec<Publication>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Map a non-success status to an error, preferring the service's `detail` text
fn status_error(status: StatusCode, body: &str) -> ScholarSearchError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| status.to_string());

    warn!(status = status.as_u16(), detail = %detail, "Publication service error");

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ScholarSearchError::RateLimited(retry_after_secs(&detail));
    }

    ScholarSearchError::Api {
        code: status.as_u16(),
        message: detail,
    }
}

/// Seconds from "Rate limit exceeded. Try again in N seconds."
fn retry_after_secs(detail: &str) -> u64 {
    detail
        .split_whitespace()
        .find_map(|word| word.parse::<u64>().ok())
        .unwrap_or(SERVICE_RATE_LIMIT_SECS)
}

/// Normalize a service response into an [`AuthorResultSet`].
///
/// The response must be a JSON object keyed by author name; author order is kept.
pub fn parse_response(json_str: &str) -> Result<AuthorResultSet> {
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ScholarSearchError::Parse(format!("Failed to parse service response: {}", e)))?;

    let authors = value
        .as_object()
        .ok_or_parse("Service response is not an object keyed by author")?;

    let mut results = AuthorResultSet::new();
    for (author, entry) in authors {
        let entry: AuthorEntry = serde_json::from_value(entry.clone()).map_err(|e| {
            ScholarSearchError::Parse(format!("Malformed entry for author {}: {}", author, e))
        })?;
        debug!(author = %author, info = %entry.info, count = entry.data.len(), "Author publications");
        results.insert(author.clone(), entry.info, entry.data);
    }

    Ok(results)
}

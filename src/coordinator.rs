//! Fetch coordination.
//!
//! Runs one service query against a shared [`SearchSession`]. The session lock
//! is only held to flip state before and after the request, never across the
//! network call, so views stay available while a fetch is pending.

use crate::client::{parse_author_query, PublicationClient};
use crate::error::{Result, ScholarSearchError};
use crate::session::{can_search, SearchSession, MIN_QUERY_LEN};
use tokio::sync::RwLock;
use tracing::{error, info};

/// What happened to a submitted author query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Results were stored in the session
    Loaded { authors: usize, publications: usize },
    /// The request failed; the session now holds an empty result set
    Failed,
    /// A newer fetch started while this one was in flight
    Superseded,
}

pub struct FetchCoordinator {
    client: PublicationClient,
}

impl FetchCoordinator {
    pub fn new(client: PublicationClient) -> Self {
        Self { client }
    }

    /// Submit a comma-separated author query.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] or without any author name are
    /// rejected before touching the session.
    pub async fn fetch(&self, session: &RwLock<SearchSession>, query: &str) -> Result<FetchOutcome> {
        if !can_search(query) {
            return Err(ScholarSearchError::Validation(format!(
                "Author query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }
        let authors = parse_author_query(query);
        if authors.is_empty() {
            return Err(ScholarSearchError::Validation("No author names given".to_string()));
        }

        let ticket = session.write().await.begin_fetch();
        info!(authors = ?authors, "Searching for publications");

        let result = self.client.query(&authors).await;
        let failed = result.is_err();
        if let Err(e) = &result {
            error!(error = %e, "Error fetching publications");
        }

        let mut guard = session.write().await;
        if !guard.complete_fetch(ticket, result) {
            return Ok(FetchOutcome::Superseded);
        }
        if failed {
            return Ok(FetchOutcome::Failed);
        }

        Ok(FetchOutcome::Loaded {
            authors: guard.results().len(),
            publications: guard.results().total_publications(),
        })
    }
}

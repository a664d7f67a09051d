//! Search session state.
//!
//! [`SearchSession`] is the single active dataset: the fetched result set, the
//! user's criteria, and the loading flags. Views are derived from it on demand
//! through [`crate::pipeline`]; nothing is cached.

use crate::error::Result;
use crate::models::{AuthorResultSet, Publication, QueryCriteria, SortOrder};
use crate::pipeline::{self, ResultPage};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Shortest author query that may be submitted
pub const MIN_QUERY_LEN: usize = 3;

/// Message shown once a search ran and nothing is displayed
pub const NO_RESULTS_MESSAGE: &str = "No publications found matching your search criteria.";

/// Whether `query` is long enough to submit.
pub fn can_search(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

/// Identifies one started fetch; completions for older tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Summary of the session for status displays
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub loading: bool,
    pub has_searched: bool,
    pub authors: Vec<String>,
    pub selected_authors: Vec<String>,
    pub total_publications: usize,
    pub matching: usize,
    pub criteria: QueryCriteria,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    results: AuthorResultSet,
    criteria: QueryCriteria,
    loading: bool,
    has_searched: bool,
    generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &AuthorResultSet {
        &self.results
    }

    pub fn criteria(&self) -> &QueryCriteria {
        &self.criteria
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// Mark a fetch as started: results are cleared and loading is set.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.has_searched = true;
        self.results.clear();
        debug!(generation = self.generation, "Fetch started");
        FetchTicket(self.generation)
    }

    /// Apply the outcome of a fetch.
    ///
    /// Success replaces the result set and selects every returned author;
    /// failure leaves the result set empty. Returns `false` when a newer fetch
    /// has started since `ticket` was issued, in which case nothing changes.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, outcome: Result<AuthorResultSet>) -> bool {
        if ticket.0 != self.generation {
            warn!(
                ticket = ticket.0,
                latest = self.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(results) => {
                info!(
                    authors = results.len(),
                    publications = results.total_publications(),
                    "Result set replaced"
                );
                self.criteria.selected_authors = results.authors().map(str::to_string).collect();
                self.results = results;
            }
            Err(_) => {
                debug!("Clearing results after failed fetch");
                self.results.clear();
                self.criteria.selected_authors.clear();
            }
        }
        self.criteria.page = 1;
        true
    }

    /// Select `author` if unselected, unselect it otherwise.
    pub fn toggle_author(&mut self, author: &str) {
        if !self.criteria.selected_authors.remove(author) {
            self.criteria.selected_authors.insert(author.to_string());
        }
    }

    pub fn select_all_authors(&mut self) {
        self.criteria.selected_authors = self.results.authors().map(str::to_string).collect();
    }

    /// Restrict the selection to the given authors (unknown names are ignored).
    pub fn select_authors<I, S>(&mut self, authors: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.criteria.selected_authors = authors
            .into_iter()
            .filter(|a| self.results.get(a.as_ref()).is_some())
            .map(|a| a.as_ref().to_string())
            .collect();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
    }

    pub fn set_year_range(&mut self, start: Option<i32>, end: Option<i32>) {
        self.criteria.start_year = start;
        self.criteria.end_year = end;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.criteria.sort_order = order;
    }

    /// Clear the year range and reselect every author. Term and sort stay.
    pub fn clear_filters(&mut self) {
        self.set_year_range(None, None);
        self.select_all_authors();
    }

    /// Displayed page count, at least one.
    pub fn page_count(&self) -> usize {
        let count = pipeline::select_publications(&self.results, &self.criteria).len();
        pipeline::total_pages(count).max(1)
    }

    /// Move to `page`, clamped to the available pages. Returns the new page.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.criteria.page = page.clamp(1, self.page_count());
        self.criteria.page
    }

    pub fn first_page(&mut self) -> usize {
        self.go_to_page(1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.go_to_page(self.criteria.page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.criteria.page + 1)
    }

    pub fn last_page(&mut self) -> usize {
        self.go_to_page(self.page_count())
    }

    /// Current page of results.
    pub fn view(&self) -> ResultPage<'_> {
        pipeline::derive(&self.results, &self.criteria)
    }

    /// Every publication matching the filters, ignoring the page.
    ///
    /// Exports are not sorted: they follow result-set order whatever the
    /// displayed sort order is.
    pub fn export_list(&self) -> Vec<&Publication> {
        pipeline::select_publications(&self.results, &self.criteria)
    }

    /// "No publications found" once a search ran and the current page is empty.
    pub fn status_message(&self) -> Option<&'static str> {
        if self.loading || !self.has_searched {
            return None;
        }
        if self.view().items.is_empty() {
            Some(NO_RESULTS_MESSAGE)
        } else {
            None
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let mut selected: Vec<String> = self.criteria.selected_authors.iter().cloned().collect();
        selected.sort();

        SessionSummary {
            loading: self.loading,
            has_searched: self.has_searched,
            authors: self.results.authors().map(str::to_string).collect(),
            selected_authors: selected,
            total_publications: self.results.total_publications(),
            matching: self.export_list().len(),
            criteria: self.criteria.clone(),
        }
    }
}

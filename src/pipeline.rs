//! Filter, sort and paginate publications.
//!
//! Everything here is a pure function of an [`AuthorResultSet`] and a
//! [`QueryCriteria`]; nothing mutates the publications. Filters compose by
//! intersection, except the text filter which matches when ANY searched field
//! contains the term.

use crate::models::{AuthorResultSet, Publication, QueryCriteria, SortOrder};
use serde::Serialize;

/// Publications per page
pub const PAGE_SIZE: usize = 10;

/// One derived page of results.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage<'a> {
    pub items: Vec<&'a Publication>,
    /// 1-based page that was requested
    pub page: usize,
    /// `ceil(total_count / PAGE_SIZE)`, zero when nothing matched
    pub total_pages: usize,
    /// Number of publications across all pages
    pub total_count: usize,
}

impl ResultPage<'_> {
    /// Page count shown to the user: an empty result is one empty page.
    pub fn display_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }
}

/// Apply author, text and year filters, keeping result-set order.
///
/// Authors come in response order, each author's publications in service
/// order. Exports operate on this list.
pub fn select_publications<'a>(
    results: &'a AuthorResultSet,
    criteria: &QueryCriteria,
) -> Vec<&'a Publication> {
    let term = criteria.search_term.to_lowercase();

    results
        .entries()
        .iter()
        .filter(|entry| criteria.selected_authors.contains(&entry.author))
        .flat_map(|entry| entry.publications.iter())
        .filter(|publication| matches_term(publication, &term))
        .filter(|publication| in_year_range(publication, criteria.start_year, criteria.end_year))
        .collect()
}

/// Apply author, text and year filters, then sort: the full pre-pagination list.
pub fn filter_publications<'a>(
    results: &'a AuthorResultSet,
    criteria: &QueryCriteria,
) -> Vec<&'a Publication> {
    let mut filtered = select_publications(results, criteria);
    sort_by_year(&mut filtered, criteria.sort_order);
    filtered
}

/// Case-insensitive substring match against the searchable fields.
///
/// `term_lower` must already be lowercased. An empty term matches everything,
/// including records whose fields are all empty.
pub fn matches_term(publication: &Publication, term_lower: &str) -> bool {
    if term_lower.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(term_lower);

    contains(&publication.title)
        || contains(&publication.authors_joined())
        || contains(&publication.abstract_text)
        || contains(&publication.link)
        || publication.year.is_some_and(|y| y.to_string().contains(term_lower))
        || publication.source.as_deref().is_some_and(contains)
}

/// Inclusive year bounds; an absent bound imposes no constraint.
///
/// A publication without a year fails any bound that is set.
pub fn in_year_range(publication: &Publication, start: Option<i32>, end: Option<i32>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    match publication.year {
        Some(year) => start.is_none_or(|s| year >= s) && end.is_none_or(|e| year <= e),
        None => false,
    }
}

/// Stable sort by year. Unknown years order before every known year.
///
/// Anything but [`SortOrder::Ascending`] lists newest first.
pub fn sort_by_year(publications: &mut [&Publication], order: SortOrder) {
    match order {
        SortOrder::Ascending => publications.sort_by_key(|p| p.year),
        SortOrder::Descending | SortOrder::None => publications.sort_by(|a, b| b.year.cmp(&a.year)),
    }
}

/// `ceil(count / PAGE_SIZE)`
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Slice out a 1-based page. Pages outside `[1, total_pages]` are empty.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Derive the page described by `criteria`.
pub fn derive<'a>(results: &'a AuthorResultSet, criteria: &QueryCriteria) -> ResultPage<'a> {
    let filtered = filter_publications(results, criteria);
    let total_count = filtered.len();

    ResultPage {
        items: paginate(&filtered, criteria.page).to_vec(),
        page: criteria.page,
        total_pages: total_pages(total_count),
        total_count,
    }
}

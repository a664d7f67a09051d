//! Publication data model.
//!
//! [`Publication`] records arrive from the publication service and are never
//! mutated afterwards. [`AuthorResultSet`] keeps them grouped per author in
//! the order the service returned the authors, and [`QueryCriteria`] holds
//! the user-selected filter, sort and page state.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A single bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Publication year; the service sends `null` when it cannot extract one
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, rename = "abstract", deserialize_with = "null_as_empty")]
    pub abstract_text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Publication {
    /// Authors joined the way they are displayed and searched.
    pub fn authors_joined(&self) -> String {
        self.authors.join(", ")
    }

    /// Year as display text, empty when unknown.
    pub fn year_text(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }

    /// Source as display text, "N/A" when unknown.
    pub fn source_or_na(&self) -> &str {
        self.source_label().unwrap_or("N/A")
    }

    fn source_label(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    /// Journal name used in BibTeX output.
    pub fn journal_or_placeholder(&self) -> &str {
        self.source_label().unwrap_or("Journal Name")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Publications of one author plus the opaque profile info the service attaches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorPublications {
    pub author: String,
    pub info: serde_json::Value,
    pub publications: Vec<Publication>,
}

/// Per-author publication map, in response order.
///
/// Author names are unique; inserting an existing author replaces its entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorResultSet {
    entries: Vec<AuthorPublications>,
}

impl AuthorResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, author: String, info: serde_json::Value, publications: Vec<Publication>) {
        let entry = AuthorPublications {
            author,
            info,
            publications,
        };
        match self.entries.iter_mut().find(|e| e.author == entry.author) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, author: &str) -> Option<&[Publication]> {
        self.entries
            .iter()
            .find(|e| e.author == author)
            .map(|e| e.publications.as_slice())
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.author.as_str())
    }

    pub fn entries(&self) -> &[AuthorPublications] {
        &self.entries
    }

    /// Number of authors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Publication count across all authors
    pub fn total_publications(&self) -> usize {
        self.entries.iter().map(|e| e.publications.len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(String, Vec<Publication>)> for AuthorResultSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Publication>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (author, publications) in iter {
            set.insert(author, serde_json::Value::Null, publications);
        }
        set
    }
}

/// Year sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
    /// No explicit choice; lists newest first, like `Descending`
    #[default]
    None,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ascending" | "asc" | "oldest" => Ok(Self::Ascending),
            "descending" | "desc" | "newest" => Ok(Self::Descending),
            "none" | "" => Ok(Self::None),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Filter, sort and page selection applied to an [`AuthorResultSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCriteria {
    pub selected_authors: HashSet<String>,
    pub search_term: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub sort_order: SortOrder,
    /// 1-based page index
    pub page: usize,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            selected_authors: HashSet::new(),
            search_term: String::new(),
            start_year: None,
            end_year: None,
            sort_order: SortOrder::None,
            page: 1,
        }
    }
}

impl QueryCriteria {
    /// Criteria with every author of `results` selected and nothing else set.
    pub fn all_authors(results: &AuthorResultSet) -> Self {
        Self {
            selected_authors: results.authors().map(str::to_string).collect(),
            ..Self::default()
        }
    }
}

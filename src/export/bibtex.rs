//! BibTeX export.
//!
//! One `@article` entry per publication, keyed `publication1`, `publication2`, ...
//! Fields are written in the order author, title, journal, year, url, abstract.

use crate::models::Publication;

/// Render one entry. `index` is 1-based.
pub fn format_entry(index: usize, publication: &Publication) -> String {
    let fields = [
        ("author", publication.authors.join(" and ")),
        ("title", publication.title.clone()),
        ("journal", publication.journal_or_placeholder().to_string()),
        ("year", publication.year_text()),
        ("url", publication.link.clone()),
        ("abstract", publication.abstract_text.clone()),
    ];

    let body = fields
        .iter()
        .map(|(key, value)| format!("    {:<9} = {{{}}}", key, value))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("@article{{publication{},\n{}\n}}", index, body)
}

/// Render all entries separated by a blank line.
pub fn to_bibtex(publications: &[&Publication]) -> String {
    publications
        .iter()
        .enumerate()
        .map(|(i, publication)| format_entry(i + 1, publication))
        .collect::<Vec<_>>()
        .join("\n\n")
}

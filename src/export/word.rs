//! Word export: a "Publications List" heading followed by one paragraph per
//! publication holding six labeled text runs.

use crate::error::{Result, ScholarSearchError};
use crate::models::Publication;
use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

/// Document heading
pub const HEADING: &str = "Publications List";

const HEADING_STYLE: &str = "Heading1";

/// Labeled fields of one publication, in display order.
pub fn labeled_fields(publication: &Publication) -> [String; 6] {
    [
        format!("Title: {}", publication.title),
        format!("Date: {}", publication.year_text()),
        format!("URL: {}", publication.link),
        format!("Abstract: {}", publication.abstract_text),
        format!("Authors: {}", publication.authors_joined()),
        format!("Source: {}", publication.source_or_na()),
    ]
}

fn publication_paragraph(publication: &Publication) -> Paragraph {
    let fields = labeled_fields(publication);
    let last = fields.len() - 1;

    fields
        .into_iter()
        .enumerate()
        .fold(Paragraph::new(), |paragraph, (i, text)| {
            let mut run = Run::new().add_text(text);
            if i < last {
                run = run.add_break(BreakType::TextWrapping);
            }
            paragraph.add_run(run)
        })
}

/// Render the publications as a `.docx` document.
pub fn to_docx(publications: &[&Publication]) -> Result<Vec<u8>> {
    let heading_style = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .bold()
        .size(32);

    let heading = Paragraph::new()
        .style(HEADING_STYLE)
        .add_run(Run::new().add_text(HEADING));

    let document = publications.iter().fold(
        Docx::new().add_style(heading_style).add_paragraph(heading),
        |doc, publication| doc.add_paragraph(publication_paragraph(publication)),
    );

    let mut buffer = Cursor::new(Vec::new());
    document
        .build()
        .pack(&mut buffer)
        .map_err(|e| ScholarSearchError::Export(format!("Failed to pack document: {}", e)))?;

    Ok(buffer.into_inner())
}

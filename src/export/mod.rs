//! Export adapters.
//!
//! Each adapter renders the complete filtered list (never a single page) fully
//! in memory. [`write_to_dir`] then persists the bytes through a temporary file
//! so a failed export leaves no partial document behind.

pub mod bibtex;
pub mod excel;
pub mod word;

use crate::error::{Result, ScholarSearchError};
use crate::models::Publication;
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Base name of every exported file
pub const EXPORT_FILE_STEM: &str = "FilteredPublications";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(alias = "excel")]
    Xlsx,
    #[serde(alias = "bibtex")]
    Bib,
    #[serde(alias = "word")]
    Docx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Xlsx, Self::Bib, Self::Docx];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Bib => "bib",
            Self::Docx => "docx",
        }
    }

    /// `FilteredPublications.<ext>`
    pub fn file_name(self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Bib => "text/plain; charset=utf-8",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScholarSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "bib" | "bibtex" => Ok(Self::Bib),
            "docx" | "word" => Ok(Self::Docx),
            other => Err(ScholarSearchError::Validation(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render `publications` in `format`.
pub fn render(format: ExportFormat, publications: &[&Publication]) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Xlsx => excel::to_xlsx(publications)?,
        ExportFormat::Bib => bibtex::to_bibtex(publications).into_bytes(),
        ExportFormat::Docx => word::to_docx(publications)?,
    };
    info!(format = %format, count = publications.len(), bytes = bytes.len(), "Rendered export");
    Ok(bytes)
}

/// Render and save `FilteredPublications.<ext>` into `dir`, replacing any previous file.
pub fn write_to_dir(format: ExportFormat, publications: &[&Publication], dir: &Path) -> Result<PathBuf> {
    let bytes = render(format, publications)?;

    std::fs::create_dir_all(dir)?;
    let target = dir.join(format.file_name());

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(&bytes)?;
    temp.flush()?;
    temp.persist(&target).map_err(|e| ScholarSearchError::Io(e.error))?;

    info!(path = %target.display(), "Saved export");
    Ok(target)
}

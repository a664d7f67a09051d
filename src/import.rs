//! Author list import.
//!
//! Reads a spreadsheet whose first column lists one author per row below a
//! header row, and joins the names into a comma-separated author query.

use crate::error::{Result, ScholarSearchError};
use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

type SheetBytes = Cursor<Vec<u8>>;

/// Supported spreadsheet kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Ods,
    Csv,
}

impl SheetFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ScholarSearchError::Import(format!("No file extension: {}", path.display())))?;
        ext.parse()
    }
}

impl FromStr for SheetFormat {
    type Err = ScholarSearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "ods" => Ok(Self::Ods),
            "csv" => Ok(Self::Csv),
            other => Err(ScholarSearchError::Import(format!(
                "Unsupported spreadsheet type: {}",
                other
            ))),
        }
    }
}

/// Read author names from a spreadsheet file.
pub fn authors_from_file(path: &Path) -> Result<Vec<String>> {
    let format = SheetFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), ?format, "Importing author list");
    authors_from_bytes(&bytes, format)
}

/// Read author names from spreadsheet bytes.
///
/// A file that cannot be opened or parsed is a [`ScholarSearchError::Import`]
/// error rather than an empty list; only a readable sheet without names
/// yields no authors.
pub fn authors_from_bytes(bytes: &[u8], format: SheetFormat) -> Result<Vec<String>> {
    let column = match format {
        SheetFormat::Csv => first_column_csv(bytes)?,
        SheetFormat::Xlsx => first_column_sheet::<calamine::Xlsx<SheetBytes>>(bytes)?,
        SheetFormat::Xls => first_column_sheet::<calamine::Xls<SheetBytes>>(bytes)?,
        SheetFormat::Ods => first_column_sheet::<calamine::Ods<SheetBytes>>(bytes)?,
    };

    let authors: Vec<String> = column
        .into_iter()
        .skip(1)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if authors.is_empty() {
        warn!("No author names found in the first column");
    } else {
        debug!(count = authors.len(), "Imported author names");
    }
    Ok(authors)
}

/// Comma-joined author query for a spreadsheet file.
pub fn query_from_file(path: &Path) -> Result<String> {
    Ok(authors_from_file(path)?.join(","))
}

fn first_column_csv(bytes: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut column = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ScholarSearchError::Import(format!("Invalid CSV: {}", e)))?;
        column.push(record.get(0).unwrap_or_default().to_string());
    }
    Ok(column)
}

fn first_column_sheet<R>(bytes: &[u8]) -> Result<Vec<String>>
where
    R: Reader<SheetBytes>,
    R::Error: std::fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ScholarSearchError::Import(format!("Cannot open spreadsheet: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ScholarSearchError::Import(format!("Cannot read sheet: {}", e)))?,
        None => return Ok(Vec::new()),
    };

    // Ranges start at the first used cell; read column A by absolute position.
    let Some((end_row, _)) = range.end() else {
        return Ok(Vec::new());
    };
    Ok((0..=end_row)
        .map(|row| range.get_value((row, 0)).map(cell_text).unwrap_or_default())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    #[test]
    fn test_csv_skips_header_and_blanks() -> Result<()> {
        let csv = "Author,Affiliation\nYann LeCun,NYU\n,\n  Andrew Ng ,Stanford\n";
        let authors = authors_from_bytes(csv.as_bytes(), SheetFormat::Csv)?;
        assert_eq!(authors, vec!["Yann LeCun", "Andrew Ng"]);
        Ok(())
    }

    #[test]
    fn test_xlsx_first_column() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Authors")?;
        sheet.write_string(1, 0, "Geoffrey Hinton")?;
        sheet.write_string(3, 0, "Yoshua Bengio")?;
        sheet.write_string(3, 1, "ignored")?;

        let dir = TempDir::new()?;
        let path = dir.path().join("authors.xlsx");
        workbook.save(&path)?;

        assert_eq!(query_from_file(&path)?, "Geoffrey Hinton,Yoshua Bengio");
        Ok(())
    }

    #[test]
    fn test_empty_sheet_gives_empty_query() -> Result<()> {
        assert!(authors_from_bytes(b"", SheetFormat::Csv)?.is_empty());
        assert!(authors_from_bytes(b"Header only\n", SheetFormat::Csv)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            SheetFormat::from_path(Path::new("authors.txt")),
            Err(ScholarSearchError::Import(_))
        ));
        assert!(SheetFormat::from_path(Path::new("authors")).is_err());
    }

    #[test]
    fn test_corrupt_workbook_is_error_not_empty() {
        for format in [SheetFormat::Xlsx, SheetFormat::Xls, SheetFormat::Ods] {
            assert!(
                matches!(
                    authors_from_bytes(b"not a workbook", format),
                    Err(ScholarSearchError::Import(_))
                ),
                "{format:?} should fail"
            );
        }
    }
}

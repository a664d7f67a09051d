//! Excel export: one worksheet, one row per publication.

use crate::error::{Result, ScholarSearchError};
use crate::models::Publication;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Worksheet name
pub const SHEET_NAME: &str = "Publications";

/// Header row, in column order
pub const COLUMNS: [&str; 6] = ["Title", "Date", "URL", "Abstract", "Authors", "Source"];

fn xlsx_err(e: XlsxError) -> ScholarSearchError {
    ScholarSearchError::Export(format!("Failed to build workbook: {}", e))
}

/// Render the publications as an `.xlsx` workbook.
pub fn to_xlsx(publications: &[&Publication]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(xlsx_err)?;
    }

    for (i, publication) in publications.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &publication.title).map_err(xlsx_err)?;
        if let Some(year) = publication.year {
            sheet.write_number(row, 1, f64::from(year)).map_err(xlsx_err)?;
        }
        sheet.write_string(row, 2, &publication.link).map_err(xlsx_err)?;
        sheet.write_string(row, 3, &publication.abstract_text).map_err(xlsx_err)?;
        sheet.write_string(row, 4, publication.authors_joined()).map_err(xlsx_err)?;
        sheet.write_string(row, 5, publication.source_or_na()).map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn test_rows_and_columns() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let publication = Publication {
            title: "Gradient-based learning".to_string(),
            year: Some(1998),
            link: "https://example.org/1".to_string(),
            abstract_text: "Abs".to_string(),
            authors: vec!["Y. LeCun".to_string(), "L. Bottou".to_string()],
            source: None,
        };

        let bytes = to_xlsx(&[&publication])?;
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook.worksheet_range(SHEET_NAME)?;

        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(rows.len(), 2);

        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, COLUMNS);

        let row: Vec<String> = rows[1].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            row,
            vec![
                "Gradient-based learning",
                "1998",
                "https://example.org/1",
                "Abs",
                "Y. LeCun, L. Bottou",
                "N/A"
            ]
        );
        Ok(())
    }
}

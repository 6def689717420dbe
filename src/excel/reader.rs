//! Workbook access through calamine (.xlsx, .xlsm, .xls, .ods)

use crate::error::{MergeError, MergeResult};
use crate::host::{SpreadsheetApp, Workbook, Worksheet};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::NaiveTime;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Spreadsheet host backed by calamine. Stateless; every workbook is read
/// into memory on open.
#[derive(Debug, Default)]
pub struct CalamineApp {
    _private: (),
}

impl CalamineApp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpreadsheetApp for CalamineApp {
    type Workbook = CalamineWorkbook;

    fn open_workbook(&mut self, path: &Path) -> MergeResult<CalamineWorkbook> {
        let sheets = open_workbook_auto(path)?;
        debug!(path = %path.display(), "workbook opened");
        Ok(CalamineWorkbook {
            path: path.to_path_buf(),
            sheets: Some(sheets),
        })
    }

    fn quit(&mut self) -> MergeResult<()> {
        debug!("spreadsheet host released");
        Ok(())
    }
}

pub struct CalamineWorkbook {
    path: PathBuf,
    sheets: Option<Sheets<BufReader<File>>>,
}

impl Workbook for CalamineWorkbook {
    type Sheet = CalamineSheet;

    fn worksheet(&mut self, name: &str) -> MergeResult<CalamineSheet> {
        let sheets = self.sheets.as_mut().ok_or_else(|| {
            MergeError::Validation(format!("workbook {} is closed", self.path.display()))
        })?;

        let available = sheets.sheet_names();
        if !available.iter().any(|s| s == name) {
            return Err(MergeError::WorksheetNotFound {
                sheet: name.to_string(),
                available,
            });
        }

        let range = sheets.worksheet_range(name)?;
        Ok(CalamineSheet { range })
    }

    fn close(&mut self) -> MergeResult<()> {
        if self.sheets.take().is_some() {
            debug!(path = %self.path.display(), "workbook closed");
        }
        Ok(())
    }
}

/// One worksheet's used range. Lookups use absolute sheet positions, so a
/// range that does not start at A1 still answers `cell(1, 1)` correctly.
pub struct CalamineSheet {
    range: Range<Data>,
}

impl From<Range<Data>> for CalamineSheet {
    fn from(range: Range<Data>) -> Self {
        Self { range }
    }
}

impl Worksheet for CalamineSheet {
    fn cell(&self, row: u32, col: u32) -> Option<String> {
        let position = (row.checked_sub(1)?, col.checked_sub(1)?);
        self.range.get_value(position).and_then(cell_to_text)
    }
}

/// Render a cell the way it reads in the sheet. `None` for empty cells.
pub fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(naive) if !dt.is_duration() => {
                if naive.time() == NaiveTime::MIN {
                    naive.format("%Y-%m-%d").to_string()
                } else {
                    naive.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            _ => format_float(dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

fn format_float(f: f64) -> String {
    // Whole numbers are stored as floats; show them without ".0"
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_cell_to_text_scalars() {
        assert_eq!(cell_to_text(&Data::Empty), None);
        assert_eq!(cell_to_text(&Data::String("Ada".into())), Some("Ada".into()));
        assert_eq!(cell_to_text(&Data::Int(42)), Some("42".into()));
        assert_eq!(cell_to_text(&Data::Bool(true)), Some("TRUE".into()));
        assert_eq!(cell_to_text(&Data::Bool(false)), Some("FALSE".into()));
    }

    #[test]
    fn test_cell_to_text_floats() {
        assert_eq!(cell_to_text(&Data::Float(100.0)), Some("100".into()));
        assert_eq!(cell_to_text(&Data::Float(-3.0)), Some("-3".into()));
        assert_eq!(cell_to_text(&Data::Float(12.5)), Some("12.5".into()));
        assert_eq!(cell_to_text(&Data::Float(0.1)), Some("0.1".into()));
    }

    #[test]
    fn test_cell_to_text_error_literal() {
        assert_eq!(
            cell_to_text(&Data::Error(CellErrorType::Div0)),
            Some("#DIV/0!".into())
        );
    }

    #[test]
    fn test_cell_to_text_iso_strings_pass_through() {
        assert_eq!(
            cell_to_text(&Data::DateTimeIso("2025-05-08".into())),
            Some("2025-05-08".into())
        );
    }

    #[test]
    fn test_sheet_uses_absolute_positions() {
        // Used range starting at B2
        let mut range = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("Name".into()));
        range.set_value((2, 1), Data::String("Ada".into()));
        let sheet = CalamineSheet::from(range);

        assert_eq!(sheet.cell(1, 1), None);
        assert_eq!(sheet.cell(2, 2), Some("Name".into()));
        assert_eq!(sheet.cell(3, 2), Some("Ada".into()));
        assert_eq!(sheet.cell(0, 1), None);
        assert_eq!(sheet.cell(50, 50), None);
    }

    #[test]
    fn test_missing_worksheet_lists_available_and_closes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample.xlsx");
        crate::excel::write_sample_workbook(&path).unwrap();

        let mut workbook = CalamineApp::new().open_workbook(&path).unwrap();
        let err = workbook.worksheet("Budget").err().unwrap();
        match err {
            MergeError::WorksheetNotFound { sheet, available } => {
                assert_eq!(sheet, "Budget");
                assert_eq!(available, vec!["Sheet1"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        workbook.close().unwrap();
        assert!(matches!(
            workbook.worksheet("Sheet1"),
            Err(MergeError::Validation(_))
        ));
    }
}

//! Sample workbook for `docmerge init`

use crate::config::DEFAULT_SHEET_NAME;
use crate::error::{MergeError, MergeResult};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Header row of the sample workbook. The sample template carries one
/// bookmark per entry.
pub const SAMPLE_FIELDS: [&str; 3] = ["Time", "Name", "Budget"];

const SAMPLE_ROWS: [(&str, &str, f64); 3] = [
    ("Morning", "Ming", 100.0),
    ("Noon", "Hua", 300.0),
    ("Evening", "Mei", 600.0),
];

/// Write a three-row workbook with [`SAMPLE_FIELDS`] as headers.
pub fn write_sample_workbook(path: &Path) -> MergeResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(DEFAULT_SHEET_NAME)
        .map_err(|e| MergeError::Export(format!("Failed to set worksheet name: {}", e)))?;

    for (col, name) in SAMPLE_FIELDS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &bold)
            .map_err(|e| MergeError::Export(format!("Failed to write header: {}", e)))?;
    }

    for (idx, (time, name, budget)) in SAMPLE_ROWS.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet
            .write_string(row, 0, *time)
            .and_then(|ws| ws.write_string(row, 1, *name))
            .and_then(|ws| ws.write_number(row, 2, *budget))
            .map_err(|e| MergeError::Export(format!("Failed to write row {}: {}", row, e)))?;
    }

    workbook
        .save(path)
        .map_err(|e| MergeError::Export(format!("Failed to save Excel file: {}", e)))?;

    Ok(())
}

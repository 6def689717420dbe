//! Data loader: worksheet rows → [`RecordSet`]

use crate::error::{MergeError, MergeResult};
use crate::host::{SpreadsheetApp, Workbook, Worksheet};
use crate::types::{Record, RecordSet};
use std::path::Path;
use tracing::{debug, info};

/// Open `path`, read worksheet `sheet` and close the workbook again.
///
/// The workbook is closed on every exit path. When both reading and closing
/// fail, the read error wins.
pub fn load_records<A: SpreadsheetApp>(
    app: &mut A,
    path: &Path,
    sheet: &str,
) -> MergeResult<RecordSet> {
    info!(path = %path.display(), sheet, "loading records");
    let mut workbook = app.open_workbook(path)?;

    let result = workbook
        .worksheet(sheet)
        .and_then(|worksheet| read_records(&worksheet));
    let closed = workbook.close();

    let records = result?;
    closed?;
    info!(
        fields = records.fields.len(),
        records = records.len(),
        "records loaded"
    );
    Ok(records)
}

/// Scan the header row, then every contiguous data row below it.
pub fn read_records<S: Worksheet>(sheet: &S) -> MergeResult<RecordSet> {
    let fields = read_headers(sheet);
    if fields.is_empty() {
        return Err(MergeError::NoHeaders);
    }
    debug!(?fields, "header row");

    let mut records = RecordSet::new(fields);
    let mut row = 2;
    while !is_blank(sheet.cell(row, 1)) {
        let record: Record = records
            .fields
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let value = sheet.cell(row, idx as u32 + 1).unwrap_or_default();
                (name.clone(), value)
            })
            .collect();
        records.push(record);
        row += 1;
    }
    debug!(last_row = row - 1, "row scan stopped at empty first cell");

    Ok(records)
}

fn read_headers<S: Worksheet>(sheet: &S) -> Vec<String> {
    let mut headers = Vec::new();
    let mut col = 1;
    while let Some(text) = sheet.cell(1, col).filter(|t| !t.is_empty()) {
        headers.push(text.trim().to_string());
        col += 1;
    }
    headers
}

fn is_blank(cell: Option<String>) -> bool {
    cell.map_or(true, |text| text.is_empty())
}

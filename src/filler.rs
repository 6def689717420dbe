//! Document filler: one output document per record

use crate::config::OUTPUT_EXTENSION;
use crate::error::MergeResult;
use crate::host::{Document, DocumentApp};
use crate::types::Record;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `<index>_<prefix>.docx`, with `index` zero-padded to the digit count of `total`.
pub fn output_file_name(index: usize, total: usize, prefix: &str) -> String {
    let width = total.to_string().len();
    format!("{:0width$}_{}.{}", index, prefix, OUTPUT_EXTENSION, width = width)
}

/// Generate one document per record from `template` into `out_dir`.
///
/// `progress` receives `processed / total` after every saved document. With
/// no records it is called once with `1.0`. The first failing record aborts
/// the batch; documents already written stay on disk.
pub fn fill_documents<A, F>(
    app: &mut A,
    template: &Path,
    out_dir: &Path,
    records: &[Record],
    prefix: &str,
    mut progress: F,
) -> MergeResult<Vec<PathBuf>>
where
    A: DocumentApp,
    F: FnMut(f64),
{
    fs::create_dir_all(out_dir)?;

    let total = records.len();
    if total == 0 {
        progress(1.0);
        return Ok(Vec::new());
    }

    info!(
        template = %template.display(),
        out_dir = %out_dir.display(),
        total,
        "filling documents"
    );

    let mut written = Vec::with_capacity(total);
    for (idx, record) in records.iter().enumerate() {
        let index = idx + 1;
        let mut document = app.create_from_template(template)?;

        for (name, value) in record.iter() {
            if document.bookmark_exists(name) {
                document.set_bookmark_text(name, value)?;
            } else {
                debug!(field = name, "no bookmark for field");
            }
        }

        let path = out_dir.join(output_file_name(index, total, prefix));
        document.save_as(&path)?;
        document.close()?;
        debug!(index, path = %path.display(), "document written");

        written.push(path);
        progress(index as f64 / total as f64);
    }

    Ok(written)
}

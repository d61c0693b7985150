//! Delimited (CSV) export of tables.
//!
//! Works for any serializable row type: station lookups and normalized
//! train tables both go through here.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;

/// Errors from writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Write rows as CSV with a header line.
pub fn write_csv<W, S>(writer: W, rows: impl IntoIterator<Item = S>) -> Result<(), ExportError>
where
    W: io::Write,
    S: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as CSV to a file, replacing it if it exists.
pub fn export_csv<S: Serialize>(
    path: impl AsRef<Path>,
    rows: impl IntoIterator<Item = S>,
) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_csv(file, rows)
}

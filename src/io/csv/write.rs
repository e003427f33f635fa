//! CSV writing operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::{Error, Result};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(),
            format!("[io::csv::write] failed to create {}: {e}", path.display()))))?;
    CsvWriter::new(file).finish(df)?;
    Ok(())
}

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(df)?;
    String::from_utf8(buffer)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

use crate::{Error, Result};

/// Reads a CSV file with every column as a string, so identifiers keep
/// their leading zeros and numeric parsing stays under our control.
pub(crate) fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| Error::load(path, format!("[io::csv::read] failed to open CSV file: {e}")))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| Error::load(path, format!("[io::csv::read] failed to parse CSV: {e}")))
}

/// Reads CSV text, with every column as a string.
pub(crate) fn read_csv_string_as_strings(csv: &str) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));
    Ok(CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(options)
        .finish()?)
}

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;

    #[test]
    fn identifiers_keep_leading_zeros() {
        let df = read_csv_string_as_strings("id,hectares\n00123,4.5\n").unwrap();
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("id").unwrap().str().unwrap().get(0), Some("00123"));
        assert_eq!(df.column("hectares").unwrap().str().unwrap().get(0), Some("4.5"));
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = read_csv_as_strings(Path::new("/nonexistent/clientes.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::LoadError);
    }
}

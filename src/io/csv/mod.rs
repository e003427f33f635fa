//! Registry tables in, report tables out. Registries are read as all-string
//! frames; typing happens in the registry loader.

mod read;
mod write;

pub(crate) use read::{read_csv_as_strings, read_csv_string_as_strings};
pub(crate) use write::{write_csv, write_csv_string};

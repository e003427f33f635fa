//! Format-specific reading and writing.
//!
//! - `csv` - customer registries in, classification and aggregate tables out

pub(crate) mod csv;

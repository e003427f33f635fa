use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of the selection / classification / aggregation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Hazard or boundary source is missing, unreadable or malformed.
    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// CRS undeclared, unsupported, or a coordinate could not be transformed.
    #[error("projection error: {0}")]
    Projection(String),

    /// A polygon is degenerate and its area cannot be trusted.
    #[error("invalid geometry (polygon {index}): {reason}")]
    Geometry { index: usize, reason: String },

    /// No day produced usable hazard data.
    #[error("no usable hazard data: {0}")]
    NoData(String),

    /// No active customer with a position is available.
    #[error("no eligible customers: {0}")]
    EmptyRegistry(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("table error: {0}")]
    Table(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run for advisory {0} was cancelled")]
    Cancelled(u32),

    #[error("advisory {0} is already being processed")]
    AlreadyRunning(u32),
}

/// Serializable error category reported in a run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    LoadError,
    ProjectionError,
    GeometryError,
    NoDataError,
    EmptyRegistryError,
    ConfigError,
    TableError,
    IoError,
    Cancelled,
    AlreadyRunning,
}

impl Error {
    /// Build a [`Error::Load`] for `path`.
    pub(crate) fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Load { path: path.into(), message: message.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } => ErrorKind::LoadError,
            Self::Projection(_) => ErrorKind::ProjectionError,
            Self::Geometry { .. } => ErrorKind::GeometryError,
            Self::NoData(_) => ErrorKind::NoDataError,
            Self::EmptyRegistry(_) => ErrorKind::EmptyRegistryError,
            Self::Config(_) => ErrorKind::ConfigError,
            Self::Table(_) => ErrorKind::TableError,
            Self::Io(_) => ErrorKind::IoError,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::AlreadyRunning(_) => ErrorKind::AlreadyRunning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_snake_case() {
        let err = Error::NoData("no days".into());
        assert_eq!(err.kind(), ErrorKind::NoDataError);
        assert_eq!(serde_json::to_string(&err.kind()).unwrap(), "\"no_data_error\"");
        assert_eq!(serde_json::to_string(&ErrorKind::EmptyRegistryError).unwrap(), "\"empty_registry_error\"");
    }

    #[test]
    fn load_error_names_the_path() {
        let err = Error::load("TEMP/aviso_1/dia2/view_aviso.shp", "file not found");
        assert_eq!(err.kind(), ErrorKind::LoadError);
        assert!(err.to_string().contains("dia2/view_aviso.shp"));
    }
}

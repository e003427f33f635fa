use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How the hazard join labels customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Every severity tier is assigned.
    #[default]
    Tiered,
    /// Only High/Critical polygons count; everything else is unclassified.
    Exposure,
}

/// Attribute names tried, in order and case-insensitively, on boundary layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryFields {
    pub department: Vec<String>,
    pub province: Vec<String>,
    pub district: Vec<String>,
}

impl Default for BoundaryFields {
    fn default() -> Self {
        Self {
            department: vec!["DEPARTAMEN".into(), "DPTONOM02".into(), "NOMBDEP".into()],
            province: vec!["PROVINCIA".into(), "NOMBPROV".into()],
            district: vec!["DISTRITO".into(), "NOMBDIST".into()],
        }
    }
}

/// Pipeline settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metric CRS used to measure hazard area (WGS 84 / UTM 18S).
    pub metric_epsg: u32,
    /// CRS of customer latitude/longitude.
    pub customer_epsg: u32,
    /// CRS assumed for hazard layers shipped without a usable `.prj`.
    pub assume_hazard_epsg: Option<u32>,
    /// Attribute names holding the polygon severity.
    pub severity_fields: Vec<String>,
    pub boundary_fields: BoundaryFields,
    pub percentage_precision: u32,
    /// Count customers without position in aggregates (registry address only).
    pub include_unlocated: bool,
    pub mode: JoinMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metric_epsg: 32718,
            customer_epsg: 4326,
            assume_hazard_epsg: None,
            severity_fields: vec!["nivel".into(), "color".into(), "severity".into()],
            boundary_fields: BoundaryFields::default(),
            percentage_precision: 2,
            include_unlocated: false,
            mode: JoinMode::Tiered,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.severity_fields.is_empty() {
            return Err(Error::Config("severity_fields must not be empty".into()));
        }
        if self.percentage_precision > 6 {
            return Err(Error::Config(format!(
                "percentage_precision must be at most 6, got {}", self.percentage_precision
            )));
        }
        Ok(())
    }
}

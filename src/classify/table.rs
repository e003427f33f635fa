use std::path::Path;

use polars::{frame::DataFrame, prelude::Column};
use serde::Serialize;

use crate::{io::csv::{write_csv, write_csv_string}, layer::{AdminLevel, AdminUnit, RiskTier}, Result};

/// Where a row's administrative unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSource {
    /// At least one level was found by the boundary join.
    Spatial,
    /// Only the registry address was available.
    Registry,
    /// Neither join nor registry named a unit.
    Unknown,
}

impl UnitSource {
    pub fn to_str(&self) -> &'static str {
        match self {
            UnitSource::Spatial => "spatial",
            UnitSource::Registry => "registry",
            UnitSource::Unknown => "unknown",
        }
    }
}

/// Classification of one active customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRow {
    pub customer_id: String,
    pub tier: RiskTier,
    pub located: bool,
    pub unit: AdminUnit,
    pub unit_source: UnitSource,
    pub hectares: Option<f64>,
    pub insured_amount: Option<f64>,
}

/// Classification of every active customer against one day's hazard layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassificationTable {
    pub(crate) day: Option<u8>,
    pub(crate) rows: Vec<ClassificationRow>,
}

impl ClassificationTable {
    pub fn new(day: Option<u8>, rows: Vec<ClassificationRow>) -> Self { Self { day, rows } }

    #[inline] pub fn day(&self) -> Option<u8> { self.day }

    #[inline] pub fn rows(&self) -> &[ClassificationRow] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Number of rows with a position.
    pub fn located(&self) -> usize { self.rows.iter().filter(|r| r.located).count() }

    pub fn get(&self, customer_id: &str) -> Option<&ClassificationRow> {
        self.rows.iter().find(|r| r.customer_id == customer_id)
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.rows;
        let names = |level: AdminLevel| rows.iter().map(|r| r.unit.get(level).map(str::to_string)).collect::<Vec<_>>();

        Ok(DataFrame::new(vec![
            Column::new("customer_id".into(), rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>()),
            Column::new("tier".into(), rows.iter().map(|r| r.tier.to_str()).collect::<Vec<_>>()),
            Column::new("tier_label".into(), rows.iter().map(|r| r.tier.label()).collect::<Vec<_>>()),
            Column::new("located".into(), rows.iter().map(|r| r.located).collect::<Vec<_>>()),
            Column::new("department".into(), names(AdminLevel::Department)),
            Column::new("province".into(), names(AdminLevel::Province)),
            Column::new("district".into(), names(AdminLevel::District)),
            Column::new("unit_source".into(), rows.iter().map(|r| r.unit_source.to_str()).collect::<Vec<_>>()),
            Column::new("hectares".into(), rows.iter().map(|r| r.hectares).collect::<Vec<_>>()),
            Column::new("insured_amount".into(), rows.iter().map(|r| r.insured_amount).collect::<Vec<_>>()),
        ])?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        write_csv(&mut self.to_dataframe()?, path)
    }

    pub fn to_csv_string(&self) -> Result<String> {
        write_csv_string(&mut self.to_dataframe()?)
    }
}

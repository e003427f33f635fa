use std::path::Path;

use geo::Point;
use polars::{error::PolarsError, frame::DataFrame, prelude::DataType};
use serde::{Deserialize, Serialize};

use crate::{io::csv::{read_csv_as_strings, read_csv_string_as_strings}, layer::AdminUnit, Result};

/// Accepted header names per field, matched case-insensitively.
const ID: &[&str] = &["id", "customer_id", "cliente_id", "codigo"];
const LATITUDE: &[&str] = &["latitude", "latitud", "lat"];
const LONGITUDE: &[&str] = &["longitude", "longitud", "lon", "lng"];
const DEPARTMENT: &[&str] = &["department", "departamento"];
const PROVINCE: &[&str] = &["province", "provincia"];
const DISTRICT: &[&str] = &["district", "distrito"];
const HECTARES: &[&str] = &["hectares", "hectareas"];
const INSURED_AMOUNT: &[&str] = &["insured_amount", "monto_asegurado"];
const ACTIVE: &[&str] = &["active", "estado", "status"];

/// One insured customer as listed in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub department: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub hectares: Option<f64>,
    pub insured_amount: Option<f64>,
    pub active: bool,
}

impl Customer {
    /// A located customer with no address or metrics.
    pub fn at(id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            department: None,
            province: None,
            district: None,
            hectares: None,
            insured_amount: None,
            active: true,
        }
    }

    /// Position as (x = longitude, y = latitude), if both are present and finite.
    pub fn position(&self) -> Option<Point<f64>> {
        match (self.longitude, self.latitude) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Administrative unit recorded in the registry address.
    pub fn registry_unit(&self) -> AdminUnit {
        AdminUnit::new(self.department.as_deref(), self.province.as_deref(), self.district.as_deref())
    }
}

/// The customer registry.
#[derive(Debug, Clone, Default)]
pub struct CustomerRegistry {
    customers: Vec<Customer>,
}

impl CustomerRegistry {
    pub fn new(customers: Vec<Customer>) -> Self { Self { customers } }

    /// Read a registry CSV. Only the id column is required.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let registry = Self::from_dataframe(&read_csv_as_strings(path)?)?;
        log::info!("[registry] {} customers ({} active) from {}",
            registry.len(), registry.active().count(), path.display());
        Ok(registry)
    }

    pub fn from_csv_string(csv: &str) -> Result<Self> {
        Self::from_dataframe(&read_csv_string_as_strings(csv)?)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let ids = string_column(df, ID)?
            .ok_or_else(|| PolarsError::ColumnNotFound(format!("customer id column (one of {ID:?})").into()))?;
        let latitudes = number_column(df, LATITUDE)?;
        let longitudes = number_column(df, LONGITUDE)?;
        let departments = string_column(df, DEPARTMENT)?;
        let provinces = string_column(df, PROVINCE)?;
        let districts = string_column(df, DISTRICT)?;
        let hectares = number_column(df, HECTARES)?;
        let amounts = number_column(df, INSURED_AMOUNT)?;
        let active = string_column(df, ACTIVE)?;

        let at = |column: &Option<Vec<Option<String>>>, row: usize| column.as_ref().and_then(|c| c[row].clone());
        let num = |column: &Option<Vec<Option<f64>>>, row: usize| column.as_ref().and_then(|c| c[row]);

        let mut customers = Vec::with_capacity(ids.len());
        for (row, id) in ids.iter().enumerate() {
            let Some(id) = id else {
                log::warn!("[registry] row {} has no customer id, skipping", row + 1);
                continue
            };
            customers.push(Customer {
                id: id.clone(),
                latitude: num(&latitudes, row),
                longitude: num(&longitudes, row),
                department: at(&departments, row),
                province: at(&provinces, row),
                district: at(&districts, row),
                hectares: num(&hectares, row),
                insured_amount: num(&amounts, row),
                active: active.as_ref().is_none_or(|c| parse_active(id, c[row].as_deref())),
            });
        }

        Ok(Self { customers })
    }

    #[inline] pub fn len(&self) -> usize { self.customers.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.customers.is_empty() }

    #[inline] pub fn customers(&self) -> &[Customer] { &self.customers }

    pub fn active(&self) -> impl Iterator<Item = &Customer> {
        self.customers.iter().filter(|c| c.active)
    }
}

/// Trimmed, non-empty string values of the first column matching `aliases`.
fn string_column(df: &DataFrame, aliases: &[&str]) -> Result<Option<Vec<Option<String>>>> {
    let Some(name) = df.get_column_names().into_iter()
        .find(|name| aliases.iter().any(|alias| name.as_str().eq_ignore_ascii_case(alias)))
        .cloned() else { return Ok(None) };

    let column = df.column(name.as_str())?.cast(&DataType::String)?;
    Ok(Some(column.str()?.into_iter()
        .map(|value| value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect()))
}

/// Numeric values of the first column matching `aliases`; unparsable cells become missing.
fn number_column(df: &DataFrame, aliases: &[&str]) -> Result<Option<Vec<Option<f64>>>> {
    Ok(string_column(df, aliases)?.map(|values| values.into_iter()
        .map(|value| value.and_then(|s| parse_number(&s)))
        .collect()))
}

fn parse_number(text: &str) -> Option<f64> {
    let parsed = text.parse::<f64>().ok().filter(|n| n.is_finite());
    if parsed.is_none() {
        log::debug!("[registry] ignoring non-numeric value {text:?}");
    }
    parsed
}

/// Registry status flag. Blank or unknown values count as inactive.
fn parse_active(id: &str, value: Option<&str>) -> bool {
    let Some(value) = value else { return false };
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "si" | "sí" | "activo" | "activa" | "active" => true,
        "false" | "f" | "0" | "no" | "n" | "inactivo" | "inactiva" | "inactive" => false,
        other => {
            log::warn!("[registry] customer {id}: unknown status {other:?}, treating as inactive");
            false
        }
    }
}

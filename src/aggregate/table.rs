use std::path::Path;

use polars::{frame::DataFrame, prelude::Column};

use crate::{io::csv::write_csv, layer::{AdminLevel, AdminUnit}, Result};
use super::aggregator::{AggregationRow, DamageRow};

fn unit_columns<'a>(units: impl Iterator<Item = Option<&'a AdminUnit>> + Clone) -> Vec<Column> {
    AdminLevel::order().into_iter()
        .map(|level| Column::new(
            level.to_str().into(),
            units.clone().map(|u| u.and_then(|u| u.get(level)).map(str::to_string)).collect::<Vec<_>>(),
        ))
        .collect()
}

/// Columns: group, tier, department, province, district, count, hectares, insured_amount, percentage.
pub fn aggregation_to_dataframe(rows: &[AggregationRow]) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new("group".into(), rows.iter().map(|r| r.key.label()).collect::<Vec<_>>()),
        Column::new("tier".into(), rows.iter().map(|r| r.key.tier().map(|t| t.to_str())).collect::<Vec<_>>()),
    ];
    columns.extend(unit_columns(rows.iter().map(|r| r.key.unit())));
    columns.extend([
        Column::new("count".into(), rows.iter().map(|r| r.count as u64).collect::<Vec<_>>()),
        Column::new("hectares".into(), rows.iter().map(|r| r.hectares).collect::<Vec<_>>()),
        Column::new("insured_amount".into(), rows.iter().map(|r| r.insured_amount).collect::<Vec<_>>()),
        Column::new("percentage".into(), rows.iter().map(|r| r.percentage).collect::<Vec<_>>()),
    ]);
    Ok(DataFrame::new(columns)?)
}

pub fn write_aggregation_csv(rows: &[AggregationRow], path: &Path) -> Result<()> {
    write_csv(&mut aggregation_to_dataframe(rows)?, path)
}

/// Columns: department, province, district, total, affected, affected_hectares, affected_amount, pct_damage.
pub fn damage_to_dataframe(rows: &[DamageRow]) -> Result<DataFrame> {
    let mut columns = unit_columns(rows.iter().map(|r| Some(&r.unit)));
    columns.extend([
        Column::new("total".into(), rows.iter().map(|r| r.total as u64).collect::<Vec<_>>()),
        Column::new("affected".into(), rows.iter().map(|r| r.affected as u64).collect::<Vec<_>>()),
        Column::new("affected_hectares".into(), rows.iter().map(|r| r.affected_hectares).collect::<Vec<_>>()),
        Column::new("affected_amount".into(), rows.iter().map(|r| r.affected_amount).collect::<Vec<_>>()),
        Column::new("pct_damage".into(), rows.iter().map(|r| r.pct_damage).collect::<Vec<_>>()),
    ]);
    Ok(DataFrame::new(columns)?)
}

pub fn write_damage_csv(rows: &[DamageRow], path: &Path) -> Result<()> {
    write_csv(&mut damage_to_dataframe(rows)?, path)
}

/// Columns: department, province, district.
pub fn units_to_dataframe(units: &[AdminUnit]) -> Result<DataFrame> {
    Ok(DataFrame::new(unit_columns(units.iter().map(Some)))?)
}

pub fn write_units_csv(units: &[AdminUnit], path: &Path) -> Result<()> {
    write_csv(&mut units_to_dataframe(units)?, path)
}

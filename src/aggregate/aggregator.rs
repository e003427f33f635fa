use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
    classify::{ClassificationRow, ClassificationTable},
    config::Config,
    layer::{AdminLevel, AdminUnit, RiskTier},
    Error, Result,
};

/// Grouping applied by [`Aggregator::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Tier,
    Unit(AdminLevel),
    TierAndUnit(AdminLevel),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Tier(RiskTier),
    Unit(AdminUnit),
    TierAndUnit(RiskTier, AdminUnit),
}

impl GroupKey {
    pub fn tier(&self) -> Option<RiskTier> {
        match self {
            GroupKey::Tier(tier) | GroupKey::TierAndUnit(tier, _) => Some(*tier),
            GroupKey::Unit(_) => None,
        }
    }

    pub fn unit(&self) -> Option<&AdminUnit> {
        match self {
            GroupKey::Unit(unit) | GroupKey::TierAndUnit(_, unit) => Some(unit),
            GroupKey::Tier(_) => None,
        }
    }

    /// Human-readable group name, e.g. "Rojo", "CUSCO" or "Rojo | CUSCO".
    pub fn label(&self) -> String {
        let unit = |u: &AdminUnit| if u.is_empty() { "SIN DATOS".to_string() } else { u.label() };
        match self {
            GroupKey::Tier(tier) => tier.label().to_string(),
            GroupKey::Unit(u) => unit(u),
            GroupKey::TierAndUnit(tier, u) => format!("{} | {}", tier.label(), unit(u)),
        }
    }
}

/// One group of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    pub key: GroupKey,
    pub count: usize,
    pub hectares: f64,
    pub insured_amount: f64,
    /// Share of eligible customers, in percent.
    pub percentage: f64,
}

/// Per-unit damage summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageRow {
    pub unit: AdminUnit,
    pub total: usize,
    /// Customers at High or Critical tier.
    pub affected: usize,
    pub affected_hectares: f64,
    pub affected_amount: f64,
    pub pct_damage: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    count: usize,
    hectares: f64,
    insured_amount: f64,
}

impl Totals {
    fn add(&mut self, row: &ClassificationRow) {
        self.count += 1;
        self.hectares += row.hectares.unwrap_or(0.0);
        self.insured_amount += row.insured_amount.unwrap_or(0.0);
    }
}

/// Groups classification rows into counts, sums and percentages.
#[derive(Debug, Clone)]
pub struct Aggregator {
    precision: u32,
    include_unlocated: bool,
    reference_units: BTreeMap<AdminLevel, Vec<AdminUnit>>,
}

impl Default for Aggregator {
    fn default() -> Self { Self::new(&Config::default()) }
}

impl Aggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            precision: config.percentage_precision,
            include_unlocated: config.include_unlocated,
            reference_units: BTreeMap::new(),
        }
    }

    /// Units of `level` that must appear in groupings at that level even
    /// with no customers.
    pub fn with_reference_units(mut self, level: AdminLevel, units: impl IntoIterator<Item = AdminUnit>) -> Self {
        self.reference_units.entry(level).or_default().extend(units);
        self
    }

    pub fn include_unlocated(mut self, include: bool) -> Self {
        self.include_unlocated = include;
        self
    }

    fn eligible<'t>(&self, table: &'t ClassificationTable) -> Result<Vec<&'t ClassificationRow>> {
        let rows = table.rows().iter()
            .filter(|r| r.located || self.include_unlocated)
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return Err(Error::EmptyRegistry(format!(
                "no eligible rows among {} classified customers (include_unlocated = {})",
                table.len(), self.include_unlocated,
            )));
        }
        Ok(rows)
    }

    /// Units at `level` in report order: named units by name, unknown last.
    fn units<'r>(&self, level: AdminLevel, observed: impl Iterator<Item = &'r AdminUnit>) -> Vec<AdminUnit> {
        let reference = self.reference_units.get(&level).into_iter().flatten();
        let mut units = reference.map(|u| u.truncate(level))
            .chain(observed.map(|u| u.truncate(level)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        units.sort_by_key(|u| u.get(level).is_none());
        units
    }

    pub fn aggregate(&self, table: &ClassificationTable, group_by: GroupBy) -> Result<Vec<AggregationRow>> {
        let rows = self.eligible(table)?;
        let total = rows.len();

        let key_of = |row: &ClassificationRow| match group_by {
            GroupBy::Tier => GroupKey::Tier(row.tier),
            GroupBy::Unit(level) => GroupKey::Unit(row.unit.truncate(level)),
            GroupBy::TierAndUnit(level) => GroupKey::TierAndUnit(row.tier, row.unit.truncate(level)),
        };
        let mut sums: BTreeMap<GroupKey, Totals> = BTreeMap::new();
        for &row in &rows {
            sums.entry(key_of(row)).or_default().add(row);
        }

        let keys = match group_by {
            GroupBy::Tier => RiskTier::DESCENDING.map(GroupKey::Tier).to_vec(),
            GroupBy::Unit(level) => self.units(level, rows.iter().map(|r| &r.unit))
                .into_iter()
                .map(GroupKey::Unit)
                .collect(),
            GroupBy::TierAndUnit(level) => self.units(level, rows.iter().map(|r| &r.unit))
                .into_iter()
                .flat_map(|unit| RiskTier::DESCENDING.map(|tier| GroupKey::TierAndUnit(tier, unit.clone())))
                .collect(),
        };

        let result = keys.into_iter()
            .map(|key| {
                let totals = sums.get(&key).copied().unwrap_or_default();
                AggregationRow {
                    percentage: round_to(100.0 * totals.count as f64 / total as f64, self.precision),
                    count: totals.count,
                    hectares: totals.hectares,
                    insured_amount: totals.insured_amount,
                    key,
                }
            })
            .collect::<Vec<_>>();

        log::info!("[aggregate] {group_by:?}: {} groups over {total} customers", result.len());
        Ok(result)
    }

    /// Per-unit damage: all classified customers of the unit versus those at
    /// High/Critical tier, with the affected share rounded to one decimal.
    pub fn damage_by_unit(&self, table: &ClassificationTable, level: AdminLevel) -> Result<Vec<DamageRow>> {
        if table.is_empty() {
            return Err(Error::EmptyRegistry("no classified customers".into()));
        }

        let mut totals: BTreeMap<AdminUnit, (usize, Totals)> = BTreeMap::new();
        for row in table.rows() {
            let entry = totals.entry(row.unit.truncate(level)).or_default();
            entry.0 += 1;
            if row.tier.is_high() { entry.1.add(row) }
        }

        Ok(self.units(level, table.rows().iter().map(|r| &r.unit)).into_iter()
            .map(|unit| {
                let (total, affected) = totals.get(&unit).copied().unwrap_or_default();
                DamageRow {
                    pct_damage: if total == 0 { 0.0 } else { round_to(100.0 * affected.count as f64 / total as f64, 1) },
                    total,
                    affected: affected.count,
                    affected_hectares: affected.hectares,
                    affected_amount: affected.insured_amount,
                    unit,
                }
            })
            .collect())
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

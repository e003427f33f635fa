use std::{collections::BTreeMap, path::{Path, PathBuf}};

use serde::Serialize;

use crate::{
    aggregate::{write_aggregation_csv, write_damage_csv, write_units_csv, AggregationRow, Aggregator, DamageRow, GroupBy},
    classify::{affected_by_level, ClassificationTable, Classifier},
    common::ensure_dir_exists,
    config::Config,
    jobs::{CancelToken, JobRegistry, Progress, ProgressSink},
    layer::{AdminLevel, AdminUnit, BoundarySet},
    registry::CustomerRegistry,
    risk::{CriticalDay, CriticalDaySelector},
    Error, ErrorKind, Result,
};

/// Everything one advisory run consumes.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub advisory: u32,
    /// Hazard layer file per forecast day.
    pub days: BTreeMap<u8, PathBuf>,
    pub registry: CustomerRegistry,
    pub boundaries: BoundarySet,
}

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub advisory: u32,
    pub critical: CriticalDay,
    pub classification: ClassificationTable,
    pub by_tier: Vec<AggregationRow>,
    /// Unit aggregation for every boundary level supplied (department always).
    pub by_unit: BTreeMap<AdminLevel, Vec<AggregationRow>>,
    pub tier_by_department: Vec<AggregationRow>,
    pub damage_by_department: Vec<DamageRow>,
    /// Boundary units touched by high-severity hazard, per level.
    pub affected: BTreeMap<AdminLevel, Vec<AdminUnit>>,
}

/// Critical-day selection, classification and aggregation for one advisory.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self { Self { config } }

    #[inline] pub fn config(&self) -> &Config { &self.config }

    /// Run every stage, checking `cancel` between stages.
    pub fn run(&self, input: &PipelineInput, progress: ProgressSink, cancel: &CancelToken) -> Result<PipelineOutput> {
        let advisory = input.advisory;
        log::info!("[pipeline] advisory {advisory}: {} forecast days, {} customers",
            input.days.len(), input.registry.len());

        cancel.check(advisory)?;
        let critical = CriticalDaySelector::new(&self.config)
            .with_progress(progress)
            .select(&input.days)?;

        cancel.check(advisory)?;
        let classification = Classifier::new(&self.config)
            .classify(&input.registry, &critical.layer, &input.boundaries)?;
        progress(&Progress::Classified { customers: classification.len(), located: classification.located() });

        cancel.check(advisory)?;
        let affected = affected_by_level(&critical.layer, &input.boundaries)?;
        let aggregator = affected.iter().fold(Aggregator::new(&self.config), |aggregator, (&level, units)| {
            aggregator.with_reference_units(level, units.iter().cloned())
        });

        let by_tier = aggregator.aggregate(&classification, GroupBy::Tier)?;
        let mut by_unit = BTreeMap::new();
        for level in AdminLevel::order() {
            if level == AdminLevel::Department || input.boundaries.get(level).is_some() {
                by_unit.insert(level, aggregator.aggregate(&classification, GroupBy::Unit(level))?);
            }
        }
        let tier_by_department = aggregator.aggregate(&classification, GroupBy::TierAndUnit(AdminLevel::Department))?;
        let damage_by_department = aggregator.damage_by_unit(&classification, AdminLevel::Department)?;

        let groups = by_tier.len() + by_unit.values().map(Vec::len).sum::<usize>() + tier_by_department.len();
        progress(&Progress::Aggregated { groups });
        log::info!("[pipeline] advisory {advisory}: critical day {} ({:.3} km²), {} customers classified",
            critical.day, critical.area_km2, classification.len());

        Ok(PipelineOutput {
            advisory,
            critical,
            classification,
            by_tier,
            by_unit,
            tier_by_department,
            damage_by_department,
            affected,
        })
    }

    /// Register the advisory in `jobs` for the duration of the run, so it can
    /// be cancelled and is not run twice at once.
    pub fn run_job(&self, jobs: &JobRegistry, input: &PipelineInput, progress: ProgressSink) -> Result<PipelineOutput> {
        let guard = jobs.start(input.advisory)?;
        self.run(input, progress, guard.token())
    }
}

impl PipelineOutput {
    /// Write every table into `dir`; returns the files written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        ensure_dir_exists(dir)?;
        let mut written = Vec::new();
        let mut file = |name: String| {
            let path = dir.join(name);
            written.push(path.clone());
            path
        };

        self.classification.write_csv(&file("classification.csv".into()))?;
        write_aggregation_csv(&self.by_tier, &file("by_tier.csv".into()))?;
        for (level, rows) in &self.by_unit {
            write_aggregation_csv(rows, &file(format!("by_{level}.csv")))?;
        }
        write_aggregation_csv(&self.tier_by_department, &file("tier_by_department.csv".into()))?;
        write_damage_csv(&self.damage_by_department, &file("damage_by_department.csv".into()))?;
        for (level, units) in &self.affected {
            write_units_csv(units, &file(format!("affected_{level}.csv")))?;
        }

        let critical = serde_json::to_string_pretty(&self.critical)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        std::fs::write(file("critical_day.json".into()), critical)?;

        log::info!("[pipeline] wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Machine-readable outcome of a run, written as `status.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        advisory: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        critical_day: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        area_km2: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        customers: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        located: Option<usize>,
        outputs: Vec<PathBuf>,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        advisory: Option<u32>,
        kind: ErrorKind,
        message: String,
    },
}

impl RunStatus {
    pub fn failed(advisory: Option<u32>, error: &Error) -> Self {
        RunStatus::Failed { advisory, kind: error.kind(), message: error.to_string() }
    }

    pub fn from_output(output: &PipelineOutput, outputs: Vec<PathBuf>) -> Self {
        RunStatus::Ok {
            advisory: Some(output.advisory),
            critical_day: Some(output.critical.day),
            area_km2: Some(output.critical.area_km2),
            customers: Some(output.classification.len()),
            located: Some(output.classification.located()),
            outputs,
        }
    }

    #[inline] pub fn is_ok(&self) -> bool { matches!(self, RunStatus::Ok { .. }) }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_status_names_the_error_kind() {
        let status = RunStatus::failed(Some(31), &Error::NoData("all 3 forecast days failed".into()));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "no_data_error");
        assert_eq!(json["advisory"], 31);
        assert!(!status.is_ok());
    }

    #[test]
    fn cancelled_run_stops_before_loading() {
        let jobs = JobRegistry::new();
        let guard = jobs.start(5).unwrap();
        jobs.cancel(5);
        let input = PipelineInput {
            advisory: 5,
            days: BTreeMap::from([(1, PathBuf::from("/nonexistent.shp"))]),
            registry: CustomerRegistry::default(),
            boundaries: BoundarySet::default(),
        };
        let err = Pipeline::default().run(&input, &|_| {}, guard.token()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn concurrent_run_of_same_advisory_is_rejected() {
        let jobs = JobRegistry::new();
        let _running = jobs.start(8).unwrap();
        let input = PipelineInput {
            advisory: 8,
            days: BTreeMap::new(),
            registry: CustomerRegistry::default(),
            boundaries: BoundarySet::default(),
        };
        let err = Pipeline::default().run_job(&jobs, &input, &|_| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyRunning);
    }
}

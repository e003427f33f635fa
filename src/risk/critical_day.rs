use std::{collections::BTreeMap, path::{Path, PathBuf}};

use serde::Serialize;

use crate::{
    config::Config,
    jobs::{log_progress, Progress, ProgressSink},
    layer::HazardLayer,
    Error, ErrorKind, Result,
};
use super::area::AreaEstimator;

/// High-severity area measured for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayArea {
    pub day: u8,
    pub area_km2: f64,
}

/// A day that could not be measured, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDay {
    pub day: u8,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of critical-day selection.
#[derive(Debug, Clone, Serialize)]
pub struct CriticalDay {
    pub day: u8,
    pub source: Option<PathBuf>,
    pub area_km2: f64,
    /// Every successfully measured day, ascending.
    pub areas: Vec<DayArea>,
    pub skipped: Vec<SkippedDay>,
    /// The selected day's layer, already loaded.
    #[serde(skip)]
    pub layer: HazardLayer,
}

/// Picks the day whose High/Critical area is largest.
pub struct CriticalDaySelector<'a> {
    config: &'a Config,
    estimator: AreaEstimator,
    progress: ProgressSink<'a>,
}

impl<'a> CriticalDaySelector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, estimator: AreaEstimator::from_config(config), progress: &log_progress }
    }

    pub fn with_progress(mut self, progress: ProgressSink<'a>) -> Self {
        self.progress = progress;
        self
    }

    /// Load and measure each day's layer. Days that fail to load or measure
    /// are skipped with a warning; ties go to the earliest day.
    pub fn select(&self, days: &BTreeMap<u8, PathBuf>) -> Result<CriticalDay> {
        let mut tally = Tally::default();
        for (&day, path) in days {
            (self.progress)(&Progress::LoadingDay { day });
            let measured = HazardLayer::load(day, path, self.config)
                .and_then(|layer| self.measure(layer));
            self.record(&mut tally, day, measured, Some(path));
        }
        self.finish(tally, days.len())
    }

    /// Same as [`select`](Self::select) for layers already in memory.
    pub fn select_layers(&self, layers: impl IntoIterator<Item = HazardLayer>) -> Result<CriticalDay> {
        let mut layers = layers.into_iter().collect::<Vec<_>>();
        layers.sort_by_key(HazardLayer::day);

        let count = layers.len();
        let mut tally = Tally::default();
        for layer in layers {
            let day = layer.day();
            let measured = self.measure(layer);
            self.record(&mut tally, day, measured, None);
        }
        self.finish(tally, count)
    }

    fn measure(&self, layer: HazardLayer) -> Result<(HazardLayer, f64)> {
        let area = self.estimator.high_severity_area(&layer)?;
        Ok((layer, area))
    }

    fn record(&self, tally: &mut Tally, day: u8, measured: Result<(HazardLayer, f64)>, path: Option<&Path>) {
        match measured {
            Ok((layer, area_km2)) => {
                log::info!("[critical_day] day {day}: {area_km2:.3} km² high-severity");
                (self.progress)(&Progress::DayArea { day, area_km2 });
                tally.areas.push(DayArea { day, area_km2 });
                let better = tally.best.as_ref().is_none_or(|(best, kept)| {
                    area_km2 > *best || (area_km2 == *best && day < kept.day())
                });
                if better { tally.best = Some((area_km2, layer)) }
            }
            Err(e) => {
                let location = path.map_or(String::new(), |p| format!(" ({})", p.display()));
                log::warn!("[critical_day] skipping day {day}{location}: {e}");
                (self.progress)(&Progress::DaySkipped { day, kind: e.kind(), message: e.to_string() });
                tally.skipped.push(SkippedDay { day, kind: e.kind(), message: e.to_string() });
            }
        }
    }

    fn finish(&self, tally: Tally, requested: usize) -> Result<CriticalDay> {
        let Tally { areas, skipped, best } = tally;
        let Some((area_km2, layer)) = best else {
            return Err(Error::NoData(if requested == 0 {
                "no forecast days given".to_string()
            } else {
                format!("all {requested} forecast days failed: {}", skipped.iter()
                    .map(|s| format!("day {}: {}", s.day, s.message))
                    .collect::<Vec<_>>()
                    .join("; "))
            }));
        };

        let day = layer.day();
        log::info!("[critical_day] selected day {day} ({area_km2:.3} km²)");
        (self.progress)(&Progress::CriticalDay { day, area_km2 });
        Ok(CriticalDay { day, source: layer.source().map(Path::to_path_buf), area_km2, areas, skipped, layer })
    }
}

#[derive(Default)]
struct Tally {
    areas: Vec<DayArea>,
    skipped: Vec<SkippedDay>,
    best: Option<(f64, HazardLayer)>,
}

/// Select the critical day from per-day layer files.
pub fn select_critical_day(days: &BTreeMap<u8, PathBuf>, config: &Config) -> Result<CriticalDay> {
    CriticalDaySelector::new(config).select(days)
}

/// Select the critical day from layers already loaded.
pub fn select_from_layers(layers: impl IntoIterator<Item = HazardLayer>, config: &Config) -> Result<CriticalDay> {
    CriticalDaySelector::new(config).select_layers(layers)
}

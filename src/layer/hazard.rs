use std::path::{Path, PathBuf};

use geo::MultiPolygon;

use crate::{config::Config, geom::{Crs, Transformer}, Error, Result};
use super::{polygon_set::PolygonSet, severity::Severity};

/// One hazard polygon with its canonical severity.
#[derive(Debug, Clone)]
pub struct HazardPolygon {
    pub geometry: MultiPolygon<f64>,
    pub severity: Severity,
    pub day: u8, // forecast day of the owning layer
}

impl HazardPolygon {
    /// Polygon not yet attached to a layer; the layer sets its day.
    pub fn new(geometry: MultiPolygon<f64>, severity: Severity) -> Self {
        Self { geometry, severity, day: 0 }
    }
}

/// The hazard polygons of one forecast day.
#[derive(Debug, Clone)]
pub struct HazardLayer {
    day: u8,
    polygons: Vec<HazardPolygon>,
    crs: Option<Crs>,
    source: Option<PathBuf>,
    dropped: usize, // polygons whose severity was not recognized
}

impl HazardLayer {
    pub fn new(day: u8, mut polygons: Vec<HazardPolygon>, crs: Option<Crs>) -> Self {
        polygons.iter_mut().for_each(|p| p.day = day);
        Self { day, polygons, crs, source: None, dropped: 0 }
    }

    /// Read a day's layer from disk and normalize its severities.
    pub fn load(day: u8, path: &Path, config: &Config) -> Result<Self> {
        let set = PolygonSet::load(path)?;
        let set = match config.assume_hazard_epsg {
            Some(code) => set.assume_crs(Crs::epsg(code)),
            None => set,
        };
        Self::from_polygon_set(day, set, &config.severity_fields)
    }

    /// Build from raw polygons, reading severity from the first matching field.
    /// Polygons whose severity cannot be recognized are dropped with a warning.
    pub fn from_polygon_set(day: u8, set: PolygonSet, severity_fields: &[String]) -> Result<Self> {
        let described = set.describe();
        let field = match set.field_name(severity_fields) {
            Some(field) => field,
            None if set.is_empty() => String::new(),
            None => return Err(Error::load(
                set.source().map_or_else(PathBuf::new, Path::to_path_buf),
                format!("no severity field among {severity_fields:?}"),
            )),
        };

        let (shapes, attributes, crs, source) = set.into_parts();
        let mut dropped = 0;
        let polygons = shapes.into_iter().zip(attributes)
            .filter_map(|(geometry, attrs)| {
                let severity = attrs.get(&field).and_then(Severity::normalize);
                if severity.is_none() {
                    log::warn!("[hazard] day {day}: unrecognized severity {:?} in {described}", attrs.get(&field));
                    dropped += 1;
                }
                severity.map(|severity| HazardPolygon { geometry, severity, day })
            })
            .collect::<Vec<_>>();

        log::info!("[hazard] day {day}: {} polygons ({dropped} dropped) from {described}", polygons.len());
        Ok(Self { day, polygons, crs, source, dropped })
    }

    #[inline] pub fn day(&self) -> u8 { self.day }

    #[inline] pub fn polygons(&self) -> &[HazardPolygon] { &self.polygons }

    #[inline] pub fn crs(&self) -> Option<Crs> { self.crs }

    #[inline] pub fn source(&self) -> Option<&Path> { self.source.as_deref() }

    #[inline] pub fn dropped(&self) -> usize { self.dropped }

    /// Polygons in the High/Critical set, with their index in the layer.
    pub fn high_severity(&self) -> impl Iterator<Item = (usize, &HazardPolygon)> {
        self.polygons.iter().enumerate().filter(|(_, p)| p.severity.is_high())
    }

    /// The layer's CRS, or a projection error naming the layer.
    pub(crate) fn require_crs(&self) -> Result<Crs> {
        self.crs.ok_or_else(|| Error::Projection(format!(
            "hazard layer for day {} ({}) has no declared CRS",
            self.day, self.source.as_ref().map_or("in-memory".to_string(), |p| p.display().to_string()),
        )))
    }

    /// Copy of this layer with every polygon transformed into `target`.
    pub fn reproject(&self, target: Crs) -> Result<Self> {
        let transformer = Transformer::new(self.require_crs()?, target)?;
        let polygons = self.polygons.iter()
            .map(|p| Ok(HazardPolygon { geometry: transformer.multipolygon(&p.geometry)?, severity: p.severity, day: p.day }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { day: self.day, polygons, crs: Some(target), source: self.source.clone(), dropped: self.dropped })
    }
}

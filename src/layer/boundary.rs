use std::{fmt, path::{Path, PathBuf}};

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::{common::normalize_name, config::{BoundaryFields, Config}, geom::Crs, Error, Result};
use super::{attributes::Attributes, polygon_set::PolygonSet};

/// Administrative hierarchy, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Department, // Highest-level unit
    Province,   // Province -> Department
    District,   // District -> Province
}

impl AdminLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            AdminLevel::Department => "department",
            AdminLevel::Province => "province",
            AdminLevel::District => "district",
        }
    }

    pub fn order() -> [AdminLevel; 3] {
        [AdminLevel::Department, AdminLevel::Province, AdminLevel::District]
    }

    fn fields<'a>(&self, fields: &'a BoundaryFields) -> &'a [String] {
        match self {
            AdminLevel::Department => &fields.department,
            AdminLevel::Province => &fields.province,
            AdminLevel::District => &fields.district,
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

/// Normalized department / province / district names; any level may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdminUnit {
    pub department: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
}

impl AdminUnit {
    /// Build from raw names; blanks become unknown and the rest are normalized.
    pub fn new(department: Option<&str>, province: Option<&str>, district: Option<&str>) -> Self {
        let clean = |name: Option<&str>| name.map(normalize_name).filter(|n| !n.is_empty());
        Self { department: clean(department), province: clean(province), district: clean(district) }
    }

    pub fn get(&self, level: AdminLevel) -> Option<&str> {
        match level {
            AdminLevel::Department => self.department.as_deref(),
            AdminLevel::Province => self.province.as_deref(),
            AdminLevel::District => self.district.as_deref(),
        }
    }

    #[inline] pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.province.is_none() && self.district.is_none()
    }

    /// Keep only the levels down to and including `level`.
    pub fn truncate(&self, level: AdminLevel) -> Self {
        Self {
            department: self.department.clone(),
            province: (level >= AdminLevel::Province).then(|| self.province.clone()).flatten(),
            district: (level >= AdminLevel::District).then(|| self.district.clone()).flatten(),
        }
    }

    /// Field by field, names from `self` take precedence over `fallback`.
    pub fn or(self, fallback: &AdminUnit) -> Self {
        Self {
            department: self.department.or_else(|| fallback.department.clone()),
            province: self.province.or_else(|| fallback.province.clone()),
            district: self.district.or_else(|| fallback.district.clone()),
        }
    }

    /// Slash-separated label of the known levels, e.g. "CUSCO/LA CONVENCION".
    pub fn label(&self) -> String {
        [&self.department, &self.province, &self.district].into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// One boundary polygon with the unit it names.
#[derive(Debug, Clone)]
pub struct AdministrativeBoundary {
    pub geometry: MultiPolygon<f64>,
    pub unit: AdminUnit,
}

/// All boundaries of one administrative level.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    level: AdminLevel,
    boundaries: Vec<AdministrativeBoundary>,
    crs: Option<Crs>,
    source: Option<PathBuf>,
}

impl BoundaryLayer {
    pub fn new(level: AdminLevel, boundaries: Vec<AdministrativeBoundary>, crs: Option<Crs>) -> Self {
        Self { level, boundaries, crs, source: None }
    }

    pub fn load(level: AdminLevel, path: &Path, config: &Config) -> Result<Self> {
        Self::from_polygon_set(level, PolygonSet::load(path)?, &config.boundary_fields)
    }

    /// Build from raw polygons. The level's own name field is required;
    /// names of coarser levels are picked up when present.
    pub fn from_polygon_set(level: AdminLevel, set: PolygonSet, fields: &BoundaryFields) -> Result<Self> {
        let own = set.field_name(level.fields(fields));
        if own.is_none() && !set.is_empty() {
            return Err(Error::load(
                set.source().map_or_else(PathBuf::new, Path::to_path_buf),
                format!("no {level} name field among {:?}", level.fields(fields)),
            ));
        }

        let columns = AdminLevel::order().map(|l| (l <= level).then(|| set.field_name(l.fields(fields))).flatten());
        let name = |attrs: &Attributes, column: &Option<String>| column.as_ref()
            .and_then(|c| attrs.get(c))
            .and_then(|v| v.as_text());

        let described = set.describe();
        let (shapes, attributes, crs, source) = set.into_parts();
        let boundaries = shapes.into_iter().zip(attributes)
            .map(|(geometry, attrs)| {
                let [dep, prov, dist] = columns.each_ref().map(|c| name(&attrs, c));
                AdministrativeBoundary {
                    geometry,
                    unit: AdminUnit::new(dep.as_deref(), prov.as_deref(), dist.as_deref()),
                }
            })
            .collect::<Vec<_>>();

        log::info!("[boundary] {} {level} units from {described}", boundaries.len());
        Ok(Self { level, boundaries, crs, source })
    }

    #[inline] pub fn level(&self) -> AdminLevel { self.level }

    #[inline] pub fn boundaries(&self) -> &[AdministrativeBoundary] { &self.boundaries }

    #[inline] pub fn crs(&self) -> Option<Crs> { self.crs }

    #[inline] pub fn source(&self) -> Option<&Path> { self.source.as_deref() }

    pub(crate) fn require_crs(&self) -> Result<Crs> {
        self.crs.ok_or_else(|| Error::Projection(format!(
            "{} boundary layer ({}) has no declared CRS",
            self.level, self.source.as_ref().map_or("in-memory".to_string(), |p| p.display().to_string()),
        )))
    }
}

/// Boundary layers available for the administrative join; any may be absent.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    pub department: Option<BoundaryLayer>,
    pub province: Option<BoundaryLayer>,
    pub district: Option<BoundaryLayer>,
}

impl BoundarySet {
    /// Load whichever level files are given.
    pub fn load(
        department: Option<&Path>,
        province: Option<&Path>,
        district: Option<&Path>,
        config: &Config,
    ) -> Result<Self> {
        let load = |level, path: Option<&Path>| path.map(|p| BoundaryLayer::load(level, p, config)).transpose();
        Ok(Self {
            department: load(AdminLevel::Department, department)?,
            province: load(AdminLevel::Province, province)?,
            district: load(AdminLevel::District, district)?,
        })
    }

    pub fn get(&self, level: AdminLevel) -> Option<&BoundaryLayer> {
        match level {
            AdminLevel::Department => self.department.as_ref(),
            AdminLevel::Province => self.province.as_ref(),
            AdminLevel::District => self.district.as_ref(),
        }
    }

    /// Present layers, coarsest first.
    pub fn layers(&self) -> impl Iterator<Item = &BoundaryLayer> {
        AdminLevel::order().into_iter().filter_map(|level| self.get(level))
    }

    #[inline] pub fn is_empty(&self) -> bool { self.layers().next().is_none() }
}

use std::path::{Path, PathBuf};

use geo::MultiPolygon;

use crate::{
    common::{extract_zip, find_shapefile, read_shapefile, require_file_exists, shape_to_multipolygon},
    geom::{Crs, Transformer},
    Error, Result,
};
use super::attributes::{find_column, AttrValue, Attributes};

/// Polygons plus their attribute rows and declared CRS, as read from one vector source.
#[derive(Debug, Clone, Default)]
pub struct PolygonSet {
    shapes: Vec<MultiPolygon<f64>>,
    attributes: Vec<Attributes>,
    crs: Option<Crs>,
    source: Option<PathBuf>,
}

impl PolygonSet {
    pub fn new(shapes: Vec<MultiPolygon<f64>>, attributes: Vec<Attributes>, crs: Option<Crs>) -> Self {
        assert_eq!(shapes.len(), attributes.len(), "each shape needs one attribute row");
        Self { shapes, attributes, crs, source: None }
    }

    /// Load a `.shp` file (with `.dbf`/`.prj` sidecars) or a `.zip` archive containing one.
    pub fn load(path: &Path) -> Result<Self> {
        require_file_exists(path)?;

        let is_zip = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        let mut set = if is_zip {
            let tmp = tempfile::tempdir()?;
            extract_zip(path, tmp.path())?;
            let shp = find_shapefile(tmp.path())?;
            log::debug!("[layer::load] using {} from {}", shp.display(), path.display());
            Self::load_shapefile(&shp)?
        } else {
            Self::load_shapefile(path)?
        };
        set.source = Some(path.to_path_buf());
        Ok(set)
    }

    fn load_shapefile(path: &Path) -> Result<Self> {
        let mut shapes = Vec::new();
        let mut attributes = Vec::new();
        let mut nulls = 0;

        for (shape, record) in read_shapefile(path)? {
            let Some(mp) = shape_to_multipolygon(&shape).map_err(|e| Error::load(path, e))? else {
                nulls += 1;
                continue
            };
            shapes.push(mp);
            attributes.push(record.into_iter()
                .map(|(name, value)| (name, AttrValue::from_field(value)))
                .collect());
        }
        if nulls > 0 {
            log::debug!("[layer::load] skipped {nulls} null shapes in {}", path.display());
        }

        let crs = Crs::from_prj_sidecar(path);
        log::debug!("[layer::load] {} polygons from {} ({})", shapes.len(), path.display(),
            crs.map_or("undeclared CRS".to_string(), |c| c.to_string()));

        Ok(Self { shapes, attributes, crs, source: Some(path.to_path_buf()) })
    }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub fn attributes(&self) -> &[Attributes] { &self.attributes }

    #[inline] pub fn crs(&self) -> Option<Crs> { self.crs }

    #[inline] pub fn source(&self) -> Option<&Path> { self.source.as_deref() }

    /// Fill in a CRS for sources that did not declare one; a declared CRS is kept.
    pub fn assume_crs(mut self, crs: Crs) -> Self {
        if self.crs.is_none() {
            log::warn!("[layer] {} has no usable .prj, assuming {crs}", self.describe());
            self.crs = Some(crs);
        }
        self
    }

    /// Transform every polygon into `target`.
    pub fn reproject(&self, target: Crs) -> Result<Self> {
        let from = self.crs.ok_or_else(|| Error::Projection(format!("{} has no declared CRS", self.describe())))?;
        let transformer = Transformer::new(from, target)?;
        let shapes = self.shapes.iter()
            .map(|shape| transformer.multipolygon(shape))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { shapes, attributes: self.attributes.clone(), crs: Some(target), source: self.source.clone() })
    }

    /// Name of the first attribute column matching one of `candidates`, case-insensitively.
    pub fn field_name(&self, candidates: &[String]) -> Option<String> {
        let row = self.attributes.first()?;
        find_column(row.keys(), candidates).cloned()
    }

    pub(crate) fn into_parts(self) -> (Vec<MultiPolygon<f64>>, Vec<Attributes>, Option<Crs>, Option<PathBuf>) {
        (self.shapes, self.attributes, self.crs, self.source)
    }

    pub(crate) fn describe(&self) -> String {
        self.source.as_ref().map_or("in-memory layer".to_string(), |p| p.display().to_string())
    }
}

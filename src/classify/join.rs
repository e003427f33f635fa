use geo::{Area, MultiPolygon, Point};

use crate::{
    config::JoinMode,
    geom::{Crs, PolygonIndex, Transformer},
    layer::{AdminUnit, BoundaryLayer, HazardLayer, Severity},
    Result,
};

/// Joins points to polygons and returns the best-matching attribute per point.
pub trait PointJoin {
    type Value;

    /// CRS the polygons are expressed in.
    fn crs(&self) -> Crs;

    /// Best match among the polygons strictly containing `point` (given in [`crs`](Self::crs)).
    fn best_match(&self, point: &Point<f64>) -> Option<Self::Value>;

    /// Join `points` given in `from`. Points are transformed once with a single
    /// transformer; a point that fails to transform is left unmatched.
    fn join(&self, points: &[Option<Point<f64>>], from: Crs) -> Result<Vec<Option<Self::Value>>> {
        let transformer = Transformer::new(from, self.crs())?;
        Ok(points.iter()
            .map(|point| {
                let point = (*point)?;
                match transformer.point(point) {
                    Ok(projected) => self.best_match(&projected),
                    Err(e) => {
                        log::warn!("[classify] point ({}, {}) left unmatched: {e}", point.x(), point.y());
                        None
                    }
                }
            })
            .collect())
    }
}

/// Hazard polygons of one day, answering "highest severity containing this point".
pub struct HazardJoin {
    shapes: Vec<MultiPolygon<f64>>,
    severities: Vec<Severity>,
    index: PolygonIndex,
    crs: Crs,
}

impl HazardJoin {
    /// Index the layer's polygons. In exposure mode only High/Critical polygons take part.
    pub fn new(layer: &HazardLayer, mode: JoinMode) -> Result<Self> {
        let crs = layer.require_crs()?;
        let (shapes, severities): (Vec<_>, Vec<_>) = layer.polygons().iter()
            .filter(|p| mode == JoinMode::Tiered || p.severity.is_high())
            .map(|p| (p.geometry.clone(), p.severity))
            .unzip();
        let index = PolygonIndex::new(&shapes);
        Ok(Self { shapes, severities, index, crs })
    }
}

impl PointJoin for HazardJoin {
    type Value = Severity;

    #[inline] fn crs(&self) -> Crs { self.crs }

    fn best_match(&self, point: &Point<f64>) -> Option<Severity> {
        self.index.containing(&self.shapes, point).into_iter()
            .map(|i| self.severities[i])
            .max()
    }
}

/// Boundary polygons of one administrative level.
pub struct BoundaryJoin {
    shapes: Vec<MultiPolygon<f64>>,
    units: Vec<AdminUnit>,
    areas: Vec<f64>,
    index: PolygonIndex,
    crs: Crs,
}

impl BoundaryJoin {
    pub fn new(layer: &BoundaryLayer) -> Result<Self> {
        let crs = layer.require_crs()?;
        let (shapes, units): (Vec<_>, Vec<_>) = layer.boundaries().iter()
            .map(|b| (b.geometry.clone(), b.unit.clone()))
            .unzip();
        let areas = shapes.iter().map(|s| s.unsigned_area()).collect();
        let index = PolygonIndex::new(&shapes);
        Ok(Self { shapes, units, areas, index, crs })
    }
}

impl PointJoin for BoundaryJoin {
    type Value = AdminUnit;

    #[inline] fn crs(&self) -> Crs { self.crs }

    /// Units of one level should not overlap; if they do, the smallest wins.
    fn best_match(&self, point: &Point<f64>) -> Option<AdminUnit> {
        self.index.containing(&self.shapes, point).into_iter()
            .min_by(|&a, &b| self.areas[a].total_cmp(&self.areas[b]).then(a.cmp(&b)))
            .map(|i| self.units[i].clone())
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::layer::{AdminLevel, AdministrativeBoundary, HazardPolygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size),
        ]])
    }

    fn hazard() -> HazardLayer {
        HazardLayer::new(1, vec![
            HazardPolygon::new(square(-73.0, -14.0, 2.0), Severity::Medium),
            HazardPolygon::new(square(-72.5, -13.5, 1.0), Severity::Critical),
            HazardPolygon::new(square(-72.4, -13.4, 0.5), Severity::Low),
        ], Some(Crs::WGS84))
    }

    #[test]
    fn overlapping_polygons_resolve_to_max_severity() {
        let join = HazardJoin::new(&hazard(), JoinMode::Tiered).unwrap();
        let points = [Some(Point::new(-72.2, -13.2)), Some(Point::new(-72.9, -13.9)), Some(Point::new(0.0, 0.0)), None];
        let joined = join.join(&points, Crs::WGS84).unwrap();
        assert_eq!(joined, vec![Some(Severity::Critical), Some(Severity::Medium), None, None]);
    }

    #[test]
    fn exposure_mode_ignores_lower_tiers() {
        let join = HazardJoin::new(&hazard(), JoinMode::Exposure).unwrap();
        assert_eq!(join.best_match(&Point::new(-72.9, -13.9)), None);
        assert_eq!(join.best_match(&Point::new(-72.2, -13.2)), Some(Severity::Critical));
    }

    #[test]
    fn points_are_projected_into_layer_crs() {
        let metric = hazard().reproject(Crs::UTM_18S).unwrap();
        let join = HazardJoin::new(&metric, JoinMode::Tiered).unwrap();
        let joined = join.join(&[Some(Point::new(-72.2, -13.2))], Crs::WGS84).unwrap();
        assert_eq!(joined, vec![Some(Severity::Critical)]);
    }

    #[test]
    fn undeclared_layer_crs_is_projection_error() {
        let layer = HazardLayer::new(1, vec![HazardPolygon::new(square(0.0, 0.0, 1.0), Severity::High)], None);
        assert_eq!(HazardJoin::new(&layer, JoinMode::Tiered).err().unwrap().kind(), crate::ErrorKind::ProjectionError);
    }

    #[test]
    fn boundary_join_returns_unit() {
        let layer = BoundaryLayer::new(AdminLevel::Department, vec![
            AdministrativeBoundary { geometry: square(-74.0, -15.0, 3.0), unit: AdminUnit::new(Some("Cusco"), None, None) },
            AdministrativeBoundary { geometry: square(-71.0, -15.0, 3.0), unit: AdminUnit::new(Some("Puno"), None, None) },
        ], Some(Crs::WGS84));
        let join = BoundaryJoin::new(&layer).unwrap();
        let units = join.join(&[Some(Point::new(-72.0, -13.0)), Some(Point::new(-70.0, -13.0))], Crs::WGS84).unwrap();
        assert_eq!(units[0].as_ref().and_then(|u| u.department.as_deref()), Some("CUSCO"));
        assert_eq!(units[1].as_ref().and_then(|u| u.department.as_deref()), Some("PUNO"));
    }
}

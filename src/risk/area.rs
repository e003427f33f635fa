use geo::Area;

use crate::{config::Config, geom::{check_polygon, Crs, Transformer}, layer::HazardLayer, Result};

/// Measures the High/Critical footprint of a hazard layer in km².
#[derive(Debug, Clone, Copy)]
pub struct AreaEstimator {
    metric: Crs,
}

impl Default for AreaEstimator {
    fn default() -> Self { Self { metric: Crs::UTM_18S } }
}

impl AreaEstimator {
    pub fn new(metric: Crs) -> Self { Self { metric } }

    pub fn from_config(config: &Config) -> Self { Self::new(Crs::epsg(config.metric_epsg)) }

    #[inline] pub fn metric_crs(&self) -> Crs { self.metric }

    /// Sum of planar areas of High/Critical polygons after projecting into the
    /// metric CRS, in km². Overlaps are counted once per polygon. Any invalid
    /// polygon fails the whole layer.
    pub fn high_severity_area(&self, layer: &HazardLayer) -> Result<f64> {
        let mut high = layer.high_severity().peekable();
        if high.peek().is_none() { return Ok(0.0) }

        let transformer = Transformer::new(layer.require_crs()?, self.metric)?;
        let mut total_m2 = 0.0;
        for (index, polygon) in high {
            let projected = transformer.multipolygon(&polygon.geometry)?;
            check_polygon(index, &projected)?;
            total_m2 += projected.unsigned_area();
        }

        Ok(total_m2 / 1e6)
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::layer::{HazardPolygon, Severity};

    fn km_square(x0: f64, y0: f64, side_km: f64, severity: Severity) -> HazardPolygon {
        let (x1, y1) = (x0 + side_km * 1000.0, y0 + side_km * 1000.0);
        HazardPolygon::new(
            MultiPolygon(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]]),
            severity,
        )
    }

    #[test]
    fn only_high_and_critical_count() {
        let layer = HazardLayer::new(1, vec![
            km_square(500_000.0, 8_800_000.0, 2.0, Severity::Critical),
            km_square(510_000.0, 8_800_000.0, 3.0, Severity::High),
            km_square(520_000.0, 8_800_000.0, 10.0, Severity::Medium),
            km_square(540_000.0, 8_800_000.0, 10.0, Severity::Low),
        ], Some(Crs::UTM_18S));
        let area = AreaEstimator::default().high_severity_area(&layer).unwrap();
        assert!((area - 13.0).abs() < 1e-9, "area = {area}");
    }

    #[test]
    fn overlapping_polygons_are_summed() {
        let layer = HazardLayer::new(1, vec![
            km_square(500_000.0, 8_800_000.0, 1.0, Severity::High),
            km_square(500_000.0, 8_800_000.0, 1.0, Severity::Critical),
        ], Some(Crs::UTM_18S));
        let area = AreaEstimator::default().high_severity_area(&layer).unwrap();
        assert!((area - 2.0).abs() < 1e-9);
    }

    #[test]
    fn layer_without_high_polygons_is_zero() {
        let layer = HazardLayer::new(3, vec![km_square(0.0, 0.0, 1.0, Severity::Low)], None);
        assert_eq!(AreaEstimator::default().high_severity_area(&layer).unwrap(), 0.0);
    }

    #[test]
    fn undeclared_crs_is_projection_error() {
        let layer = HazardLayer::new(1, vec![km_square(0.0, 0.0, 1.0, Severity::High)], None);
        let err = AreaEstimator::default().high_severity_area(&layer).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ProjectionError);
    }

    #[test]
    fn self_intersecting_polygon_fails_layer() {
        let bowtie = HazardPolygon::new(
            MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1000.0, y: 1000.0), (x: 1000.0, y: 0.0), (x: 0.0, y: 1000.0)]]),
            Severity::Critical,
        );
        let layer = HazardLayer::new(1, vec![km_square(0.0, 0.0, 1.0, Severity::High), bowtie], Some(Crs::UTM_18S));
        let err = AreaEstimator::default().high_severity_area(&layer).unwrap_err();
        assert!(matches!(err, crate::Error::Geometry { index: 1, .. }));
    }

    #[test]
    fn geographic_layer_is_projected_before_measuring() {
        let deg = HazardPolygon::new(
            MultiPolygon(vec![polygon![(x: -75.05, y: -10.05), (x: -74.95, y: -10.05), (x: -74.95, y: -9.95), (x: -75.05, y: -9.95)]]),
            Severity::High,
        );
        let layer = HazardLayer::new(1, vec![deg], Some(Crs::WGS84));
        // 0.1° x 0.1° at 10°S is about 11.0 km x 11.1 km.
        let area = AreaEstimator::default().high_severity_area(&layer).unwrap();
        assert!(area > 118.0 && area < 126.0, "area = {area}");
    }
}

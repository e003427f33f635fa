use geo::{Coord, MapCoords, MultiPolygon, Point};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{geom::Crs, Error, Result};

/// A reusable transformation between two CRSs, built once per layer.
pub(crate) struct Transformer {
    from_crs: Crs,
    to_crs: Crs,
    // None when source and target are the same CRS.
    projs: Option<(Proj4, Proj4)>,
}

impl Transformer {
    pub(crate) fn new(from_crs: Crs, to_crs: Crs) -> Result<Self> {
        if from_crs == to_crs {
            return Ok(Self { from_crs, to_crs, projs: None });
        }

        let build = |crs: Crs| -> Result<Proj4> {
            let proj_string = crs.proj4()?;
            Proj4::from_proj_string(&proj_string)
                .map_err(|e| Error::Projection(format!("failed to build PROJ.4 for {crs} ({proj_string}): {e:?}")))
        };

        Ok(Self { from_crs, to_crs, projs: Some((build(from_crs)?, build(to_crs)?)) })
    }

    #[inline] pub(crate) fn is_identity(&self) -> bool { self.projs.is_none() }

    /// Transform one coordinate; geographic CRSs take and return degrees.
    pub(crate) fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        if self.from_crs.is_geographic() && (coord.x.abs() > 180.0 || coord.y.abs() > 90.0) {
            return Err(Error::Projection(format!(
                "({}, {}) is not a valid longitude/latitude in {}", coord.x, coord.y, self.from_crs
            )));
        }
        let Some((from, to)) = &self.projs else { return Ok(coord) };

        let mut point = if self.from_crs.is_geographic() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(from, to, &mut point)
            .map_err(|e| Error::Projection(format!(
                "cannot transform ({}, {}) from {} to {}: {e:?}", coord.x, coord.y, self.from_crs, self.to_crs
            )))?;

        let out = if self.to_crs.is_geographic() {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        };
        if !out.x.is_finite() || !out.y.is_finite() {
            return Err(Error::Projection(format!(
                "non-finite result transforming ({}, {}) from {} to {}", coord.x, coord.y, self.from_crs, self.to_crs
            )));
        }
        Ok(out)
    }

    #[inline]
    pub(crate) fn point(&self, point: Point<f64>) -> Result<Point<f64>> {
        self.coord(point.0).map(Point)
    }

    pub(crate) fn multipolygon(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        if self.is_identity() { return Ok(shape.clone()) }
        shape.try_map_coords(|coord| self.coord(coord))
    }
}

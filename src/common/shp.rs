use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::Record, PolygonRing, Reader, Shape};

use crate::{Error, Result};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .map_err(|e| Error::load(path, format!("failed to open shapefile: {e}")))?;

    reader.iter_shapes_and_records()
        .map(|result| result.map_err(|e| Error::load(path, format!("error reading shape+record: {e}"))))
        .collect()
}

/// Convert a polygonal shape into a MultiPolygon; `None` for null shapes.
pub fn shape_to_multipolygon(shape: &Shape) -> std::result::Result<Option<MultiPolygon<f64>>, String> {
    match shape {
        Shape::NullShape => Ok(None),
        Shape::Polygon(p) => Ok(Some(rings_to_geo(p.rings(), |pt| (pt.x, pt.y)))),
        Shape::PolygonM(p) => Ok(Some(rings_to_geo(p.rings(), |pt| (pt.x, pt.y)))),
        Shape::PolygonZ(p) => Ok(Some(rings_to_geo(p.rings(), |pt| (pt.x, pt.y)))),
        other => Err(format!("found non-Polygon shape in layer: {:?}", other.shapetype())),
    }
}

/// Get the signed area of a coord list (negative for clockwise rings).
fn signed_area(pts: &[Coord<f64>]) -> f64 {
    pts.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>() / 2.0
}

/// Group shapefile rings into polygons: each exterior (clockwise) followed by its holes.
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64)) -> MultiPolygon<f64> {
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter()
            .map(|pt| { let (x, y) = xy(pt); Coord { x, y } })
            .collect::<Vec<_>>();
        if coords.first().is_some_and(|first| Some(first) != coords.last()) {
            coords.push(coords[0]);
        }

        if signed_area(&coords) < 0.0 {
            if let Some(ext) = current_exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(LineString(coords));
        } else if current_exterior.is_some() {
            current_holes.push(LineString(coords));
        } else {
            // Counter-clockwise ring with no open exterior: treat as its own exterior.
            polys.push(Polygon::new(LineString(coords), vec![]));
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

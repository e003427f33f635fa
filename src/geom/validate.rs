use geo::{
    algorithm::line_intersection::line_intersection, Area, BoundingRect, Coord, Intersects, Line,
    LineString, MultiPolygon,
};

use crate::{Error, Result};

/// Reject polygons whose planar area would be meaningless: too few vertices,
/// non-finite coordinates, zero area, or a ring that crosses itself.
pub(crate) fn check_polygon(index: usize, shape: &MultiPolygon<f64>) -> Result<()> {
    let fail = |reason: String| Err(Error::Geometry { index, reason });

    if shape.0.is_empty() { return fail("empty multipolygon".into()) }

    for polygon in &shape.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let coords = dedup_ring(ring);
            if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                return fail("non-finite coordinate".into());
            }
            if coords.len() < 4 {
                return fail(format!("ring has {} distinct vertices, need at least 3", coords.len().saturating_sub(1)));
            }
            if let Some((a, b)) = self_intersection(&coords) {
                return fail(format!("ring self-intersects between segments {a} and {b}"));
            }
        }
        if polygon.unsigned_area() <= 0.0 {
            return fail("zero-area polygon".into());
        }
    }
    Ok(())
}

/// Ring coordinates with consecutive duplicates removed (closing coord kept).
fn dedup_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for &c in &ring.0 {
        if coords.last() != Some(&c) { coords.push(c) }
    }
    coords
}

/// First pair of non-adjacent segments that touch or cross, if any.
fn self_intersection(coords: &[Coord<f64>]) -> Option<(usize, usize)> {
    let segments = coords.windows(2)
        .map(|w| Line::new(w[0], w[1]))
        .collect::<Vec<_>>();
    let n = segments.len();
    let boxes = segments.iter().map(|s| s.bounding_rect()).collect::<Vec<_>>();

    for i in 0..n {
        for j in (i + 2)..n {
            // First and last segments share the closing vertex.
            if i == 0 && j == n - 1 { continue }
            if !boxes[i].intersects(&boxes[j]) { continue }
            if line_intersection(segments[i], segments[j]).is_some() {
                return Some((i, j));
            }
        }
    }
    None
}

use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point, Rect};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree, AABB};

/// Envelope of one shape, tagged with its index in the indexed slice.
type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn entry(idx: usize, rect: Rect<f64>) -> Entry {
    GeomWithData::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), idx)
}

/// R-tree over the envelopes of a polygon slice, answering exact
/// containment / intersection queries by polygon index.
#[derive(Debug)]
pub(crate) struct PolygonIndex {
    rtree: RTree<Entry>,
}

impl PolygonIndex {
    /// Index `shapes`; shapes without a bounding box (empty) are never returned.
    pub(crate) fn new(shapes: &[MultiPolygon<f64>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| entry(i, rect)))
                    .collect()
            ),
        }
    }

    /// Indices of shapes strictly containing `point`, in ascending order.
    pub(crate) fn containing(&self, shapes: &[MultiPolygon<f64>], point: &Point<f64>) -> Vec<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        let mut hits = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|hit| hit.data)
            .filter(|&i| shapes[i].contains(point))
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }

    /// Whether any indexed shape intersects `other`.
    pub(crate) fn any_intersecting(&self, shapes: &[MultiPolygon<f64>], other: &MultiPolygon<f64>) -> bool {
        let Some(rect) = other.bounding_rect() else { return false };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .any(|hit| shapes[hit.data].intersects(other))
    }
}

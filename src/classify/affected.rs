use std::collections::BTreeMap;

use crate::{
    geom::{PolygonIndex, Transformer},
    layer::{AdminLevel, AdminUnit, BoundaryLayer, BoundarySet, HazardLayer},
    Result,
};

/// Units of `boundaries` whose polygon intersects a High/Critical polygon of
/// `hazard`, sorted and de-duplicated.
pub fn affected_units(hazard: &HazardLayer, boundaries: &BoundaryLayer) -> Result<Vec<AdminUnit>> {
    let mut high = hazard.high_severity().peekable();
    if high.peek().is_none() { return Ok(Vec::new()) }

    let transformer = Transformer::new(hazard.require_crs()?, boundaries.require_crs()?)?;
    let shapes = high
        .map(|(_, p)| transformer.multipolygon(&p.geometry))
        .collect::<Result<Vec<_>>>()?;
    let index = PolygonIndex::new(&shapes);

    let mut units = boundaries.boundaries().iter()
        .filter(|b| index.any_intersecting(&shapes, &b.geometry))
        .map(|b| b.unit.clone())
        .collect::<Vec<_>>();
    units.sort();
    units.dedup();

    log::info!("[affected] {} {} units touched by high-severity hazard on day {}",
        units.len(), boundaries.level(), hazard.day());
    Ok(units)
}

/// [`affected_units`] for every boundary level present.
pub fn affected_by_level(hazard: &HazardLayer, boundaries: &BoundarySet) -> Result<BTreeMap<AdminLevel, Vec<AdminUnit>>> {
    boundaries.layers()
        .map(|layer| Ok((layer.level(), affected_units(hazard, layer)?)))
        .collect()
}

use geo::Point;

use crate::{
    config::Config,
    geom::{Crs, Transformer},
    layer::{AdminUnit, BoundarySet, HazardLayer, RiskTier},
    registry::{Customer, CustomerRegistry},
    Error, Result,
};
use super::{
    join::{BoundaryJoin, HazardJoin, PointJoin},
    table::{ClassificationRow, ClassificationTable, UnitSource},
};

/// Assigns each active customer a risk tier and an administrative unit.
pub struct Classifier<'a> {
    config: &'a Config,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a Config) -> Self { Self { config } }

    /// Classify every active customer against `hazard`. Customers without a
    /// position are kept as unlocated rows with the registry address.
    pub fn classify(
        &self,
        registry: &CustomerRegistry,
        hazard: &HazardLayer,
        boundaries: &BoundarySet,
    ) -> Result<ClassificationTable> {
        let customers = registry.active().collect::<Vec<&Customer>>();
        let from = Crs::epsg(self.config.customer_epsg);
        let hazard_join = HazardJoin::new(hazard, self.config.mode)?;
        let points = projectable(&customers, from, hazard_join.crs())?;

        let eligible = points.iter().flatten().count();
        if eligible == 0 {
            return Err(Error::EmptyRegistry(format!(
                "{} customers in registry, {} active, none with a position",
                registry.len(), customers.len(),
            )));
        }

        let severities = hazard_join.join(&points, from)?;

        // Coarse levels first, so each level's own layer names that level.
        let mut spatial = vec![None::<AdminUnit>; points.len()];
        for layer in boundaries.layers() {
            let hits = BoundaryJoin::new(layer)?.join(&points, from)?;
            let matched = hits.iter().flatten().count();
            log::debug!("[classify] {} layer matched {matched} of {eligible} customers", layer.level());
            for (slot, hit) in spatial.iter_mut().zip(hits) {
                let Some(hit) = hit else { continue };
                *slot = Some(match slot.take() {
                    Some(found) => found.or(&hit),
                    None => hit,
                });
            }
        }

        let rows = customers.iter().zip(points.iter().zip(severities).zip(spatial))
            .map(|(customer, ((point, severity), spatial))| {
                let registry_unit = customer.registry_unit();
                let (unit, unit_source) = match spatial {
                    Some(found) => (found.or(&registry_unit), UnitSource::Spatial),
                    None if !registry_unit.is_empty() => (registry_unit, UnitSource::Registry),
                    None => (AdminUnit::default(), UnitSource::Unknown),
                };
                ClassificationRow {
                    customer_id: customer.id.clone(),
                    tier: RiskTier::from(severity),
                    located: point.is_some(),
                    unit,
                    unit_source,
                    hectares: customer.hectares,
                    insured_amount: customer.insured_amount,
                }
            })
            .collect::<Vec<_>>();

        let table = ClassificationTable::new(Some(hazard.day()), rows);
        log::info!("[classify] day {}: {} customers classified ({} located); {}",
            hazard.day(), table.len(), table.located(), tier_summary(&table));
        Ok(table)
    }
}

/// Customer positions that can be expressed in `to`; the rest count as unlocated.
fn projectable(customers: &[&Customer], from: Crs, to: Crs) -> Result<Vec<Option<Point<f64>>>> {
    let transformer = Transformer::new(from, to)?;
    Ok(customers.iter()
        .map(|customer| customer.position().filter(|&point| match transformer.point(point) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("[classify] customer {} treated as unlocated: {e}", customer.id);
                false
            }
        }))
        .collect())
}

fn tier_summary(table: &ClassificationTable) -> String {
    RiskTier::DESCENDING.iter()
        .map(|tier| format!("{}={}", tier.to_str(), table.rows().iter().filter(|r| r.tier == *tier).count()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::{
        config::JoinMode,
        layer::{AdminLevel, AdministrativeBoundary, BoundaryLayer, HazardPolygon, Severity},
    };

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size),
        ]])
    }

    fn hazard() -> HazardLayer {
        HazardLayer::new(2, vec![
            HazardPolygon::new(square(-73.0, -14.0, 2.0), Severity::Medium),
            HazardPolygon::new(square(-72.5, -13.5, 1.0), Severity::Critical),
        ], Some(Crs::WGS84))
    }

    fn departments() -> BoundarySet {
        BoundarySet {
            department: Some(BoundaryLayer::new(AdminLevel::Department, vec![
                AdministrativeBoundary { geometry: square(-75.0, -15.0, 4.0), unit: AdminUnit::new(Some("Cusco"), None, None) },
            ], Some(Crs::WGS84))),
            ..Default::default()
        }
    }

    fn registry() -> CustomerRegistry {
        let mut inside = Customer::at("A", -72.0, -13.0);
        inside.province = Some("La Convención".into());
        inside.hectares = Some(3.0);
        let mut unlocated = Customer::at("B", 0.0, 0.0);
        unlocated.latitude = None;
        unlocated.department = Some("puno".into());
        let mut inactive = Customer::at("C", -72.0, -13.0);
        inactive.active = false;
        CustomerRegistry::new(vec![inside, unlocated, inactive, Customer::at("D", -60.0, -5.0)])
    }

    #[test]
    fn critical_customer_gets_spatial_department() {
        let config = Config::default();
        let table = Classifier::new(&config).classify(&registry(), &hazard(), &departments()).unwrap();

        assert_eq!(table.len(), 3, "inactive customers are ignored");
        let a = table.get("A").unwrap();
        assert_eq!(a.tier, RiskTier::Critical);
        assert_eq!(a.unit.department.as_deref(), Some("CUSCO"));
        // Levels missing from the join fall back to the registry.
        assert_eq!(a.unit.province.as_deref(), Some("LA CONVENCION"));
        assert_eq!(a.unit_source, UnitSource::Spatial);

        let b = table.get("B").unwrap();
        assert!(!b.located);
        assert_eq!(b.tier, RiskTier::Unclassified);
        assert_eq!(b.unit_source, UnitSource::Registry);
        assert_eq!(b.unit.department.as_deref(), Some("PUNO"));

        let d = table.get("D").unwrap();
        assert_eq!(d.tier, RiskTier::Unclassified);
        assert_eq!(d.unit_source, UnitSource::Unknown);
    }

    #[test]
    fn exposure_mode_only_flags_high_tiers() {
        let config = Config { mode: JoinMode::Exposure, ..Config::default() };
        let registry = CustomerRegistry::new(vec![Customer::at("M", -72.9, -13.9), Customer::at("C", -72.1, -13.1)]);
        let table = Classifier::new(&config).classify(&registry, &hazard(), &BoundarySet::default()).unwrap();
        assert_eq!(table.get("M").unwrap().tier, RiskTier::Unclassified);
        assert_eq!(table.get("C").unwrap().tier, RiskTier::Critical);
    }

    #[test]
    fn unprojectable_position_is_unlocated() {
        let config = Config::default();
        let mut stray = Customer::at("S", -72.0, 95.0);
        stray.department = Some("Cusco".into());
        let registry = CustomerRegistry::new(vec![Customer::at("A", -72.0, -13.0), stray]);
        let table = Classifier::new(&config).classify(&registry, &hazard(), &departments()).unwrap();

        assert_eq!(table.located(), 1);
        let s = table.get("S").unwrap();
        assert!(!s.located);
        assert_eq!(s.tier, RiskTier::Unclassified);
        assert_eq!(s.unit_source, UnitSource::Registry);
    }

    #[test]
    fn no_positioned_customer_is_empty_registry() {
        let config = Config::default();
        let mut c = Customer::at("A", -72.0, -13.0);
        c.longitude = None;
        let err = Classifier::new(&config)
            .classify(&CustomerRegistry::new(vec![c]), &hazard(), &BoundarySet::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::EmptyRegistryError);
    }
}

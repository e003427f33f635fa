mod common;

use std::{cell::RefCell, collections::BTreeMap, fs, path::Path};

use common::{day_path, write_layer, Square, WGS84_PRJ};
use hazardrisk::{
    AdminLevel, Advisory, BoundarySet, CancelToken, Config, CustomerRegistry, ErrorKind, GroupKey,
    JobRegistry, Pipeline, PipelineInput, Progress, RiskTier, RunStatus, select_critical_day,
};

const CUSCO: Square = (-73.0, -14.0, 1.0);
const PUNO: Square = (-72.0, -14.0, 1.0);

const CUSTOMERS: &str = "\
cliente_id,latitud,longitud,departamento,hectareas,monto_asegurado,estado
C1,-13.7,-72.7,,2.5,1000,activo
C2,-13.7,-71.7,,1.0,500,activo
C3,-13.2,-72.2,,4.0,2000,activo
C4,,,Cusco,3.0,800,activo
C5,-13.7,-72.7,,9.0,9000,inactivo
";

/// Advisory 31 over three days; day 2 carries the largest high-severity area.
fn fixture(root: &Path) -> (Advisory, BoundarySet) {
    write_layer(&day_path(root, 31, 1), "nivel", &[((-72.8, -13.8, 0.1), "Nivel 3")], Some(WGS84_PRJ));
    write_layer(&day_path(root, 31, 2), "nivel", &[
        ((-72.8, -13.8, 0.3), "Nivel 4"),
        ((-71.8, -13.8, 0.3), "Nivel 1"),
    ], Some(WGS84_PRJ));
    write_layer(&day_path(root, 31, 3), "nivel", &[((-72.8, -13.8, 0.5), "Nivel 2")], Some(WGS84_PRJ));

    let departments = root.join("limites/departamentos.shp");
    write_layer(&departments, "DEPARTAMEN", &[(CUSCO, "CUSCO"), (PUNO, "PUNO")], Some(WGS84_PRJ));

    let advisory = Advisory::from_json_str(r#"{"numero_aviso": 31, "duracion_horas": 72, "nivel": "ROJO"}"#).unwrap();
    let boundaries = BoundarySet::load(Some(&departments), None, None, &Config::default()).unwrap();
    (advisory, boundaries)
}

fn input(root: &Path) -> PipelineInput {
    let (advisory, boundaries) = fixture(root);
    PipelineInput {
        advisory: advisory.numero_aviso,
        days: advisory.day_layers(root),
        registry: CustomerRegistry::from_csv_string(CUSTOMERS).unwrap(),
        boundaries,
    }
}

#[test]
fn largest_high_severity_day_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    let (advisory, _) = fixture(dir.path());
    let days = advisory.day_layers(dir.path());
    assert_eq!(days.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);

    let critical = select_critical_day(&days, &Config::default()).unwrap();
    assert_eq!(critical.day, 2);
    assert_eq!(critical.areas.len(), 3);
    assert_eq!(critical.areas[2].area_km2, 0.0);
    // 0.3° square near 13.7°S is roughly 32 km x 33 km.
    assert!(critical.area_km2 > 900.0 && critical.area_km2 < 1300.0, "area = {}", critical.area_km2);
    assert!(critical.areas[0].area_km2 < critical.area_km2);
}

#[test]
fn unreadable_day_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (advisory, _) = fixture(dir.path());
    let broken = day_path(dir.path(), 31, 2);
    fs::write(&broken, b"garbage").unwrap();

    let critical = select_critical_day(&advisory.day_layers(dir.path()), &Config::default()).unwrap();
    assert_eq!(critical.day, 1);
    assert_eq!(critical.skipped.len(), 1);
    assert_eq!(critical.skipped[0].day, 2);
    assert_eq!(critical.skipped[0].kind, ErrorKind::LoadError);
}

#[test]
fn no_usable_day_is_no_data() {
    let err = select_critical_day(&BTreeMap::new(), &Config::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoDataError);
}

#[test]
fn full_run_classifies_and_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let input = input(dir.path());

    let events = RefCell::new(Vec::new());
    let sink = |event: &Progress| events.borrow_mut().push(event.clone());
    let output = Pipeline::default().run(&input, &sink, &CancelToken::default()).unwrap();

    assert_eq!(output.critical.day, 2);
    let table = &output.classification;
    assert_eq!(table.len(), 4);
    assert_eq!(table.located(), 3);
    assert!(table.get("C5").is_none());

    let c1 = table.get("C1").unwrap();
    assert_eq!(c1.tier, RiskTier::Critical);
    assert_eq!(c1.unit.department.as_deref(), Some("CUSCO"));
    assert_eq!(table.get("C2").unwrap().tier, RiskTier::Low);
    assert_eq!(table.get("C2").unwrap().unit.department.as_deref(), Some("PUNO"));
    assert_eq!(table.get("C3").unwrap().tier, RiskTier::Unclassified);
    let c4 = table.get("C4").unwrap();
    assert!(!c4.located);
    assert_eq!(c4.tier, RiskTier::Unclassified);
    assert_eq!(c4.unit.department.as_deref(), Some("CUSCO"));

    let tiers = output.by_tier.iter().map(|r| (r.key.tier().unwrap(), r.count)).collect::<Vec<_>>();
    assert_eq!(tiers, [
        (RiskTier::Critical, 1), (RiskTier::High, 0), (RiskTier::Medium, 0),
        (RiskTier::Low, 1), (RiskTier::Unclassified, 1),
    ]);
    let total: f64 = output.by_tier.iter().map(|r| r.percentage).sum();
    assert!((total - 100.0).abs() < 0.05);

    let departments = &output.by_unit[&AdminLevel::Department];
    let names = departments.iter().map(|r| r.key.label()).collect::<Vec<_>>();
    assert_eq!(names, ["CUSCO", "PUNO"]);
    assert_eq!(departments[0].count, 2);
    assert_eq!(departments[0].hectares, 6.5);

    assert!(output.tier_by_department.iter().any(|r| matches!(&r.key,
        GroupKey::TierAndUnit(RiskTier::Critical, unit) if unit.department.as_deref() == Some("CUSCO")) && r.count == 1));

    let cusco = output.damage_by_department.iter()
        .find(|r| r.unit.department.as_deref() == Some("CUSCO"))
        .unwrap();
    assert_eq!((cusco.total, cusco.affected), (3, 1));

    let affected = &output.affected[&AdminLevel::Department];
    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0].department.as_deref(), Some("CUSCO"));

    let events = events.into_inner();
    assert!(events.contains(&Progress::CriticalDay { day: 2, area_km2: output.critical.area_km2 }));
    assert!(events.contains(&Progress::Classified { customers: 4, located: 3 }));
}

#[test]
fn outputs_and_status_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = input(dir.path());
    let output = Pipeline::default().run(&input, &|_| {}, &CancelToken::default()).unwrap();

    let out = dir.path().join("salida/aviso_31");
    let written = output.write_to(&out).unwrap();
    for name in ["classification.csv", "by_tier.csv", "by_department.csv", "tier_by_department.csv",
                 "damage_by_department.csv", "affected_department.csv", "critical_day.json"] {
        assert!(written.contains(&out.join(name)), "missing {name}");
        assert!(out.join(name).is_file());
    }

    let classification = fs::read_to_string(out.join("classification.csv")).unwrap();
    assert!(classification.starts_with("customer_id,tier,tier_label,located,department"));
    assert_eq!(classification.lines().count(), 5);

    let critical: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("critical_day.json")).unwrap()).unwrap();
    assert_eq!(critical["day"], 2);

    let status = RunStatus::from_output(&output, written);
    assert!(status.is_ok());
    status.write_json(&out.join("status.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("status.json")).unwrap()).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["critical_day"], 2);
    assert_eq!(json["located"], 3);
}

#[test]
fn cancelled_run_stops_before_work() {
    let dir = tempfile::tempdir().unwrap();
    let input = input(dir.path());
    let cancel = CancelToken::default();
    cancel.cancel();

    let err = Pipeline::default().run(&input, &|_| {}, &cancel).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn job_registry_releases_advisory_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = input(dir.path());
    let jobs = JobRegistry::new();

    let output = Pipeline::default().run_job(&jobs, &input, &|_| {}).unwrap();
    assert_eq!(output.advisory, 31);
    assert!(!jobs.is_running(31));
}

#[test]
fn registry_without_positions_is_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let mut input = input(dir.path());
    input.registry = CustomerRegistry::from_csv_string("cliente_id,departamento\nX1,Cusco\n").unwrap();

    let err = Pipeline::default().run(&input, &|_| {}, &CancelToken::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyRegistryError);
}

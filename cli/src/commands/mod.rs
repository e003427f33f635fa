use std::path::Path;

use anyhow::{bail, Context, Result};
use hazardrisk::{BoundarySet, Config, RunStatus};

use crate::cli::{BoundaryArgs, Cli};

pub mod classify;
pub mod critical_day;
pub mod pipeline;

/// Settings from `--config`, or the defaults.
pub(crate) fn load_config(cli: &Cli) -> hazardrisk::Result<Config> {
    match &cli.config {
        Some(path) => Config::from_toml_file(path),
        None => Ok(Config::default()),
    }
}

pub(crate) fn load_boundaries(args: &BoundaryArgs, config: &Config) -> hazardrisk::Result<BoundarySet> {
    BoundarySet::load(args.departments.as_deref(), args.provinces.as_deref(), args.districts.as_deref(), config)
}

/// Write `status.json` into `output` and turn a failed run into an error exit.
pub(crate) fn report(output: &Path, advisory: Option<u32>, result: hazardrisk::Result<RunStatus>) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("[status] failed to create {}", output.display()))?;

    let status = result.unwrap_or_else(|e| RunStatus::failed(advisory, &e));
    let path = output.join("status.json");
    status.write_json(&path)
        .with_context(|| format!("[status] failed to write {}", path.display()))?;

    match status {
        RunStatus::Ok { .. } => Ok(()),
        RunStatus::Failed { kind, message, .. } => bail!("{kind:?}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::Commands;

    fn status(dir: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(dir.join("status.json")).unwrap()).unwrap()
    }

    #[test]
    fn missing_config_still_writes_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let cli = crate::cli::Cli::parse_from([
            "hazardrisk", "--config", dir.path().join("missing.toml").to_str().unwrap(),
            "critical-day", "--day", "1=dia1/view_aviso.shp", "-o", out.to_str().unwrap(),
        ]);
        let Commands::CriticalDay(args) = &cli.command else { panic!("expected critical-day") };

        assert!(super::critical_day::run(&cli, args).is_err());
        let json = status(&out);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "config_error");
    }

    #[test]
    fn repeated_day_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cli = crate::cli::Cli::parse_from([
            "hazardrisk", "critical-day", "--day", "1=a.shp", "--day", "1=b.shp", "-o", dir.path().to_str().unwrap(),
        ]);
        let Commands::CriticalDay(args) = &cli.command else { panic!("expected critical-day") };

        assert!(super::critical_day::run(&cli, args).is_err());
        assert_eq!(status(dir.path())["kind"], "config_error");
    }

    #[test]
    fn unreadable_advisory_reports_into_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("OUTPUT");
        let cli = crate::cli::Cli::parse_from([
            "hazardrisk", "run", "--advisory", dir.path().join("aviso.json").to_str().unwrap(),
            "--layers", dir.path().to_str().unwrap(), "--customers", "clientes.csv", "-o", out.to_str().unwrap(),
        ]);
        let Commands::Run(args) = &cli.command else { panic!("expected run") };

        assert!(super::pipeline::run(&cli, args).is_err());
        let json = status(&out);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "load_error");
        assert!(json.get("advisory").is_none());
    }
}

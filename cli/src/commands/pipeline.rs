use anyhow::Result;
use hazardrisk::{Advisory, CustomerRegistry, JobRegistry, Pipeline, PipelineInput, Progress, RunStatus};

use super::{load_boundaries, load_config, report};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    // Without an advisory number there is no aviso_{n} folder yet.
    let loaded = load_config(cli)
        .and_then(|config| Advisory::from_json_file(&args.advisory).map(|advisory| (config, advisory)));
    let (config, advisory) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return report(&args.output, None, Err(e)),
    };
    let out_dir = args.output.join(format!("aviso_{}", advisory.numero_aviso));

    println!("[run] advisory {} ({}, {} h, {} days)",
        advisory.numero_aviso, advisory.nivel, advisory.duracion_horas, advisory.day_count());

    let progress = |event: &Progress| {
        if let Ok(json) = serde_json::to_string(event) {
            log::info!("[run] {json}");
        }
    };

    let result = (|| -> hazardrisk::Result<RunStatus> {
        let input = PipelineInput {
            advisory: advisory.numero_aviso,
            days: advisory.day_layers(&args.layers),
            registry: CustomerRegistry::from_csv(&args.customers)?,
            boundaries: load_boundaries(&args.boundaries, &config)?,
        };

        let output = Pipeline::new(config.clone()).run_job(&JobRegistry::new(), &input, &progress)?;
        let written = output.write_to(&out_dir)?;

        println!("[run] critical day {} ({:.3} km²); {} customers classified -> {}",
            output.critical.day, output.critical.area_km2, output.classification.len(), out_dir.display());
        Ok(RunStatus::from_output(&output, written))
    })();

    report(&out_dir, Some(advisory.numero_aviso), result)
}

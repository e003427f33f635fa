use anyhow::Result;
use hazardrisk::{
    aggregate::write_aggregation_csv, AdminLevel, Aggregator, Classifier, CustomerRegistry, GroupBy, HazardLayer, RunStatus,
};

use super::{load_boundaries, load_config, report};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ClassifyArgs) -> Result<()> {
    let out_dir = &args.output;

    let result = (|| -> hazardrisk::Result<RunStatus> {
        let config = load_config(cli)?;
        let hazard = HazardLayer::load(args.day, &args.hazard, &config)?;
        let registry = CustomerRegistry::from_csv(&args.customers)?;
        let boundaries = load_boundaries(&args.boundaries, &config)?;

        log::info!("[classify] classifying {} customers against {}", registry.len(), args.hazard.display());
        let table = Classifier::new(&config).classify(&registry, &hazard, &boundaries)?;

        let aggregator = Aggregator::new(&config);
        std::fs::create_dir_all(out_dir)?;
        let outputs = vec![out_dir.join("classification.csv"), out_dir.join("by_tier.csv"), out_dir.join("by_department.csv")];
        table.write_csv(&outputs[0])?;
        write_aggregation_csv(&aggregator.aggregate(&table, GroupBy::Tier)?, &outputs[1])?;
        write_aggregation_csv(&aggregator.aggregate(&table, GroupBy::Unit(AdminLevel::Department))?, &outputs[2])?;

        println!("[classify] {} customers classified ({} located) -> {}", table.len(), table.located(), out_dir.display());
        Ok(RunStatus::Ok {
            advisory: None,
            critical_day: Some(args.day),
            area_km2: None,
            customers: Some(table.len()),
            located: Some(table.located()),
            outputs,
        })
    })();

    report(out_dir, None, result)
}

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Result;
use hazardrisk::{select_critical_day, Error, RunStatus};

use super::{load_config, report};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::CriticalDayArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());

    let result = (|| -> hazardrisk::Result<RunStatus> {
        let config = load_config(cli)?;

        let mut days = BTreeMap::new();
        for (day, path) in &args.days {
            if days.insert(*day, path.clone()).is_some() {
                return Err(Error::Config(format!("[critical-day] day {day} given more than once")));
            }
        }

        let critical = select_critical_day(&days, &config)?;
        let path = out_dir.join("critical_day.json");
        let json = serde_json::to_string_pretty(&critical)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        std::fs::create_dir_all(&out_dir)?;
        std::fs::write(&path, json)?;

        println!("[critical-day] day {} ({:.3} km² high-severity){}", critical.day, critical.area_km2,
            critical.source.as_ref().map_or(String::new(), |p: &PathBuf| format!(" from {}", p.display())));
        for skipped in &critical.skipped {
            println!("[critical-day] skipped day {}: {}", skipped.day, skipped.message);
        }

        Ok(RunStatus::Ok {
            advisory: None,
            critical_day: Some(critical.day),
            area_km2: Some(critical.area_km2),
            customers: None,
            located: None,
            outputs: vec![path],
        })
    })();

    report(&out_dir, None, result)
}

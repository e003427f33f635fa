use std::path::PathBuf;

/// Weather-hazard advisory risk CLI
#[derive(clap::Parser, Debug)]
#[command(name = "hazardrisk", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pipeline settings (TOML); defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Pick the forecast day with the largest high-severity area
    CriticalDay(CriticalDayArgs),

    /// Classify customers against one hazard layer and aggregate
    Classify(ClassifyArgs),

    /// Full advisory run: critical day, classification, aggregation
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct CriticalDayArgs {
    /// Day layer as DAY=PATH, e.g. 1=TEMP/aviso_12/dia1/view_aviso.shp (repeatable)
    #[arg(long = "day", value_parser = parse_day, required = true)]
    pub days: Vec<(u8, PathBuf)>,

    /// Output directory for critical_day.json and status.json, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct BoundaryArgs {
    /// Department boundary layer (.shp or .zip)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub departments: Option<PathBuf>,

    /// Province boundary layer (.shp or .zip)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub provinces: Option<PathBuf>,

    /// District boundary layer (.shp or .zip)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub districts: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Hazard layer (.shp or .zip)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub hazard: PathBuf,

    /// Forecast day the hazard layer belongs to
    #[arg(long, default_value_t = 1)]
    pub day: u8,

    /// Customer registry CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub customers: PathBuf,

    #[command(flatten)]
    pub boundaries: BoundaryArgs,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Advisory metadata JSON (numero_aviso, duracion_horas, ...)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub advisory: PathBuf,

    /// Root holding aviso_{n}/dia{d}/view_aviso.shp
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub layers: PathBuf,

    /// Customer registry CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub customers: PathBuf,

    #[command(flatten)]
    pub boundaries: BoundaryArgs,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,
}

fn parse_day(value: &str) -> Result<(u8, PathBuf), String> {
    let (day, path) = value.split_once('=')
        .ok_or_else(|| format!("expected DAY=PATH, got {value:?}"))?;
    let day = day.trim().parse::<u8>()
        .map_err(|e| format!("invalid day {day:?}: {e}"))?;
    if path.is_empty() { return Err(format!("missing path for day {day}")) }
    Ok((day, PathBuf::from(path)))
}

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use geo_seed::{InputShape, Pipeline, PipelineOptions, RegistryChoice, SeedConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "geo-seed",
    version,
    about = "Converts ECZ administrative-geography CSV exports into SQL seed scripts"
)]
struct Args {
    /// CSV file: administrative units, constituency list or ward list
    input: PathBuf,

    /// Input shape; `auto` detects it from the header row
    #[arg(long, value_enum, default_value_t = ShapeArg::Auto)]
    shape: ShapeArg,

    /// District code table; defaults to the one matching the shape
    #[arg(long, value_enum)]
    registry: Option<RegistryArg>,

    /// JSON file overriding synthesis defaults, labels, registries and columns
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the run report (counts, unmapped districts, digest) as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also emit provinces and districts
    #[arg(long, default_value = "false")]
    with_districts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShapeArg {
    Auto,
    AdminUnits,
    Constituencies,
    Wards,
}

impl ShapeArg {
    fn forced(self) -> Option<InputShape> {
        match self {
            ShapeArg::Auto => None,
            ShapeArg::AdminUnits => Some(InputShape::AdminUnits),
            ShapeArg::Constituencies => Some(InputShape::Constituencies),
            ShapeArg::Wards => Some(InputShape::Wards),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RegistryArg {
    AdminUnits,
    ConstituencyList,
}

fn main() -> ExitCode {
    // stdout carries the SQL, so all diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SeedConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SeedConfig::default(),
    };

    let options = PipelineOptions {
        shape: args.shape.forced(),
        registry: match args.registry {
            None => RegistryChoice::Auto,
            Some(RegistryArg::AdminUnits) => RegistryChoice::AdminUnits,
            Some(RegistryArg::ConstituencyList) => RegistryChoice::ConstituencyList,
        },
        with_districts: args.with_districts,
    };

    let output = Pipeline::new(config, options).run_file(&args.input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(&output.sql).context("writing SQL to stdout")?;
    out.flush().context("writing SQL to stdout")?;

    output.report.log_summary();

    if let Some(path) = &args.report {
        output
            .report
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}

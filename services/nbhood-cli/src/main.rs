//! Neighbourhood processing command-line tool.
//!
//! Loads a thresholded forecast field from NetCDF, smooths it over a
//! circular neighbourhood and writes the result to a new NetCDF file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nbhood::{BasicNeighbourhoodProcessing, NbhoodConfig};

#[derive(Parser, Debug)]
#[command(name = "nbhood")]
#[command(about = "Apply basic neighbourhood processing to a NetCDF forecast field")]
struct Args {
    /// NetCDF file to smooth
    input: PathBuf,

    /// NetCDF file to write
    output: PathBuf,

    /// Radius in km; repeat or comma-separate to give one per lead time
    #[arg(
        short,
        long = "radius",
        required = true,
        value_delimiter = ',',
        allow_negative_numbers = true,
        env = "NBHOOD_RADIUS"
    )]
    radii: Vec<f64>,

    /// Lead times in hours matching --radius
    #[arg(short, long, value_delimiter = ',', env = "NBHOOD_LEAD_TIMES")]
    lead_times: Option<Vec<f64>>,

    /// Constant kernel weighting instead of radial fall-off
    #[arg(long)]
    unweighted: bool,

    /// Data variable to load (default: auto-detect)
    #[arg(long)]
    variable: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads for kernel application
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Structured JSON log output
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let mut config = match &args.config {
        Some(path) => NbhoodConfig::from_yaml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NbhoodConfig::from_env(),
    };
    if args.unweighted {
        config.unweighted_mode = true;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    info!(config = ?config, "Loaded configuration");

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("building worker pool")?;
    }

    let plugin = BasicNeighbourhoodProcessing::from_config(args.radii, args.lead_times, &config)?;

    let cube = netcdf_parser::load_cube(&args.input, args.variable.as_deref())
        .with_context(|| format!("loading {}", args.input.display()))?;

    let smoothed = plugin.process(&cube)?;

    netcdf_parser::save_cube(&smoothed, &args.output)
        .with_context(|| format!("saving {}", args.output.display()))?;

    info!(output = %args.output.display(), "Neighbourhood processing complete");
    Ok(())
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use bankgeheimnis_core::{PipelineConfig, run_pipeline};

/// Compute bench proximity layers for a region and export them as
/// GeoJSON. Without a config file the built-in Rhein-Ruhr region is used.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TOML config file with the region settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region identifier used in the output file names
    #[arg(long)]
    region_id: Option<String>,

    /// Place name resolved to an administrative boundary; repeat for
    /// multi-place regions. Overrides the configured list.
    #[arg(long = "place")]
    places: Vec<String>,

    /// Directory the GeoJSON files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run_pipeline(&config) {
        Ok(summary) => {
            println!(
                "{}: {} benches -> {}",
                summary.region_id,
                summary.bench_count,
                summary.paths.benches.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Pipeline failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    if let Some(region_id) = &args.region_id {
        config.region_id = region_id.clone();
    }
    if !args.places.is_empty() {
        config.place_names = args.places.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    Ok(config)
}

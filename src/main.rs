//! CLI entry point for the tree census export.
//!
//! With no arguments, converts `data/censo_arboreo.geojson` into the four CSV
//! tables served by the web API. `rebuild` regenerates the derived tables from
//! an existing `censo_arboreo_processed.csv`.

use anyhow::Result;
use censo_export::analyzers::sample::{DEFAULT_SAMPLE_SIZE, DEFAULT_SEED};
use censo_export::output::print_json;
use censo_export::pipeline::{ExportConfig, export, rebuild};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "censo_export")]
#[command(about = "Export the tree census GeoJSON to CSV tables", long_about = None)]
struct Cli {
    /// Directory holding censo_arboreo.geojson and receiving the CSV tables
    #[arg(short = 'd', long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Maximum number of points in heatmap_data.csv
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE, global = true)]
    sample_size: usize,

    /// Seed for the heatmap sample
    #[arg(long, default_value_t = DEFAULT_SEED, global = true)]
    seed: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the census GeoJSON into all four tables (default)
    Export {
        /// Read this GeoJSON file instead of <DATA_DIR>/censo_arboreo.geojson
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Regenerate the aggregate and heatmap tables from censo_arboreo_processed.csv
    Rebuild,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/censo_export.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("censo_export.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = ExportConfig {
        data_dir: cli.data_dir,
        sample_size: cli.sample_size,
        seed: cli.seed,
    };

    let summary = match cli.command.unwrap_or(Commands::Export { input: None }) {
        Commands::Export { input } => export(&config, input.as_deref())?,
        Commands::Rebuild => rebuild(&config)?,
    };

    print_json(&summary)?;
    info!(records = summary.records, "Export finished");

    Ok(())
}

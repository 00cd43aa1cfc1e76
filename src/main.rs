// CampaignLens - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (platform config dir or --config)
// 3. Logging initialisation (debug mode support)
// 4. Dataset load through the compute-once cache
// 5. Report rendering and optional CSV export

use campaignlens::app::cache::DatasetCache;
use campaignlens::app::loader::LoadOptions;
use campaignlens::app::report;
use campaignlens::core::export;
use campaignlens::core::model::CampaignTable;
use campaignlens::platform::config::{self, AppConfig, PlatformPaths, ReportFormat};
use campaignlens::platform::fs;
use campaignlens::util::error::{CampaignLensError, ExportError, Result};
use campaignlens::util::{constants, logging};

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// CampaignLens - Marketing campaign dataset normaliser and analyser.
///
/// Loads a Spanish-locale campaign CSV, normalises numbers, dates and
/// categories, derives duration and profit columns, and prints the
/// analysis report.
#[derive(Parser, Debug)]
#[command(name = "campaignlens", version, about)]
struct Cli {
    /// Campaign CSV to analyse (defaults to the configured dataset, then
    /// limpio_marketingcampaigns.csv in the working directory).
    path: Option<PathBuf>,

    /// Explicit config.toml to use instead of the platform config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Report output format.
    #[arg(short = 'f', long = "format", value_parser = parse_format)]
    format: Option<ReportFormat>,

    /// Write the normalised table as CSV to this file.
    #[arg(short = 'o', long = "export-csv")]
    export_csv: Option<PathBuf>,

    /// Field delimiter of the input CSV (auto-detected if omitted).
    #[arg(long = "delimiter", value_parser = parse_delimiter_arg)]
    delimiter: Option<u8>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_format(s: &str) -> std::result::Result<ReportFormat, String> {
    s.parse()
}

fn parse_delimiter_arg(s: &str) -> std::result::Result<u8, String> {
    config::parse_delimiter(s)
        .ok_or_else(|| format!("invalid delimiter \"{s}\" (expected one ASCII symbol or \"tab\")"))
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "CampaignLens failed");
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

/// Resolve configuration: an explicit --config must load, the platform
/// config file is optional.
fn resolve_config(cli: &Cli) -> Result<(AppConfig, Vec<String>)> {
    match &cli.config {
        Some(path) => Ok(config::load_config_file(path)?),
        None => {
            let paths = PlatformPaths::resolve();
            Ok(config::load_config(&paths))
        }
    }
}

/// Run the tool and return the process exit code.
fn run(cli: Cli) -> Result<i32> {
    let (mut app_config, config_warnings) = resolve_config(&cli)?;

    logging::init(cli.debug, app_config.log_level.as_deref());
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "CampaignLens starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI overrides take precedence over config.toml.
    if let Some(delimiter) = cli.delimiter {
        app_config.delimiter = Some(delimiter);
    }
    let format = cli.format.unwrap_or(app_config.report_format);
    let dataset = cli
        .path
        .clone()
        .or_else(|| app_config.dataset_path.clone())
        .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_DATASET_FILE));

    let cache = DatasetCache::new(dataset, LoadOptions::from_config(&app_config));
    // A load failure is logged by the cache and carried by the report.
    let (table, diagnostics) = cache.table_and_diagnostics();
    let load_failed = !diagnostics.is_empty();

    let source = cache.path().display().to_string();
    let analysis = report::build_report(table, &source, diagnostics);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        ReportFormat::Text => report::render_text(&analysis, &mut out).map_err(stdout_error)?,
        ReportFormat::Json => {
            export::export_json(&analysis, &mut out, Path::new("<stdout>"))?;
            writeln!(out).map_err(stdout_error)?;
        }
    }
    out.flush().map_err(stdout_error)?;

    if let Some(export_path) = &cli.export_csv {
        write_csv_export(table, export_path)?;
    }

    Ok(if load_failed { 1 } else { 0 })
}

fn write_csv_export(table: &CampaignTable, path: &Path) -> Result<usize> {
    let io_err = |e: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    fs::ensure_parent_dir(path).map_err(io_err)?;
    let file = std::fs::File::create(path).map_err(io_err)?;
    Ok(export::export_csv(table, io::BufWriter::new(file), path)?)
}

fn stdout_error(e: io::Error) -> CampaignLensError {
    CampaignLensError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write report",
        source: e,
    }
}

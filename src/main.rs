//! pv-sizing entry point: CLI wiring and config-driven project dimensioning.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pv_sizing::config::ProjectConfig;
use pv_sizing::equipment::Catalog;
use pv_sizing::io::export::{export_monthly_csv, export_results_csv};
use pv_sizing::project::{build_source, dimension_project, load_catalog};

/// Dimension a PV system from a project file or a built-in preset.
#[derive(Parser)]
#[command(name = "pv-sizing", version)]
#[command(about = "Rank module/inverter configurations for a PV project", long_about = None)]
struct Cli {
    /// Load the project from a TOML file
    #[arg(long, conflicts_with = "preset")]
    project: Option<PathBuf>,

    /// Use a built-in preset (residential, commercial, high_latitude)
    #[arg(long)]
    preset: Option<String>,

    /// Directory with modules.csv and inverters.csv; overrides the project's catalog
    #[arg(long)]
    catalog_dir: Option<PathBuf>,

    /// Print only the N best configurations
    #[arg(long)]
    top: Option<usize>,

    /// Export the ranking to CSV
    #[arg(long)]
    results_out: Option<PathBuf>,

    /// Export the best configuration's monthly table to CSV
    #[arg(long)]
    monthly_out: Option<PathBuf>,

    /// Start the REST API server after dimensioning
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // --project takes priority, then --preset, then the residential default
    let mut config = if let Some(ref path) = cli.project {
        ProjectConfig::from_toml_file(path).unwrap_or_else(|e| fail(e))
    } else {
        let name = cli.preset.as_deref().unwrap_or("residential");
        ProjectConfig::from_preset(name).unwrap_or_else(|e| fail(e))
    };
    if let Some(dir) = cli.catalog_dir.clone() {
        config.catalog.dir = Some(dir);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let catalog: Catalog = load_catalog(&config.catalog).unwrap_or_else(|e| fail(e));
    info!(
        modules = catalog.modules().len(),
        inverters = catalog.inverters().len(),
        "catalog ready"
    );
    let source = build_source(&config.irradiance).unwrap_or_else(|e| fail(e));
    let report = dimension_project(&config, &catalog, &source).unwrap_or_else(|e| fail(e));

    if let Some(ref path) = cli.results_out {
        if let Err(e) = export_results_csv(&report.results, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Results written to {}", path.display());
    }
    if let (Some(path), Some(best)) = (cli.monthly_out.as_ref(), report.best()) {
        if let Err(e) = export_monthly_csv(best, report.consumption_kwh.as_ref(), path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Monthly table written to {}", path.display());
    }

    let mut shown = report.clone();
    if let Some(top) = cli.top {
        shown.results.truncate(top.max(1));
    }
    println!("{shown}");

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let remote = pv_sizing::api::RemoteEndpoint::from_config(&config.irradiance);
        let state = Arc::new(pv_sizing::api::AppState {
            catalog,
            report,
            remote,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(pv_sizing::api::serve(state, addr)) {
            fail(format!("server error: {e}"));
        }
    }
}

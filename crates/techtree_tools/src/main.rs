//! TechTree - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use techtree_tools::{CatalogSummary, LoaderConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "techtree-tools")]
#[command(about = "Development tools for TechTree mod data")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets")]
        path: PathBuf,
    },
    /// Print the registered catalogue
    Summary {
        /// Path to data directory
        #[arg(default_value = "assets")]
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Abort on the first failed entry
        #[arg(long)]
        fail_fast: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            match techtree_tools::validate::validate_data_directory(&path) {
                Ok(report) if report.is_clean() => tracing::info!("Validation passed"),
                Ok(report) => {
                    tracing::error!(
                        "Validation failed: {} skipped entries, {} reference problems",
                        report.failures.len(),
                        report.problems.len()
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Summary {
            path,
            json,
            fail_fast,
        } => {
            let config = LoaderConfig::new(path).fail_fast(fail_fast);
            let registries = match techtree_tools::load_data_directory(config) {
                Ok((registries, _)) => registries,
                Err(e) => {
                    tracing::error!("Loading failed: {e}");
                    std::process::exit(1);
                }
            };

            let summary = CatalogSummary::from_registries(&registries);
            if json {
                match summary.to_json() {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!("Serialization failed: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                print!("{summary}");
            }
        }
    }
}

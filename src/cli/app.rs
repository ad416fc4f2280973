//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::show::ShowOptions;
use super::{import, show};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "outline")]
#[command(author, version, about = "Import project plans and browse them as task outlines")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, short = 'c', global = true, env = "OUTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import an MS Project XML document
    Import {
        /// Path to the project document
        file: PathBuf,

        /// Write the imported tasks as a flat JSONL list
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Display a stored JSONL task list as an outline
    Show {
        /// Path to the task list
        file: PathBuf,

        /// Collapse a group (repeatable)
        #[arg(long, value_name = "ID")]
        collapse: Vec<String>,

        /// Recalculate group dates from their children
        #[arg(long)]
        rollup: bool,

        /// Write the list back after rollup and collapsing
        #[arg(long)]
        save: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Installs the stderr log subscriber
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG` is
/// honoured, falling back to warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("outline_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("outline_cli=warn"))
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    debug!("Outline CLI starting");

    let config = Config::load(cli.config.as_deref())?;
    debug!(path = ?cli.config, "Loaded configuration");

    let output = Output::new(cli.format, config.display.clone());

    match cli.command {
        Commands::Import { file, output: target } => {
            import::run(&output, config.import, &file, target.as_deref())?
        }

        Commands::Show {
            file,
            collapse,
            rollup,
            save,
        } => show::run(
            &output,
            &file,
            ShowOptions {
                collapse: &collapse,
                rollup,
                save,
            },
        )?,

        Commands::Config => {
            if output.is_json() {
                output.data(&config);
            } else {
                print!("{}", config.to_toml()?);
            }
        }
    }

    debug!("Command completed successfully");
    Ok(())
}

//! Cinder CLI - compile component schemas into Rust sources

mod commands;

use anyhow::{Context, Result};
use cinder_codegen::CompilerConfig;
use clap::{ArgAction, Parser, Subcommand};
use commands::{check, compile, inspect};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinder")]
#[command(about = "Component schema compiler with scripting bindings", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./cinder.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schemas into the definitions and bindings sources
    Compile {
        /// Schema directories, loaded in order
        #[arg(long, num_args = 1..)]
        schemas: Vec<PathBuf>,

        /// Output directory for the generated sources
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Resolve schemas and report errors without writing anything
    Check {
        /// Schema directories, loaded in order
        #[arg(long, num_args = 1..)]
        schemas: Vec<PathBuf>,
    },

    /// Show the resolved layout and defaults of one type
    Inspect {
        /// Type name
        name: String,

        /// Schema directories, loaded in order
        #[arg(long, num_args = 1..)]
        schemas: Vec<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config =
        CompilerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("configuration: {:?}", config);

    match cli.command {
        Commands::Compile { schemas, out } => {
            config.apply_overrides(&schemas, out.as_deref());
            compile::run(&config)
        }
        Commands::Check { schemas } => {
            config.apply_overrides(&schemas, None);
            check::run(&config.schemas)
        }
        Commands::Inspect { name, schemas } => {
            config.apply_overrides(&schemas, None);
            inspect::run(&name, &config.schemas)
        }
    }
}

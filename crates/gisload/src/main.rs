//! gisload launcher.
//!
//! Scans a directory tree for shapefiles, classifies each filename to a
//! destination schema, and loads the matches into PostGIS through the
//! external `shp2pgsql | psql` toolchain.

use clap::{Parser, Subcommand};
use gisload_logging::LogConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "gisload", about = "Load shapefile trees into PostGIS")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file path (default: ~/.gisload/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover shapefiles and show their classification (no database access)
    Scan {
        /// Directory to scan (overrides the configured root)
        path: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Output file paths only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Load discovered shapefiles into PostGIS
    Load {
        /// Directory to scan (overrides the configured root)
        path: Option<PathBuf>,

        /// Print the pipelines that would run, without executing them
        #[arg(long)]
        dry_run: bool,

        /// Source SRID (overrides the configured value)
        #[arg(long)]
        srid: Option<u32>,

        /// Database user (overrides the configured value)
        #[arg(long)]
        db_user: Option<String>,

        /// Database name (overrides the configured value)
        #[arg(long)]
        db_name: Option<String>,

        /// Load unrecognized files into this schema instead of skipping them
        #[arg(long, value_name = "SCHEMA")]
        include_unrecognized: Option<String>,
    },

    /// Print the active classification table
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = gisload_logging::init_logging(LogConfig {
        app_name: "gisload",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { path, json, quiet } => {
            cli::scan::run(cli::scan::ScanArgs { path, json, quiet }, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Load {
            path,
            dry_run,
            srid,
            db_user,
            db_name,
            include_unrecognized,
        } => cli::load::run(
            cli::load::LoadArgs {
                path,
                dry_run,
                srid,
                db_user,
                db_name,
                include_unrecognized,
            },
            config,
        ),
        Commands::Rules { json } => {
            cli::rules::run(json, config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

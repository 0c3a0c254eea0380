//! # catx CLI
//!
//! Command-line interface for the category taxonomy export toolkit.
//!
//! ## Usage
//!
//! ```bash
//! catx --config ./config/catx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catx check` | Probe connectivity and list public tables |
//! | `catx export` | Export the full taxonomy to a JSON document |
//! | `catx sample` | Export per-level lists plus a 3-level sample |
//! | `catx stats` | Print row counts per table |
//! | `catx tunnel` | Open an SSH forward and rewrite the config to use it |
//!
//! ## Exit codes
//!
//! `2` connection failure, `3` query/schema mismatch, `4` the document could
//! not be encoded or written, `1` anything else.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use catx::error::ExportError;
use catx::progress::ProgressMode;
use catx::{check, config, export, sample, stats, tunnel};

/// Category taxonomy export toolkit.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the database descriptor and optional tunnel settings.
#[derive(Parser)]
#[command(
    name = "catx",
    about = "Export tooling for a 7-level category taxonomy database",
    version,
    long_about = "catx reads a 7-level category hierarchy plus hard-logic word rules, \
    soft-logic keywords, and free-text explanations from PostgreSQL and serializes \
    them into a single JSON document. It can also open an SSH port-forward to reach \
    a remote database and rewrite the local configuration to point at it."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catx.toml")]
    config: PathBuf,

    /// Progress reporting on stderr. Defaults to `human` when stderr is a
    /// TTY, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProgressArg {
    Off,
    Human,
    Json,
}

impl From<ProgressArg> for ProgressMode {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::Off => ProgressMode::Off,
            ProgressArg::Human => ProgressMode::Human,
            ProgressArg::Json => ProgressMode::Json,
        }
    }
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Probe database connectivity.
    ///
    /// Connects with the configured descriptor, runs `SELECT 1`, and prints
    /// the server version, current database/user, and public tables.
    Check,

    /// Export the full taxonomy to a JSON document.
    ///
    /// Reads the 7-level hierarchy, per-level category lists, hard and soft
    /// logic rules, and explanations, and writes one pretty-printed JSON
    /// file. All or nothing: any failure aborts without writing.
    Export {
        /// Output file. Defaults to `export.output` from the config.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export per-level category lists plus a bounded 3-level sample.
    ///
    /// A lighter document for a quick look at the taxonomy without the full
    /// join chain and rule tables.
    Sample {
        /// Output file. Defaults to `export.sample_output` from the config.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Maximum number of sample rows. Defaults to `export.sample_limit`.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Print row counts for every taxonomy table.
    Stats,

    /// Open an SSH port-forward to the database and keep it up.
    ///
    /// Establishes the forward described by `[tunnel]`, probes the database
    /// through it, rewrites `[database]` in the config file to point at the
    /// forwarded port, and holds the tunnel open until Ctrl-C.
    Tunnel,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {:#}", err);
        let code = err
            .downcast_ref::<ExportError>()
            .map(ExportError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(&cli.config)?;
    let mode: ProgressMode = cli
        .progress
        .map(Into::into)
        .unwrap_or_else(ProgressMode::default_for_tty);
    let reporter = mode.reporter();

    match cli.command {
        Commands::Check => {
            check::run_check(&cfg.database).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref(), reporter.as_ref()).await?;
        }
        Commands::Sample { output, limit } => {
            sample::run_sample(&cfg, output.as_deref(), limit, reporter.as_ref()).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Tunnel => {
            tunnel::run_tunnel(&cfg, &cli.config).await?;
        }
    }

    Ok(())
}

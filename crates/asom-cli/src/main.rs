use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "asom")]
#[command(about = "ASOM gate check: evidence completeness validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Promotion gate commands
    Gate {
        #[command(subcommand)]
        cmd: GateCmd,
    },

    /// C-11 emergency override review
    Overrides {
        #[command(subcommand)]
        cmd: OverridesCmd,
    },

    /// Configuration utilities
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum GateCmd {
    /// Report READY/BLOCKED for a gate. Exit 0 = READY, 1 = BLOCKED, 2 = no report.
    /// Does NOT approve; human approval is required separately.
    Check {
        /// Gate ID (e.g. G1, G2, G3, G4)
        #[arg(long)]
        gate: String,

        /// Comma-separated control IDs. Falls back to the gate's config profile.
        #[arg(long)]
        controls: Option<String>,

        /// Path to ledger JSONL (overrides ASOM_LEDGER_PATH and config)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Also check C-11 emergency overrides and remediation status
        #[arg(long, default_value_t = false)]
        check_overrides: bool,

        /// Also write gate_report.json into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum OverridesCmd {
    /// Print the override remediation summary only (always exit 0 on success)
    Check {
        #[arg(long)]
        ledger: Option<PathBuf>,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the effective merged config as JSON
    Show {
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

fn main() -> ExitCode {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(commands::EXIT_NO_REPORT)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.cmd {
        Commands::Gate { cmd } => match cmd {
            GateCmd::Check {
                gate,
                controls,
                ledger,
                config_paths,
                check_overrides,
                out_dir,
            } => commands::gate::gate_check(commands::gate::GateCheckArgs {
                gate,
                controls,
                ledger,
                config_paths,
                check_overrides,
                out_dir,
            }),
        },

        Commands::Overrides { cmd } => match cmd {
            OverridesCmd::Check {
                ledger,
                config_paths,
            } => commands::gate::overrides_check(ledger, &config_paths),
        },

        Commands::Config { cmd } => match cmd {
            ConfigCmd::Show { config_paths } => {
                let loaded = commands::load_config(&config_paths)?;
                let json = serde_json::to_string_pretty(&loaded.config_json)
                    .context("serialize effective config failed")?;
                commands::print_json(&json)?;
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

/// Logs go to stderr so stdout carries only the JSON report.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

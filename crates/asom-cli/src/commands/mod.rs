//! Command handler modules for asom-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod gate;

use anyhow::{Context, Result};
use asom_config::{GateCheckConfig, LoadedConfig, ENV_LEDGER_PATH};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const EXIT_READY: u8 = 0;
pub const EXIT_BLOCKED: u8 = 1;
/// The run failed before a report existed (load error, malformed record, bad args).
pub const EXIT_NO_REPORT: u8 = 2;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config; no paths means built-in defaults.
pub fn load_config(config_paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    if path_refs.is_empty() {
        asom_config::load_layered_yaml_from_strings(&[])
    } else {
        asom_config::load_layered_yaml(&path_refs)
    }
}

/// Resolve the ledger path: `--ledger`, then `ASOM_LEDGER_PATH`, then config.
pub fn resolve_ledger_path(config: &GateCheckConfig, cli: Option<&Path>) -> PathBuf {
    let env = std::env::var(ENV_LEDGER_PATH).ok();
    config.resolve_ledger_path(cli, env.as_deref())
}

/// Write one JSON document to stdout. A closed or failing stdout is an
/// error (exit 2), never a panic.
pub fn print_json(json: &str) -> Result<()> {
    write_json(&mut std::io::stdout().lock(), json)
}

fn write_json(out: &mut impl Write, json: &str) -> Result<()> {
    writeln!(out, "{json}").context("write report to stdout failed")?;
    out.flush().context("flush stdout failed")
}

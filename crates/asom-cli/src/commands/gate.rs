//! Gate-check and override-review command handlers.
//!
//! Covers `asom gate check` and `asom overrides check`. The report is the
//! only thing written to stdout; it is printed only after loading and
//! validation have fully succeeded.

use anyhow::{Context, Result};
use asom_gate::{GateCheckInput, GateResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use super::{load_config, print_json, resolve_ledger_path, EXIT_BLOCKED, EXIT_READY};

pub struct GateCheckArgs {
    pub gate: String,
    pub controls: Option<String>,
    pub ledger: Option<PathBuf>,
    pub config_paths: Vec<String>,
    pub check_overrides: bool,
    pub out_dir: Option<PathBuf>,
}

/// Execute `asom gate check`. Exit code follows `gate_result` only; the
/// override section never changes it.
pub fn gate_check(args: GateCheckArgs) -> Result<ExitCode> {
    let loaded = load_config(&args.config_paths)?;

    let required = match args.controls.as_deref() {
        Some(raw) => asom_gate::parse_control_list(raw),
        None => loaded.config.required_controls(&args.gate).with_context(|| {
            format!(
                "no --controls given and no config profile for gate '{}'",
                args.gate
            )
        })?,
    };

    let ledger_path = resolve_ledger_path(&loaded.config, args.ledger.as_deref());
    info!(
        gate = %args.gate,
        ledger = %ledger_path.display(),
        required = ?required,
        "gate check"
    );

    let input = GateCheckInput::new(args.gate, required).with_overrides(args.check_overrides);
    let report = asom_gate::check_gate_from_ledger(&ledger_path, &input)
        .with_context(|| format!("gate check failed for ledger {}", ledger_path.display()))?;

    let json = report
        .to_json_pretty()
        .context("serialize gate report failed")?;

    if let Some(out_dir) = args.out_dir.as_deref() {
        let path = asom_gate::write_gate_report_json(out_dir, &report)
            .with_context(|| format!("write report failed: {}", out_dir.display()))?;
        info!(path = %path.display(), "gate report written");
    }

    print_json(&json)?;

    info!(
        gate = %report.gate,
        gate_result = report.gate_result.as_str(),
        "gate check complete"
    );
    Ok(ExitCode::from(match report.gate_result {
        GateResult::Ready => EXIT_READY,
        GateResult::Blocked => EXIT_BLOCKED,
    }))
}

/// Execute `asom overrides check`: override summary only, independent of any gate.
pub fn overrides_check(ledger: Option<PathBuf>, config_paths: &[String]) -> Result<ExitCode> {
    let loaded = load_config(config_paths)?;
    let ledger_path = resolve_ledger_path(&loaded.config, ledger.as_deref());

    let records = asom_ledger::load_ledger(&ledger_path)
        .with_context(|| {
            format!("override check failed for ledger {}", ledger_path.display())
        })?;
    let report = asom_gate::evaluate_overrides(&records);

    let json = serde_json::to_string_pretty(&report).context("serialize override report failed")?;
    print_json(&json)?;

    info!(
        overrides = report.overrides_found,
        status = report.status.as_str(),
        "override check complete"
    );
    Ok(ExitCode::SUCCESS)
}

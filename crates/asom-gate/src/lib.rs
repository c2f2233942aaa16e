//! Evidence-based promotion gate checker.
//!
//! Reports machine-checkable readiness only; it never approves a promotion.
//! Human approval happens elsewhere.

mod aggregate;
mod evaluator;
mod overrides;
mod types;

use std::path::Path;

use asom_ledger::{EvidenceRecord, LedgerError};

pub use aggregate::EvidenceIndex;
pub use evaluator::{evaluate_gate, BLOCKED_NOTE, READY_NOTE};
pub use overrides::{
    aggregate_status, evaluate_overrides, CLEAN_NOTE, INCOMPLETE_NOTE, REMEDIATED_NOTE,
};
pub use types::{
    parse_control_list, write_gate_report_json, ControlStatus, ControlVerdict, ControlVerdicts,
    GateCheckInput, GateReport, GateResult, OverrideDetail, OverrideReport, OverrideStatus,
    RemediationState,
};

/// Errors that prevent a report from being produced at all.
#[derive(Debug, thiserror::Error)]
pub enum GateCheckError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A passing record is missing an id (1-based record position).
    #[error("malformed evidence record #{position}: status is \"pass\" but {field} is missing")]
    MalformedEvidenceRecord {
        position: usize,
        field: &'static str,
    },
}

/// Run a full gate check over already-loaded records.
///
/// Validation happens before any verdict is computed, so an error means no
/// report, never a partial one.
pub fn check_gate(
    records: &[EvidenceRecord],
    input: &GateCheckInput,
) -> Result<GateReport, GateCheckError> {
    let index = EvidenceIndex::build(records)?;
    let mut report = evaluate_gate(&index, &input.required_controls, &input.gate_id);

    if input.check_overrides {
        report.overrides = Some(evaluate_overrides(records));
    }

    Ok(report)
}

/// Load the ledger at `ledger_path` and run [`check_gate`] over it.
pub fn check_gate_from_ledger(
    ledger_path: &Path,
    input: &GateCheckInput,
) -> Result<GateReport, GateCheckError> {
    let records = asom_ledger::load_ledger(ledger_path)?;
    check_gate(&records, input)
}

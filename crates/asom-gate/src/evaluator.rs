use tracing::{debug, warn};

use crate::aggregate::EvidenceIndex;
use crate::types::{ControlVerdict, ControlVerdicts, GateReport, GateResult};

pub const READY_NOTE: &str =
    "All required controls have passing evidence. Human approval required for promotion.";
pub const BLOCKED_NOTE: &str = "Missing evidence blocks promotion. Remediate and re-run.";

/// Evaluate one gate against the aggregated evidence.
///
/// READY only if every required control has at least one passing record.
/// An empty `required_controls` list is READY. Duplicate entries collapse
/// into one verdict at the first entry's position. `controls` follows the
/// order of `required_controls`. The returned report carries no override
/// section.
pub fn evaluate_gate(
    index: &EvidenceIndex,
    required_controls: &[String],
    gate_id: &str,
) -> GateReport {
    let mut controls = ControlVerdicts::new();
    let mut all_pass = true;

    for ctrl in required_controls {
        let verdict = if index.is_satisfied(ctrl) {
            ControlVerdict::satisfied(index.evidence_for(ctrl).to_vec())
        } else {
            all_pass = false;
            ControlVerdict::missing()
        };
        controls.insert(ctrl.clone(), verdict);
    }

    let (gate_result, note) = if all_pass {
        (GateResult::Ready, READY_NOTE)
    } else {
        (GateResult::Blocked, BLOCKED_NOTE)
    };

    if gate_result.is_ready() {
        debug!(gate = gate_id, required = required_controls.len(), "gate READY");
    } else {
        let missing: Vec<&str> = required_controls
            .iter()
            .filter(|c| !index.is_satisfied(c))
            .map(String::as_str)
            .collect();
        warn!(gate = gate_id, ?missing, "gate BLOCKED");
    }

    GateReport {
        gate: gate_id.to_string(),
        gate_result,
        controls,
        note: note.to_string(),
        overrides: None,
    }
}

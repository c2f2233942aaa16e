//! C-11 emergency override remediation review.
//!
//! Overrides are by definition out-of-band and often carry incomplete
//! metadata. Missing fields are filled with visible defaults ("unknown",
//! empty list, null) and never fail the evaluation. Present fields are
//! reported as recorded whatever their JSON type; a `remediation_status`
//! that is not a string classifies as pending.
//!
//! Aggregate status precedence:
//! 1. no overrides                    -> CLEAN
//! 2. every override completed        -> REMEDIATED
//! 3. at least one override escalated -> ESCALATED (even if others completed)
//! 4. otherwise                       -> PENDING

use asom_ledger::EvidenceRecord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{OverrideDetail, OverrideReport, OverrideStatus, RemediationState};

pub const CLEAN_NOTE: &str = "No emergency overrides recorded.";
pub const REMEDIATED_NOTE: &str =
    "All overrides remediated. Evidence deferred and subsequently produced.";
pub const INCOMPLETE_NOTE: &str = "Override remediation incomplete. Review required.";

const UNKNOWN: &str = "unknown";

/// Summarize every C-11 record in `records`, whatever its `status`.
pub fn evaluate_overrides(records: &[EvidenceRecord]) -> OverrideReport {
    let details: Vec<OverrideDetail> = records
        .iter()
        .filter(|r| r.is_emergency_override())
        .map(override_detail)
        .collect();

    if details.is_empty() {
        debug!("no emergency overrides in ledger");
        return OverrideReport {
            overrides_found: 0,
            status: OverrideStatus::Clean,
            overrides: Vec::new(),
            note: CLEAN_NOTE.to_string(),
        };
    }

    let status = aggregate_status(details.iter().map(|d| d.remediation_state));
    let note = if status == OverrideStatus::Remediated {
        REMEDIATED_NOTE
    } else {
        INCOMPLETE_NOTE
    };

    if status == OverrideStatus::Escalated {
        warn!(overrides = details.len(), "escalated emergency override present");
    } else {
        debug!(overrides = details.len(), status = status.as_str(), "overrides evaluated");
    }

    OverrideReport {
        overrides_found: details.len(),
        status,
        overrides: details,
        note: note.to_string(),
    }
}

/// Fold per-override states into the aggregate status.
pub fn aggregate_status(states: impl IntoIterator<Item = RemediationState>) -> OverrideStatus {
    let mut found = false;
    let mut all_completed = true;
    let mut any_escalated = false;

    for s in states {
        found = true;
        match s {
            RemediationState::Completed => {}
            RemediationState::Escalated => {
                all_completed = false;
                any_escalated = true;
            }
            RemediationState::Pending => all_completed = false,
        }
    }

    if !found {
        OverrideStatus::Clean
    } else if all_completed {
        OverrideStatus::Remediated
    } else if any_escalated {
        OverrideStatus::Escalated
    } else {
        OverrideStatus::Pending
    }
}

fn override_detail(rec: &EvidenceRecord) -> OverrideDetail {
    let or_unknown = |v: &Option<Value>| v.clone().unwrap_or_else(|| Value::from(UNKNOWN));
    OverrideDetail {
        override_id: rec.evidence_id.clone(),
        deferred_controls: rec
            .standard_controls_deferred
            .clone()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        remediation_deadline: rec.remediation_deadline.clone(),
        remediation_status: or_unknown(&rec.remediation_status),
        remediation_state: RemediationState::classify(rec.remediation_status_str()),
        emergency_approver: or_unknown(&rec.emergency_approver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use RemediationState::*;

    #[test]
    fn precedence_table() {
        assert_eq!(aggregate_status(Vec::new()), OverrideStatus::Clean);
        assert_eq!(aggregate_status([Completed, Completed]), OverrideStatus::Remediated);
        assert_eq!(aggregate_status([Completed, Escalated]), OverrideStatus::Escalated);
        assert_eq!(aggregate_status([Pending, Escalated]), OverrideStatus::Escalated);
        assert_eq!(aggregate_status([Completed, Pending]), OverrideStatus::Pending);
        assert_eq!(aggregate_status([Pending]), OverrideStatus::Pending);
    }

    #[test]
    fn bare_override_gets_visible_defaults() {
        let rec = EvidenceRecord {
            control_id: Some("C-11".into()),
            ..EvidenceRecord::default()
        };
        let report = evaluate_overrides(&[rec]);

        assert_eq!(report.overrides_found, 1);
        assert_eq!(report.status, OverrideStatus::Pending);
        let d = &report.overrides[0];
        assert_eq!(d.override_id, None);
        assert_eq!(d.deferred_controls, json!([]));
        assert_eq!(d.remediation_deadline, None);
        assert_eq!(d.remediation_status, "unknown");
        assert_eq!(d.remediation_state, Pending);
        assert_eq!(d.emergency_approver, "unknown");
        assert_eq!(report.note, INCOMPLETE_NOTE);
    }

    #[test]
    fn odd_metadata_types_are_reported_as_recorded() {
        let rec = EvidenceRecord {
            control_id: Some("C-11".into()),
            evidence_id: Some("OV-9".into()),
            standard_controls_deferred: Some(json!("C-05")),
            remediation_status: Some(json!(1)),
            emergency_approver: Some(json!({"name": "cto"})),
            ..EvidenceRecord::default()
        };
        let report = evaluate_overrides(&[rec]);

        let d = &report.overrides[0];
        assert_eq!(d.deferred_controls, json!("C-05"));
        assert_eq!(d.remediation_status, json!(1));
        assert_eq!(d.remediation_state, Pending);
        assert_eq!(d.emergency_approver, json!({"name": "cto"}));
        assert_eq!(report.status, OverrideStatus::Pending);
    }

    #[test]
    fn non_override_records_are_ignored() {
        let report = evaluate_overrides(&[
            EvidenceRecord::new("C-04", "E1", "pass"),
            EvidenceRecord::new("C-10", "E2", "pass"),
        ]);
        assert_eq!(report.overrides_found, 0);
        assert_eq!(report.status, OverrideStatus::Clean);
        assert_eq!(report.note, CLEAN_NOTE);
    }
}

use std::collections::BTreeMap;

use asom_ledger::EvidenceRecord;
use tracing::debug;

use crate::GateCheckError;

/// Passing evidence grouped by control id.
///
/// Only records with `status == "pass"` contribute. A control with no passing
/// record has no entry; absence is what blocks, a failing record never does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceIndex {
    by_control: BTreeMap<String, Vec<String>>,
}

impl EvidenceIndex {
    /// Aggregate `records`, keeping ledger order within each control.
    ///
    /// # Errors
    /// [`GateCheckError::MalformedEvidenceRecord`] if a passing record lacks
    /// `control_id` or `evidence_id`. Non-passing records are never inspected
    /// for missing ids.
    pub fn build(records: &[EvidenceRecord]) -> Result<Self, GateCheckError> {
        let mut by_control: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (i, rec) in records.iter().enumerate() {
            if !rec.is_pass() {
                continue;
            }
            let control_id = rec.control_id.as_ref().ok_or(
                GateCheckError::MalformedEvidenceRecord {
                    position: i + 1,
                    field: "control_id",
                },
            )?;
            let evidence_id = rec.evidence_id.as_ref().ok_or(
                GateCheckError::MalformedEvidenceRecord {
                    position: i + 1,
                    field: "evidence_id",
                },
            )?;
            by_control
                .entry(control_id.clone())
                .or_default()
                .push(evidence_id.clone());
        }

        debug!(
            records = records.len(),
            controls_covered = by_control.len(),
            "evidence aggregated"
        );
        Ok(Self { by_control })
    }

    /// Passing evidence ids for `control_id` (empty if none).
    pub fn evidence_for(&self, control_id: &str) -> &[String] {
        self.by_control
            .get(control_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_satisfied(&self, control_id: &str) -> bool {
        self.by_control.contains_key(control_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pass_records_are_indexed() {
        let records = vec![
            EvidenceRecord::new("C-04", "E1", "pass"),
            EvidenceRecord::new("C-04", "E2", "fail"),
            EvidenceRecord::new("C-05", "E3", "pending"),
            EvidenceRecord::new("C-04", "E4", "pass"),
        ];
        let idx = EvidenceIndex::build(&records).unwrap();

        assert_eq!(idx.evidence_for("C-04"), ["E1", "E4"]);
        assert!(!idx.is_satisfied("C-05"));
        assert!(idx.evidence_for("C-05").is_empty());
        assert_eq!(idx.by_control.len(), 1);
    }

    #[test]
    fn non_string_status_never_satisfies() {
        let odd = EvidenceRecord {
            control_id: Some("C-04".into()),
            evidence_id: Some("E1".into()),
            status: Some(serde_json::json!(0)),
            ..EvidenceRecord::default()
        };
        let idx = EvidenceIndex::build(&[odd]).unwrap();
        assert!(!idx.is_satisfied("C-04"));
    }

    #[test]
    fn passing_record_without_control_id_is_malformed() {
        let mut bad = EvidenceRecord::new("C-04", "E9", "pass");
        bad.control_id = None;
        let records = vec![EvidenceRecord::new("C-04", "E1", "pass"), bad];

        match EvidenceIndex::build(&records) {
            Err(GateCheckError::MalformedEvidenceRecord { position, field }) => {
                assert_eq!(position, 2);
                assert_eq!(field, "control_id");
            }
            other => panic!("expected MalformedEvidenceRecord, got {other:?}"),
        }
    }

    #[test]
    fn passing_record_without_evidence_id_is_malformed() {
        let mut bad = EvidenceRecord::new("C-04", "E1", "pass");
        bad.evidence_id = None;

        assert!(matches!(
            EvidenceIndex::build(&[bad]),
            Err(GateCheckError::MalformedEvidenceRecord {
                position: 1,
                field: "evidence_id"
            })
        ));
    }

    #[test]
    fn failing_record_without_ids_is_ignored() {
        let bad = EvidenceRecord {
            status: Some("fail".into()),
            ..EvidenceRecord::default()
        };
        let idx = EvidenceIndex::build(&[bad]).unwrap();
        assert_eq!(idx, EvidenceIndex::default());
    }
}

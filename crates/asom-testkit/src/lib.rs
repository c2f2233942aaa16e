//! Ledger fixtures for scenario tests.

use anyhow::{Context, Result};
use asom_ledger::{EvidenceRecord, EMERGENCY_OVERRIDE_CONTROL};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn pass(control_id: &str, evidence_id: &str) -> EvidenceRecord {
    EvidenceRecord::new(control_id, evidence_id, "pass")
}

pub fn fail(control_id: &str, evidence_id: &str) -> EvidenceRecord {
    EvidenceRecord::new(control_id, evidence_id, "fail")
}

/// A C-11 override record. `remediation_status: None` leaves the field absent.
pub fn emergency_override(
    evidence_id: &str,
    deferred: &[&str],
    remediation_status: Option<&str>,
    approver: &str,
) -> EvidenceRecord {
    EvidenceRecord {
        control_id: Some(EMERGENCY_OVERRIDE_CONTROL.to_string()),
        evidence_id: Some(evidence_id.to_string()),
        status: Some(json!("override")),
        standard_controls_deferred: Some(json!(deferred)),
        remediation_deadline: Some(json!("2026-12-31T00:00:00Z")),
        remediation_status: remediation_status.map(Value::from),
        emergency_approver: Some(json!(approver)),
    }
}

/// Render records as JSONL content (one compact object per line).
pub fn to_jsonl(records: &[EvidenceRecord]) -> Result<String> {
    let mut out = String::new();
    for r in records {
        out.push_str(&serde_json::to_string(r).context("serialize evidence record")?);
        out.push('\n');
    }
    Ok(out)
}

/// A ledger file in its own temp directory; removed on drop.
pub struct LedgerFixture {
    dir: TempDir,
    path: PathBuf,
}

impl LedgerFixture {
    pub fn from_records(records: &[EvidenceRecord]) -> Result<Self> {
        Self::from_raw(&to_jsonl(records)?)
    }

    /// Write `content` verbatim, for malformed-ledger scenarios.
    pub fn from_raw(content: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create ledger tempdir")?;
        let path = dir.path().join("evidence").join("ledger.jsonl");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {:?}", parent))?;
        }
        fs::write(&path, content).with_context(|| format!("write ledger {:?}", path))?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root of the temp directory (useful as a working dir or out dir).
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

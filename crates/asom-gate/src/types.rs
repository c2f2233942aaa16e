use std::fmt;
use std::io;
use std::ops::Index;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Parameters for one gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCheckInput {
    /// Free-form gate label (e.g. "G3"). Passed through unvalidated.
    pub gate_id: String,
    /// Controls that must each have at least one passing record.
    pub required_controls: Vec<String>,
    /// Also evaluate C-11 override remediation and merge it into the report.
    pub check_overrides: bool,
}

impl GateCheckInput {
    pub fn new(gate_id: impl Into<String>, required_controls: Vec<String>) -> Self {
        Self {
            gate_id: gate_id.into(),
            required_controls,
            check_overrides: false,
        }
    }

    pub fn with_overrides(mut self, check_overrides: bool) -> Self {
        self.check_overrides = check_overrides;
        self
    }
}

/// Split a comma-separated control list, trimming whitespace around entries.
///
/// Empty entries are dropped, so `""` yields an empty (vacuously READY) list.
pub fn parse_control_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Gate verdicts
// ---------------------------------------------------------------------------

/// Overall gate outcome. Only this field is a machine signal; `note` is prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateResult {
    Ready,
    Blocked,
}

impl GateResult {
    /// Boundary string, as serialized and as logged.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateResult::Ready => "READY",
            GateResult::Blocked => "BLOCKED",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GateResult::Ready)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlStatus {
    Satisfied,
    Missing,
}

/// Verdict for one required control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlVerdict {
    pub status: ControlStatus,
    /// Passing evidence ids in ledger order; empty when MISSING.
    pub evidence: Vec<String>,
}

impl ControlVerdict {
    pub fn satisfied(evidence: Vec<String>) -> Self {
        Self {
            status: ControlStatus::Satisfied,
            evidence,
        }
    }

    pub fn missing() -> Self {
        Self {
            status: ControlStatus::Missing,
            evidence: Vec::new(),
        }
    }
}

/// Per-control verdicts in required-list order.
///
/// Serializes as a JSON object whose keys keep insertion order, so the
/// report lists controls the way the operator wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlVerdicts(Vec<(String, ControlVerdict)>);

impl ControlVerdicts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verdict for `control`. A control already present keeps its
    /// first position.
    pub fn insert(&mut self, control: String, verdict: ControlVerdict) {
        match self.0.iter_mut().find(|(c, _)| *c == control) {
            Some((_, slot)) => *slot = verdict,
            None => self.0.push((control, verdict)),
        }
    }

    pub fn get(&self, control: &str) -> Option<&ControlVerdict> {
        self.0.iter().find(|(c, _)| c == control).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<&str> for ControlVerdicts {
    type Output = ControlVerdict;

    fn index(&self, control: &str) -> &ControlVerdict {
        match self.get(control) {
            Some(v) => v,
            None => panic!("no verdict for control {control:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a ControlVerdicts {
    type Item = &'a (String, ControlVerdict);
    type IntoIter = std::slice::Iter<'a, (String, ControlVerdict)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ControlVerdicts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (control, verdict) in &self.0 {
            map.serialize_entry(control, verdict)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ControlVerdicts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VerdictsVisitor;

        impl<'de> Visitor<'de> for VerdictsVisitor {
            type Value = ControlVerdicts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of control id to verdict")
            }

            fn visit_map<A>(self, mut access: A) -> Result<ControlVerdicts, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = ControlVerdicts::new();
                while let Some((control, verdict)) = access.next_entry()? {
                    out.insert(control, verdict);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(VerdictsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Override verdicts
// ---------------------------------------------------------------------------

/// Per-override remediation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemediationState {
    Completed,
    Escalated,
    /// Any other value, including an absent field.
    Pending,
}

impl RemediationState {
    pub fn classify(remediation_status: Option<&str>) -> Self {
        match remediation_status {
            Some("completed") => RemediationState::Completed,
            Some("escalated") => RemediationState::Escalated,
            _ => RemediationState::Pending,
        }
    }
}

/// Aggregate status across every override found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverrideStatus {
    Clean,
    Remediated,
    Escalated,
    Pending,
}

impl OverrideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideStatus::Clean => "CLEAN",
            OverrideStatus::Remediated => "REMEDIATED",
            OverrideStatus::Escalated => "ESCALATED",
            OverrideStatus::Pending => "PENDING",
        }
    }
}

/// One C-11 record as reported. Source fields are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDetail {
    /// The override's `evidence_id` (null when absent).
    pub override_id: Option<String>,
    /// As recorded, whatever its JSON type; `[]` when absent.
    pub deferred_controls: Value,
    pub remediation_deadline: Option<Value>,
    /// As recorded, or "unknown" when absent.
    pub remediation_status: Value,
    pub remediation_state: RemediationState,
    /// As recorded, or "unknown" when absent.
    pub emergency_approver: Value,
}

/// Summary of all emergency overrides in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideReport {
    pub overrides_found: usize,
    pub status: OverrideStatus,
    /// Omitted entirely when no overrides were found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideDetail>,
    pub note: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Full gate-check report artifact (serializable to JSON).
///
/// Holds no timestamps; repeated runs over the same ledger and required
/// list produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub gate: String,
    pub gate_result: GateResult,
    pub controls: ControlVerdicts,
    pub note: String,
    /// Present only when override checking was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OverrideReport>,
}

impl GateReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the report as pretty-printed JSON to `out_dir/gate_report.json`.
/// Returns the path written.
pub fn write_gate_report_json(out_dir: &Path, report: &GateReport) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("gate_report.json");
    let json = report.to_json_pretty().map_err(io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only status value that counts toward satisfying a control.
pub const PASS_STATUS: &str = "pass";

/// Reserved control id for emergency overrides.
pub const EMERGENCY_OVERRIDE_CONTROL: &str = "C-11";

/// One ledger line.
///
/// Every field is optional at parse time. Whether a missing field is an
/// error depends on the consumer: a passing record without ids is malformed
/// for gate aggregation, while an override with no metadata is still
/// evaluated with visible defaults.
///
/// Only the two ids must be strings when present. `status` and the override
/// metadata are kept as raw JSON so an odd value on one record never fails
/// the whole load: a non-string `status` is simply not a pass, and override
/// metadata is reported as recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    // C-11 override metadata, opaque to the checker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_controls_deferred: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_deadline: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_approver: Option<Value>,
}

impl EvidenceRecord {
    /// Minimal record with the three core fields set.
    pub fn new(
        control_id: impl Into<String>,
        evidence_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            control_id: Some(control_id.into()),
            evidence_id: Some(evidence_id.into()),
            status: Some(Value::String(status.into())),
            ..Self::default()
        }
    }

    /// `status` when it is a JSON string.
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }

    /// `remediation_status` when it is a JSON string.
    pub fn remediation_status_str(&self) -> Option<&str> {
        self.remediation_status.as_ref().and_then(Value::as_str)
    }

    pub fn is_pass(&self) -> bool {
        self.status_str() == Some(PASS_STATUS)
    }

    pub fn is_emergency_override(&self) -> bool {
        self.control_id.as_deref() == Some(EMERGENCY_OVERRIDE_CONTROL)
    }
}

//! Layered YAML configuration for the gate checker.
//!
//! Documents are merged in order (earlier = base, later = override), then
//! decoded into [`GateCheckConfig`]. Nothing here is process-global: the
//! resolved ledger path is handed to the loader explicitly by the caller.
//!
//! ```yaml
//! ledger:
//!   path: evidence/ledger.jsonl
//! gates:
//!   G3:
//!     controls: [C-04, C-05, C-06]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var that overrides the configured ledger path.
pub const ENV_LEDGER_PATH: &str = "ASOM_LEDGER_PATH";

pub const DEFAULT_LEDGER_PATH: &str = "evidence/ledger.jsonl";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateCheckConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Gate id -> profile. Sorted for stable `config show` output.
    #[serde(default)]
    pub gates: BTreeMap<String, GateProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}

/// Required controls for one gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub controls: Vec<String>,
}

impl GateCheckConfig {
    /// Configured controls for `gate_id`, trimmed with empty entries dropped.
    /// `None` when the gate has no profile.
    pub fn required_controls(&self, gate_id: &str) -> Option<Vec<String>> {
        self.gates.get(gate_id).map(|p| {
            p.controls
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect()
        })
    }

    /// Ledger path precedence: explicit flag, then env value, then config.
    pub fn resolve_ledger_path(&self, cli: Option<&Path>, env: Option<&str>) -> PathBuf {
        if let Some(p) = cli {
            return p.to_path_buf();
        }
        if let Some(e) = env.map(str::trim).filter(|e| !e.is_empty()) {
            return PathBuf::from(e);
        }
        self.ledger.path.clone()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: GateCheckConfig,
    /// Effective config re-serialized from `config`, as shown by `config show`.
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        match v_json {
            // An empty document contributes nothing.
            Value::Null => continue,
            Value::Object(_) => merged = deep_merge(merged, v_json),
            _ => bail!("config layer {i} must be a mapping at the top level"),
        }
    }

    let config: GateCheckConfig =
        serde_json::from_value(merged).context("invalid gate-check config")?;

    // Re-serialize from the typed config so defaults are visible and key
    // order is stable.
    let config_json = serde_json::to_value(&config).context("config serialize failed")?;

    debug!(
        layers = yaml_docs.len(),
        gates = config.gates.len(),
        "config loaded"
    );

    Ok(LoadedConfig {
        config,
        config_json,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_layers_yields_defaults() {
        let loaded = load_layered_yaml_from_strings(&[]).unwrap();
        assert_eq!(loaded.config, GateCheckConfig::default());
        assert_eq!(loaded.config.ledger.path, PathBuf::from(DEFAULT_LEDGER_PATH));
    }

    #[test]
    fn empty_document_is_ignored() {
        let loaded =
            load_layered_yaml_from_strings(&["", "gates: {G1: {controls: [C-01]}}"]).unwrap();
        assert_eq!(loaded.config.required_controls("G1"), Some(vec!["C-01".to_string()]));
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        assert!(load_layered_yaml_from_strings(&["42"]).is_err());
    }

    #[test]
    fn ledger_path_precedence() {
        let cfg = GateCheckConfig::default();
        let cli = PathBuf::from("cli.jsonl");

        assert_eq!(
            cfg.resolve_ledger_path(Some(&cli), Some("env.jsonl")),
            PathBuf::from("cli.jsonl")
        );
        assert_eq!(
            cfg.resolve_ledger_path(None, Some("env.jsonl")),
            PathBuf::from("env.jsonl")
        );
        assert_eq!(
            cfg.resolve_ledger_path(None, Some("  ")),
            PathBuf::from(DEFAULT_LEDGER_PATH)
        );
        assert_eq!(cfg.resolve_ledger_path(None, None), PathBuf::from(DEFAULT_LEDGER_PATH));
    }
}

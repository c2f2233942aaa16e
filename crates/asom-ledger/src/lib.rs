//! Evidence ledger: record model + JSON Lines loading.
//!
//! The ledger is append-only and owned by the evidence-submission process.
//! This crate only reads it. One evidence record == one JSON line; blank
//! lines are skipped. Any unreadable source or unparseable line aborts the
//! whole load so that no caller ever aggregates over a half-read ledger.

mod record;

pub use record::{EvidenceRecord, EMERGENCY_OVERRIDE_CONTROL, PASS_STATUS};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while loading a ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger file could not be opened or read.
    #[error("ledger unavailable at {path:?}: {source}")]
    LedgerUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank line is not a valid evidence record (1-based line number).
    #[error("ledger parse failed at line {line}: {source}")]
    LedgerParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and parse the ledger at `path`.
///
/// The path is always supplied by the caller; there is no implicit default.
pub fn load_ledger(path: impl AsRef<Path>) -> Result<Vec<EvidenceRecord>, LedgerError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LedgerError::LedgerUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    // Strip UTF-8 BOM if present (ledgers edited on Windows).
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let content = std::str::from_utf8(bytes).map_err(|e| LedgerError::LedgerUnavailable {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let records = parse_ledger_str(content)?;
    info!(path = %path.display(), records = records.len(), "ledger loaded");
    Ok(records)
}

/// Parse JSONL ledger content held in memory.
///
/// Same rules as [`load_ledger`]: whitespace is trimmed per line, blank lines
/// are skipped, the first bad line fails the whole parse.
pub fn parse_ledger_str(content: &str) -> Result<Vec<EvidenceRecord>, LedgerError> {
    let mut records = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: EvidenceRecord = serde_json::from_str(trimmed)
            .map_err(|source| LedgerError::LedgerParse { line: i + 1, source })?;
        records.push(record);
    }

    debug!(records = records.len(), "ledger content parsed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_trims() {
        let content =
            "\n  {\"control_id\":\"C-04\",\"evidence_id\":\"E1\",\"status\":\"pass\"}  \n\n";
        let records = parse_ledger_str(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].control_id.as_deref(), Some("C-04"));
    }

    #[test]
    fn bad_line_reports_its_line_number() {
        let content = concat!(
            "{\"control_id\":\"C-04\",\"evidence_id\":\"E1\",\"status\":\"pass\"}\n",
            "\nnot json\n",
        );
        match parse_ledger_str(content) {
            Err(LedgerError::LedgerParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected LedgerParse, got {other:?}"),
        }
    }

    #[test]
    fn non_object_line_is_rejected() {
        assert!(matches!(
            parse_ledger_str("[1,2,3]"),
            Err(LedgerError::LedgerParse { line: 1, .. })
        ));
    }

    #[test]
    fn non_string_id_is_rejected() {
        assert!(matches!(
            parse_ledger_str("{\"control_id\":4,\"evidence_id\":\"E1\",\"status\":\"fail\"}"),
            Err(LedgerError::LedgerParse { line: 1, .. })
        ));
    }

    #[test]
    fn empty_content_is_an_empty_ledger() {
        assert!(parse_ledger_str("").unwrap().is_empty());
    }
}

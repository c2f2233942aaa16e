//! Gate profiles from layered config, plus `overrides check` and
//! `config show`.

use std::fs;

use asom_config::ENV_LEDGER_PATH;
use asom_testkit::{emergency_override, pass, LedgerFixture};
use predicates::prelude::*;

const GATES_YAML: &str = r#"
ledger:
  path: evidence/ledger.jsonl
gates:
  G3:
    description: "Pre-production promotion"
    controls: [C-04, C-05]
"#;

fn asom(fixture: &LedgerFixture) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("asom").unwrap();
    cmd.current_dir(fixture.root()).env_remove(ENV_LEDGER_PATH);
    cmd
}

fn write_config(fixture: &LedgerFixture, yaml: &str) -> String {
    let path = fixture.root().join("gates.yaml");
    fs::write(&path, yaml).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn controls_come_from_config_profile() {
    let fixture = LedgerFixture::from_records(&[pass("C-04", "E1")]).unwrap();
    let cfg = write_config(&fixture, GATES_YAML);

    asom(&fixture)
        .args(["gate", "check", "--gate", "G3", "--config", &cfg])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"C-05\""));
}

#[test]
fn controls_flag_beats_config_profile() {
    let fixture = LedgerFixture::from_records(&[pass("C-04", "E1")]).unwrap();
    let cfg = write_config(&fixture, GATES_YAML);

    asom(&fixture)
        .args(["gate", "check", "--gate", "G3", "--config", &cfg])
        .args(["--controls", "C-04"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"C-05\"").not());
}

#[test]
fn unknown_gate_without_controls_exits_two() {
    let fixture = LedgerFixture::from_records(&[pass("C-04", "E1")]).unwrap();
    let cfg = write_config(&fixture, GATES_YAML);

    asom(&fixture)
        .args(["gate", "check", "--gate", "G9", "--config", &cfg])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no config profile for gate 'G9'"));
}

#[test]
fn invalid_config_exits_two() {
    let fixture = LedgerFixture::from_records(&[pass("C-04", "E1")]).unwrap();
    let cfg = write_config(&fixture, "gatez: {}\n");

    asom(&fixture)
        .args(["gate", "check", "--gate", "G3", "--controls", "C-04", "--config", &cfg])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid gate-check config"));
}

#[test]
fn overrides_check_reports_without_gate() {
    let fixture = LedgerFixture::from_records(&[
        emergency_override("OV-1", &["C-04"], Some("completed"), "cto"),
        emergency_override("OV-2", &["C-05"], Some("completed"), "ciso"),
    ])
    .unwrap();

    asom(&fixture)
        .args(["overrides", "check"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\": \"REMEDIATED\""))
        .stdout(predicate::str::contains("\"overrides_found\": 2"));
}

#[test]
fn config_show_prints_effective_defaults() {
    let fixture = LedgerFixture::from_records(&[]).unwrap();

    asom(&fixture)
        .args(["config", "show"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("evidence/ledger.jsonl"));
}

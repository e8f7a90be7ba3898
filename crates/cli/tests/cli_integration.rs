//! CLI integration tests for every subcommand.
//!
//! Uses `assert_cmd` to spawn the `tdt` binary and verify exit codes,
//! stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to `fixtures/` resolve.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `tdt` binary, rooted at workspace.
fn tdt() -> Command {
    let mut cmd = cargo_bin_cmd!("tdt");
    cmd.current_dir(workspace_root());
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.output().expect("run tdt");
    assert!(
        out.status.success(),
        "tdt failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn decimal(v: &serde_json::Value) -> Decimal {
    v.as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("valid decimal")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    tdt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tournament Director import toolchain"));
}

#[test]
fn version_exits_0() {
    tdt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tdt"));
}

// ──────────────────────────────────────────────
// 2. import
// ──────────────────────────────────────────────

#[test]
fn import_prints_standings() {
    tdt()
        .args(["import", "fixtures/league_night.tdt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("League Night #12: 6 player(s), prize pool 150.00"))
        .stdout(predicate::str::is_match(r"(?m)^\s+1\s+Alice\s+4\s+75\.00\s+10$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^\s+6\s+Erin\s+0\s+0\.00\s+1$").unwrap())
        .stdout(predicate::str::contains("points formula: embedded in file"))
        .stderr(predicate::str::contains("warning[prize]"));
}

#[test]
fn import_json_document() {
    let doc = json_stdout(tdt().args(["import", "fixtures/league_night.tdt", "--output", "json"]));
    let players = &doc["tournament"]["players"];
    assert_eq!(players["p-alice"]["finish_position"], 1);
    assert_eq!(players["p-alice"]["hits"], 4);
    assert_eq!(decimal(&players["p-alice"]["points"]), Decimal::from(10));
    assert_eq!(decimal(&players["p-alice"]["winnings"]), Decimal::from(75));
    assert_eq!(doc["reconcile"]["hits"]["mode"], "full_credit");
    assert_eq!(doc["reconcile"]["prizes"]["bubble_position"], 4);
    assert_eq!(doc["points"]["source"]["source"], "embedded");

    let diags = doc["diagnostics"].as_array().expect("diagnostics array");
    assert!(diags.iter().any(|d| d["kind"] == "prize"));
    assert!(diags.iter().any(|d| d["kind"] == "elimination"));
}

#[test]
fn hit_mode_flag_overrides_file() {
    let doc = json_stdout(tdt().args([
        "import",
        "fixtures/league_night.tdt",
        "--hit-mode",
        "unique_victims",
        "--output",
        "json",
    ]));
    assert_eq!(doc["reconcile"]["hits"]["mode"], "unique_victims");
    assert_eq!(doc["reconcile"]["hits"]["skipped_repeats"], 1);
    assert_eq!(doc["tournament"]["players"]["p-bob"]["hits"], 1);
}

#[test]
fn formula_flag_overrides_embedded_formula() {
    let doc = json_stdout(tdt().args([
        "import",
        "fixtures/league_night.tdt",
        "--formula",
        "hits_bonus",
        "--output",
        "json",
    ]));
    assert_eq!(doc["points"]["source"]["source"], "override");
    assert_eq!(doc["points"]["source"]["key"], "hits_bonus");
    assert_eq!(
        decimal(&doc["tournament"]["players"]["p-alice"]["points"]),
        Decimal::from(14)
    );
}

#[test]
fn config_file_supplies_settings_and_custom_formulas() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tdt.toml");
    fs::write(
        &config,
        r#"
[hits]
mode = "unique_victims"

[formulas]
override = "double_rank"

[formulas.custom.double_rank]
formula = "max(1, n - r + 1) * 2"
description = "Double rank points"
"#,
    )
    .unwrap();

    let doc = json_stdout(tdt().args([
        "import",
        "fixtures/league_night.tdt",
        "--config",
        config.to_str().unwrap(),
        "--output",
        "json",
    ]));
    assert_eq!(doc["reconcile"]["hits"]["mode"], "unique_victims");
    assert_eq!(doc["points"]["source"]["key"], "double_rank");
    assert_eq!(
        decimal(&doc["tournament"]["players"]["p-alice"]["points"]),
        Decimal::from(12)
    );
}

#[test]
fn flag_beats_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tdt.toml");
    fs::write(&config, "[hits]\nmode = \"unique_victims\"\n").unwrap();

    let doc = json_stdout(tdt().args([
        "import",
        "fixtures/league_night.tdt",
        "--config",
        config.to_str().unwrap(),
        "--hit-mode",
        "full_credit",
        "--output",
        "json",
    ]));
    assert_eq!(doc["reconcile"]["hits"]["mode"], "full_credit");
}

#[test]
fn unregistered_override_warns_and_falls_through() {
    tdt()
        .args(["import", "fixtures/league_night.tdt", "--formula", "nope"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning[config]"))
        .stdout(predicate::str::contains("points formula: embedded in file"));
}

#[test]
fn legacy_file_uses_named_default() {
    tdt()
        .args(["import", "fixtures/legacy_format.tdt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("points formula: default 'tournament_points'"))
        .stdout(predicate::str::contains("needs review"));
}

#[test]
fn malformed_file_exits_1() {
    tdt()
        .args(["import", "fixtures/malformed.tdt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected ',' or '}'"));
}

#[test]
fn missing_tournament_root_exits_1_with_json_error() {
    let out = tdt()
        .args(["import", "fixtures/no_tournament.tdt", "--output", "json"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&out.stderr).expect("stderr is JSON");
    assert_eq!(err["error"]["kind"], "mapping");
}

#[test]
fn missing_file_exits_1() {
    tdt()
        .args(["import", "fixtures/does_not_exist.tdt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn bad_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tdt.toml");
    fs::write(&config, "[hits]\nmode = \"sometimes\"\n").unwrap();

    tdt()
        .args(["import", "fixtures/league_night.tdt", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse config"));
}

#[test]
fn quiet_suppresses_diagnostics() {
    tdt()
        .args(["import", "fixtures/league_night.tdt", "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. parse
// ──────────────────────────────────────────────

#[test]
fn parse_prints_ast_json() {
    let ast = json_stdout(tdt().args(["parse", "fixtures/four_player.tdt"]));
    assert_eq!(ast["node"], "object");
    assert_eq!(ast["entries"]["T"]["node"], "new");
    assert_eq!(ast["entries"]["T"]["ctor"], "Tournament");
}

#[test]
fn parse_lex_error_exits_1() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.tdt");
    fs::write(&file, "{ T: # }").unwrap();

    tdt()
        .arg("parse")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unexpected character '#' at offset 5"));
}

// ──────────────────────────────────────────────
// 4. formulas
// ──────────────────────────────────────────────

#[test]
fn formulas_lists_builtins() {
    tdt()
        .arg("formulas")
        .assert()
        .success()
        .stdout(predicate::str::contains("tournament_points"))
        .stdout(predicate::str::contains("season_with_hits"));
}

#[test]
fn formulas_json_includes_custom() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tdt.toml");
    fs::write(
        &config,
        "[formulas.custom.league_special]\nformula = \"2 * r\"\ncategory = \"season\"\n",
    )
    .unwrap();

    let doc = json_stdout(tdt().args([
        "formulas",
        "--config",
        config.to_str().unwrap(),
        "--output",
        "json",
    ]));
    let specs = doc.as_array().expect("array of formulas");
    assert_eq!(specs.len(), 7);
    let custom = specs
        .iter()
        .find(|s| s["key"] == "league_special")
        .expect("custom formula listed");
    assert_eq!(custom["category"], "season");
}

// ──────────────────────────────────────────────
// 5. eval
// ──────────────────────────────────────────────

#[test]
fn eval_with_variables() {
    tdt()
        .args(["eval", "max(1, n - r + 1)", "--var", "n=10", "--var", "r=3"])
        .assert()
        .success()
        .stdout("8\n");
}

#[test]
fn eval_seeds_tiers_from_n() {
    let doc = json_stdout(tdt().args([
        "eval",
        "T33 + T80",
        "--var",
        "n=9",
        "--output",
        "json",
    ]));
    assert_eq!(doc["value"], 10.0);
}

#[test]
fn eval_runs_dependencies() {
    tdt()
        .args([
            "eval",
            "temp + 1",
            "--dep",
            "assign(\"temp\", r * 2)",
            "--var",
            "r=4",
        ])
        .assert()
        .success()
        .stdout("9\n");
}

#[test]
fn eval_unknown_function_exits_1() {
    tdt()
        .args(["eval", "foo(1)"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("foo"));
}

#[test]
fn eval_bad_var_exits_1() {
    tdt()
        .args(["eval", "1", "--var", "n"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("NAME=VALUE"));
}

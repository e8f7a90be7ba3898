//! Integration tests: read real `.tdt` fixtures through lexer, parser and
//! mapper, and check the resulting tournament record.

use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tdt_core::{
    read_tournament, DiagnosticKind, Diagnostics, EmbeddedHitMode, HistoryCategory, TdtError,
    TournamentData,
};

/// Locate the workspace root.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

fn fixture_source(name: &str) -> String {
    let path = workspace_root().join("fixtures").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
}

fn read_fixture(name: &str) -> (TournamentData, Diagnostics) {
    let mut diags = Diagnostics::new();
    let data = read_tournament(&fixture_source(name), &mut diags)
        .unwrap_or_else(|e| panic!("reading {} failed: {}", name, e));
    (data, diags)
}

// ──────────────────────────────────────────────
// Modern format
// ──────────────────────────────────────────────

#[test]
fn league_night_metadata() {
    let (data, _) = read_fixture("league_night.tdt");
    let m = &data.metadata;
    assert_eq!(m.version, "3.7.2");
    assert_eq!(m.uuid, "t-league-night");
    assert_eq!(m.title, "League Night #12");
    assert_eq!(m.start_time, 1_700_000_000_000);
    assert_eq!(m.league_uuid, "lg-1");
    assert_eq!(m.league_name, "Thursday League");
    assert_eq!(m.season_uuid, "ss-2023");
    assert_eq!(m.season_name, "Fall 2023");
    assert_eq!(
        m.points_formula.as_deref(),
        Some("assign(\"base\", n - r + 1); base + numberofHits")
    );
    assert_eq!(data.config.hit_mode, Some(EmbeddedHitMode::FullCredit));
}

#[test]
fn league_night_players_and_buyins() {
    let (data, _) = read_fixture("league_night.tdt");
    assert_eq!(data.players.len(), 6);
    let frank = &data.players["p-frank"];
    assert_eq!(frank.nickname, "Frank");
    assert_eq!(frank.buyins.len(), 2);
    assert_eq!(frank.rebuy_count(), 1);
    assert_eq!(frank.buyins[1].profile, "Rebuy");
    assert_eq!(frank.latest_bust_out(), Some(120_000));

    let erin = &data.players["p-erin"];
    assert_eq!(
        erin.buyins[0].eliminated_by,
        Some(vec!["p-alice".to_string(), "p-carol".to_string()])
    );

    let alice = &data.players["p-alice"];
    assert!(alice.still_in());
    assert_eq!(alice.addons.len(), 1);
}

#[test]
fn league_night_financials_use_default_for_unknown_profile() {
    let (data, diags) = read_fixture("league_night.tdt");
    let f = &data.financial;
    assert_eq!(f.buy_in, Decimal::from(20));
    assert_eq!(f.fee_profiles.len(), 2);
    assert_eq!(f.fee_profiles["Rebuy"].fee, Decimal::from(10));
    assert_eq!(f.total_buyins_amount, Decimal::from(120));
    assert_eq!(f.total_rebuys_amount, Decimal::from(10));
    // "AddOn" profile is not declared: resolves to the default buy-in
    assert_eq!(f.total_addons_amount, Decimal::from(20));
    assert_eq!(f.prize_pool, Decimal::from(150));
    assert_eq!(data.players["p-alice"].total_invested, Decimal::from(40));
    assert_eq!(data.players["p-frank"].total_invested, Decimal::from(30));
    assert_eq!(diags.count(DiagnosticKind::Mapping), 0);
}

#[test]
fn league_night_history_is_sorted_and_categorized() {
    let (data, _) = read_fixture("league_night.tdt");
    let times: Vec<i64> = data.game_history.iter().map(|e| e.timestamp).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);

    let count = |cat: HistoryCategory| {
        data.game_history
            .iter()
            .filter(|e| e.category == cat)
            .count()
    };
    assert_eq!(count(HistoryCategory::Elimination), 7);
    assert_eq!(count(HistoryCategory::WinnerDeclaration), 1);
    assert_eq!(count(HistoryCategory::Rebuy), 1);
    assert_eq!(count(HistoryCategory::Addon), 1);
    assert_eq!(count(HistoryCategory::General), 1);
}

#[test]
fn league_night_structure_and_prizes() {
    let (data, _) = read_fixture("league_night.tdt");
    assert_eq!(data.structure.levels.len(), 3);
    assert_eq!(data.structure.levels[2].ante, 25);
    assert_eq!(data.prizes.len(), 3);
    assert_eq!(data.prizes[2].position, 3);
    assert_eq!(data.prizes[2].awarded_to, vec!["p-dave".to_string()]);
    assert_eq!(data.prizes[0].calculated_amount, Decimal::from(75));
}

// ──────────────────────────────────────────────
// Legacy format
// ──────────────────────────────────────────────

#[test]
fn legacy_format_reads_all_name_eras() {
    let (data, diags) = read_fixture("legacy_format.tdt");
    assert_eq!(data.metadata.version, "2.5");
    assert_eq!(data.metadata.league_name, "Old League");
    assert_eq!(data.players["l1"].nickname, "Gus");
    assert_eq!(data.players["l2"].nickname, "Hal");
    assert_eq!(data.players["l3"].nickname, "Ivy");
    assert_eq!(
        data.players["l3"].buyins[0].eliminated_by,
        Some(vec!["l1".to_string()])
    );
    assert_eq!(data.structure.levels.len(), 1);
    assert_eq!(data.prizes.len(), 1);
    assert!(data.game_history.is_empty());
    // direct-list players are noted, not rejected
    assert_eq!(diags.count(DiagnosticKind::Mapping), 1);
}

// ──────────────────────────────────────────────
// Fatal errors
// ──────────────────────────────────────────────

#[test]
fn malformed_file_is_a_parse_error() {
    let mut diags = Diagnostics::new();
    let err = read_tournament(&fixture_source("malformed.tdt"), &mut diags).unwrap_err();
    match err {
        TdtError::Parse(p) => {
            assert_eq!(p.expected, "',' or '}'");
            assert_eq!(p.found, "identifier 'Players'");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn missing_tournament_is_a_mapping_error() {
    let mut diags = Diagnostics::new();
    let err = read_tournament(&fixture_source("no_tournament.tdt"), &mut diags).unwrap_err();
    assert!(matches!(err, TdtError::Mapping(_)));
}

#[test]
fn lex_error_carries_offset() {
    let mut diags = Diagnostics::new();
    let err = read_tournament("{ T: # }", &mut diags).unwrap_err();
    match err {
        TdtError::Lex(e) => {
            assert_eq!(e.offset, 5);
            assert_eq!(e.ch, '#');
        }
        other => panic!("expected lex error, got {:?}", other),
    }
}

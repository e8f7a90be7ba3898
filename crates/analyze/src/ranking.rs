//! Ranking engine: finish positions from the game history.
//!
//! 1. A "won the tournament" line fixes position 1.
//! 2. Each eliminated player keeps only their latest elimination time, so a
//!    rebuy pushes the player's finish back to their final bust.
//! 3. Victims are ranked from 2 by that time, most recent first.
//! 4. Players still unranked take the lowest free positions.
//!
//! Deviations from a clean history (no winner line, players missing from
//! the history, a broken permutation) are reported as `Ranking` warnings;
//! the computed positions are kept either way.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use tdt_core::history::winner_name;
use tdt_core::{Diagnostic, DiagnosticKind, Diagnostics, HistoryCategory, Severity, TournamentData};

use crate::narrative;

/// Outcome of [`compute_rankings`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankingSummary {
    /// UUID of the rank-1 player, declared or inferred.
    pub winner: Option<String>,
    /// Player UUIDs ordered by finish position.
    pub ordered: Vec<String>,
    /// Ranking warnings raised during this pass.
    pub warnings: usize,
}

/// Assign `finish_position` to every player.
pub fn compute_rankings(data: &mut TournamentData, diags: &mut Diagnostics) -> RankingSummary {
    let before = diags.len();
    for player in data.players.values_mut() {
        player.finish_position = 0;
    }

    let mut winner = declared_winner(data, diags);

    // victim -> latest narrative elimination time
    let narratives = narrative::extract(data);
    let mut latest: BTreeMap<String, i64> = BTreeMap::new();
    for e in &narratives.resolved {
        latest
            .entry(e.victim.clone())
            .and_modify(|t| *t = (*t).max(e.timestamp))
            .or_insert(e.timestamp);
    }
    for u in &narratives.unresolved {
        diags.warn(
            DiagnosticKind::Ranking,
            format!(
                "bust-out of unknown player '{}' at {} ignored for ranking",
                u.name, u.timestamp
            ),
        );
    }

    if winner.is_none() {
        winner = infer_winner(data, &latest, diags);
    }

    // Players the history never mentions but whose buy-ins busted
    for player in data.players.values() {
        if latest.contains_key(&player.uuid) || winner.as_deref() == Some(player.uuid.as_str()) {
            continue;
        }
        if let Some(t) = player.latest_bust_out() {
            diags.push(
                Diagnostic::new(
                    Severity::Warning,
                    DiagnosticKind::Ranking,
                    format!(
                        "'{}' missing from history; ranked by structured bust-out time {}",
                        player.nickname, t
                    ),
                )
                .with_player(player.uuid.clone()),
            );
            latest.insert(player.uuid.clone(), t);
        }
    }

    let mut taken: BTreeSet<u32> = BTreeSet::new();
    if let Some(uuid) = &winner {
        if let Some(p) = data.players.get_mut(uuid) {
            p.finish_position = 1;
            taken.insert(1);
        }
    }

    let mut victims: Vec<(&String, &i64)> = latest
        .iter()
        .filter(|(uuid, _)| winner.as_ref() != Some(*uuid))
        .collect();
    victims.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (rank, (uuid, _)) in (2u32..).zip(victims) {
        if let Some(p) = data.players.get_mut(uuid.as_str()) {
            p.finish_position = rank;
            taken.insert(rank);
        }
    }

    let mut next_free = 1u32;
    for player in data.players.values_mut() {
        if player.finish_position != 0 {
            continue;
        }
        while taken.contains(&next_free) {
            next_free += 1;
        }
        player.finish_position = next_free;
        taken.insert(next_free);
        diags.push(
            Diagnostic::new(
                Severity::Warning,
                DiagnosticKind::Ranking,
                format!(
                    "'{}' has no elimination record; assigned position {}",
                    player.nickname, next_free
                ),
            )
            .with_player(player.uuid.clone()),
        );
    }

    check_permutation(data, diags);

    let mut ordered: Vec<(&u32, &String)> = data
        .players
        .values()
        .map(|p| (&p.finish_position, &p.uuid))
        .collect();
    ordered.sort();
    let ordered: Vec<String> = ordered.into_iter().map(|(_, u)| u.clone()).collect();

    let warnings = diags
        .iter()
        .skip(before)
        .filter(|d| d.kind == DiagnosticKind::Ranking && d.severity == Severity::Warning)
        .count();
    log::debug!(
        "ranked {} players, winner {:?}, {} warning(s)",
        ordered.len(),
        winner,
        warnings
    );
    RankingSummary {
        winner,
        ordered,
        warnings,
    }
}

/// First winner line in the history whose name matches a player.
fn declared_winner(data: &TournamentData, diags: &mut Diagnostics) -> Option<String> {
    let mut found: Option<String> = None;
    for event in &data.game_history {
        if event.category != HistoryCategory::WinnerDeclaration {
            continue;
        }
        let Some(name) = winner_name(&event.text) else {
            continue;
        };
        match data.find_by_nickname(name) {
            Some(uuid) => match &found {
                None => found = Some(uuid.to_string()),
                Some(first) if first != uuid => diags.warn(
                    DiagnosticKind::Ranking,
                    format!("conflicting winner line '{}' ignored", event.text),
                ),
                Some(_) => {}
            },
            None => diags.warn(
                DiagnosticKind::Ranking,
                format!("winner '{}' matches no player", name),
            ),
        }
    }
    found
}

/// The only player with no elimination record of any kind, if there is
/// exactly one.
fn infer_winner(
    data: &TournamentData,
    latest: &BTreeMap<String, i64>,
    diags: &mut Diagnostics,
) -> Option<String> {
    let candidates: Vec<&str> = data
        .players
        .values()
        .filter(|p| !latest.contains_key(&p.uuid) && p.latest_bust_out().is_none())
        .map(|p| p.uuid.as_str())
        .collect();
    match candidates.as_slice() {
        [only] => {
            diags.push(
                Diagnostic::new(
                    Severity::Info,
                    DiagnosticKind::Ranking,
                    "no winner line; winner inferred as the only player never eliminated",
                )
                .with_player(*only),
            );
            Some(only.to_string())
        }
        _ if data.players.is_empty() => None,
        _ => {
            diags.warn(
                DiagnosticKind::Ranking,
                format!(
                    "winner unresolved: no winner line and {} players without elimination record",
                    candidates.len()
                ),
            );
            None
        }
    }
}

/// Finish positions must be exactly `{1, ..., N}`.
fn check_permutation(data: &TournamentData, diags: &mut Diagnostics) {
    let n = data.players.len() as u32;
    let positions: BTreeSet<u32> = data.players.values().map(|p| p.finish_position).collect();
    let expected: BTreeSet<u32> = (1..=n).collect();
    if positions != expected {
        diags.push(
            Diagnostic::new(
                Severity::Warning,
                DiagnosticKind::Ranking,
                format!("finish positions are not a permutation of 1..={}", n),
            )
            .with_details(serde_json::json!({
                "positions": data
                    .players
                    .values()
                    .map(|p| (p.uuid.clone(), p.finish_position))
                    .collect::<BTreeMap<_, _>>(),
            })),
        );
    }
}

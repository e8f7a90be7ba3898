//! Points pass: evaluate the resolved formula for every player.
//!
//! A player whose evaluation fails gets `max(1, n - r + 1)` instead, and
//! the failure is recorded with the formula source, the expanded formula
//! text and the variables it ran against.

use rust_decimal::Decimal;
use serde::Serialize;

use tdt_core::{Diagnostic, DiagnosticKind, Diagnostics, Severity, TournamentData};

use crate::evaluate;
use crate::resolve::{FormulaSource, ResolvedFormula};
use crate::variables::player_variables;

#[derive(Debug, Clone, Serialize)]
pub struct PointsSummary {
    pub source: FormulaSource,
    /// Dependencies and formula as evaluated.
    pub formula: String,
    pub evaluated: usize,
    pub fallbacks: usize,
}

/// Rank-based points used when a formula fails.
pub fn fallback_points(n: usize, finish_position: u32) -> i64 {
    (n as i64 - i64::from(finish_position) + 1).max(1)
}

fn to_points(v: f64) -> Decimal {
    Decimal::from_f64_retain(v)
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

pub fn apply_points(
    data: &mut TournamentData,
    resolved: &ResolvedFormula,
    diags: &mut Diagnostics,
) -> PointsSummary {
    let expanded = resolved.expanded();
    let n = data.players.len();
    let mut evaluated = 0;
    let mut fallbacks = 0;

    let mut scored: Vec<(String, Decimal)> = Vec::with_capacity(n);
    for player in data.players.values() {
        let vars = player_variables(data, player);
        match evaluate(&resolved.formula, &resolved.dependencies, &vars) {
            Ok(v) => {
                evaluated += 1;
                scored.push((player.uuid.clone(), to_points(v)));
            }
            Err(e) => {
                fallbacks += 1;
                let points = fallback_points(n, player.finish_position);
                log::warn!(
                    "formula ({}) failed for '{}': {}; using rank fallback {}",
                    resolved.source,
                    player.nickname,
                    e,
                    points
                );
                diags.push(
                    Diagnostic::new(
                        Severity::Warning,
                        DiagnosticKind::Formula,
                        format!("formula failed ({}); rank fallback applied", e),
                    )
                    .with_player(player.uuid.clone())
                    .with_details(serde_json::json!({
                        "source": resolved.source.to_string(),
                        "formula": expanded,
                        "error": e,
                        "variables": vars,
                        "fallback_points": points,
                    })),
                );
                scored.push((player.uuid.clone(), Decimal::from(points)));
            }
        }
    }
    for (uuid, points) in scored {
        if let Some(p) = data.players.get_mut(&uuid) {
            p.points = points;
        }
    }

    log::debug!(
        "points from {}: {} evaluated, {} fallbacks",
        resolved.source,
        evaluated,
        fallbacks
    );
    PointsSummary {
        source: resolved.source.clone(),
        formula: expanded,
        evaluated,
        fallbacks,
    }
}

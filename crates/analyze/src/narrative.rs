//! Elimination narratives from the game history, resolved to player UUIDs.
//!
//! Both the ranking engine and hit reconciliation read the same history
//! lines; this module does the text parsing and nickname lookup once.

use tdt_core::history::parse_bust_out;
use tdt_core::{HistoryCategory, TournamentData};

/// A bust-out line whose victim matched a player.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElimination {
    pub timestamp: i64,
    pub text: String,
    pub victim: String,
    /// Eliminator UUIDs in narrative order. Empty for a bare bust-out.
    pub eliminators: Vec<String>,
    /// Eliminator names that matched no player.
    pub unknown_eliminators: Vec<String>,
}

/// A bust-out line whose victim name matched no player.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedVictim {
    pub timestamp: i64,
    pub name: String,
    pub eliminator_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeLog {
    pub resolved: Vec<ResolvedElimination>,
    pub unresolved: Vec<UnresolvedVictim>,
}

impl NarrativeLog {
    /// True when at least one line names an eliminator.
    pub fn has_eliminations(&self) -> bool {
        self.resolved
            .iter()
            .any(|e| !e.eliminators.is_empty() || !e.unknown_eliminators.is_empty())
            || self.unresolved.iter().any(|u| u.eliminator_count > 0)
    }
}

/// Collect elimination and bare bust-out lines in history order.
pub fn extract(data: &TournamentData) -> NarrativeLog {
    let mut log = NarrativeLog::default();
    for event in &data.game_history {
        if !matches!(
            event.category,
            HistoryCategory::Elimination | HistoryCategory::BustOut
        ) {
            continue;
        }
        let Some(narrative) = parse_bust_out(&event.text) else {
            continue;
        };
        let Some(victim) = data.find_by_nickname(&narrative.victim) else {
            log.unresolved.push(UnresolvedVictim {
                timestamp: event.timestamp,
                name: narrative.victim,
                eliminator_count: narrative.eliminators.len(),
            });
            continue;
        };
        let mut eliminators = Vec::new();
        let mut unknown_eliminators = Vec::new();
        for name in narrative.eliminators {
            match data.find_by_nickname(&name) {
                Some(uuid) => eliminators.push(uuid.to_string()),
                None => unknown_eliminators.push(name),
            }
        }
        log.resolved.push(ResolvedElimination {
            timestamp: event.timestamp,
            text: event.text.clone(),
            victim: victim.to_string(),
            eliminators,
            unknown_eliminators,
        });
    }
    log
}

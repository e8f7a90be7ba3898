//! Prize validator: compares prize recipients with computed finish
//! positions. Read-only; findings go to the diagnostics list.

use serde::Serialize;

use tdt_core::{Diagnostic, DiagnosticKind, Diagnostics, Severity, TournamentData};

/// A prize recipient whose finish position differs from the prize position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrizeDiscrepancy {
    pub player: String,
    /// `None` when the recipient UUID matches no player.
    pub finish_position: Option<u32>,
    pub prize_position: i64,
    pub prize_description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrizeValidation {
    /// First unpaid position: highest prize position + 1.
    pub bubble_position: i64,
    pub discrepancies: Vec<PrizeDiscrepancy>,
    /// Recipient checks that matched.
    pub validated_count: usize,
}

pub fn validate(data: &TournamentData, diags: &mut Diagnostics) -> PrizeValidation {
    let bubble_position = data.prizes.iter().map(|p| p.position).max().unwrap_or(0) + 1;
    let mut discrepancies = Vec::new();
    let mut validated_count = 0;

    for prize in data.prizes.iter().filter(|p| p.position > 0) {
        for uuid in &prize.awarded_to {
            let finish = data.players.get(uuid).map(|p| p.finish_position);
            if finish.map(i64::from) == Some(prize.position) {
                validated_count += 1;
                continue;
            }
            let message = match finish {
                Some(f) => format!(
                    "prize '{}' (position {}) awarded to a player who finished {}",
                    prize.description, prize.position, f
                ),
                None => format!(
                    "prize '{}' (position {}) awarded to unknown player",
                    prize.description, prize.position
                ),
            };
            diags.push(
                Diagnostic::new(Severity::Warning, DiagnosticKind::Prize, message)
                    .with_player(uuid.clone()),
            );
            discrepancies.push(PrizeDiscrepancy {
                player: uuid.clone(),
                finish_position: finish,
                prize_position: prize.position,
                prize_description: prize.description.clone(),
            });
        }
    }

    log::debug!(
        "prize check: bubble {}, {} matched, {} discrepancies",
        bubble_position,
        validated_count,
        discrepancies.len()
    );
    PrizeValidation {
        bubble_position,
        discrepancies,
        validated_count,
    }
}

//! tdt-analyze: post-mapping passes over a tournament record.
//!
//! Takes the [`TournamentData`] produced by `tdt-core` and fills in what the
//! file only implies: finish positions, hit counts, winnings, and a check of
//! prize recipients against the computed standings. Each pass is a separate
//! module; [`reconcile()`] runs them in dependency order.

pub mod hits;
pub mod narrative;
pub mod prizes;
pub mod ranking;
pub mod report;
pub mod winnings;

pub use hits::{compute_hits, HitCountingMode, HitSummary, TIMESTAMP_TOLERANCE_MS};
pub use prizes::{validate, PrizeDiscrepancy, PrizeValidation};
pub use ranking::{compute_rankings, RankingSummary};
pub use report::ReconcileReport;
pub use winnings::assign_winnings;

use tdt_core::{Diagnostics, TournamentData};

/// Rank players, reconcile hits, assign winnings and validate prizes.
///
/// Never fails: every irregularity lands in `diags`.
pub fn reconcile(
    data: &mut TournamentData,
    hit_mode: HitCountingMode,
    diags: &mut Diagnostics,
) -> ReconcileReport {
    let ranking = compute_rankings(data, diags);
    let hits = compute_hits(data, hit_mode, diags);
    assign_winnings(data);
    let prizes = validate(data, diags);

    ReconcileReport {
        ranking,
        hits,
        prizes,
        passes_run: vec![
            "ranking".to_string(),
            "hits".to_string(),
            "winnings".to_string(),
            "prizes".to_string(),
        ],
    }
}

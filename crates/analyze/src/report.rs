//! ReconcileReport: aggregated output of the post-mapping passes.

use serde::Serialize;

use crate::hits::HitSummary;
use crate::prizes::PrizeValidation;
use crate::ranking::RankingSummary;

/// Results of ranking, hit reconciliation and prize validation for one
/// tournament.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub ranking: RankingSummary,
    pub hits: HitSummary,
    pub prizes: PrizeValidation,
    /// Pass names in execution order.
    pub passes_run: Vec<String>,
}

impl ReconcileReport {
    /// True when the ranking warned or any prize recipient disagrees with
    /// the computed standings.
    pub fn needs_review(&self) -> bool {
        self.ranking.warnings > 0 || !self.prizes.discrepancies.is_empty()
    }
}

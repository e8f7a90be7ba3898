//! Elimination / hit reconciliation.
//!
//! The history text is the primary source of eliminations but it is noisy.
//! Each narrative credit is checked against the structured bust-out records
//! (the victim's buy-in must list the eliminator as hitman, within
//! [`TIMESTAMP_TOLERANCE_MS`]); credits that fail the check are rejected and
//! never count.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use tdt_core::{
    BustOutRecord, Diagnostic, DiagnosticKind, Diagnostics, EliminationCredit, EliminationDetails,
    EmbeddedHitMode, Severity, TournamentData,
};

use crate::narrative;

/// Maximum distance between a narrative line and its bust-out record.
pub const TIMESTAMP_TOLERANCE_MS: i64 = 1000;

/// How validated eliminations turn into hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitCountingMode {
    /// Every validated elimination is a hit, repeats included.
    FullCredit,
    /// One hit per distinct victim per eliminator.
    UniqueVictims,
    /// Use the file's `Config` block, else `FullCredit`.
    #[default]
    Auto,
}

impl HitCountingMode {
    /// Resolve `Auto` against the mode embedded in the file.
    pub fn resolve(self, embedded: Option<EmbeddedHitMode>) -> HitCountingMode {
        match (self, embedded) {
            (HitCountingMode::Auto, Some(EmbeddedHitMode::FullCredit)) => {
                HitCountingMode::FullCredit
            }
            (HitCountingMode::Auto, Some(EmbeddedHitMode::UniqueVictims)) => {
                HitCountingMode::UniqueVictims
            }
            (HitCountingMode::Auto, None) => HitCountingMode::FullCredit,
            (explicit, _) => explicit,
        }
    }
}

impl fmt::Display for HitCountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HitCountingMode::FullCredit => "full_credit",
            HitCountingMode::UniqueVictims => "unique_victims",
            HitCountingMode::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl FromStr for HitCountingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_credit" => Ok(HitCountingMode::FullCredit),
            "unique_victims" => Ok(HitCountingMode::UniqueVictims),
            "auto" => Ok(HitCountingMode::Auto),
            other => Err(format!(
                "unknown hit counting mode '{}' (expected full_credit, unique_victims or auto)",
                other
            )),
        }
    }
}

/// Outcome of [`compute_hits`].
#[derive(Debug, Clone, Serialize)]
pub struct HitSummary {
    /// The mode actually applied; never `Auto`.
    pub mode: HitCountingMode,
    /// Credits confirmed by a bust-out record.
    pub validated: usize,
    /// Narrative credits with no matching bust-out record.
    pub rejected: usize,
    /// Validated repeats not counted under `UniqueVictims`.
    pub skipped_repeats: usize,
}

/// Recompute `hits`, `eliminations` and `elimination_details` for every
/// player.
pub fn compute_hits(
    data: &mut TournamentData,
    setting: HitCountingMode,
    diags: &mut Diagnostics,
) -> HitSummary {
    let mode = setting.resolve(data.config.hit_mode);
    for player in data.players.values_mut() {
        player.hits = 0;
        player.eliminations.clear();
        player.elimination_details = None;
    }

    let records = data.bustout_records();
    let narratives = narrative::extract(data);
    let mut ledger = Ledger::new(mode);

    if !narratives.has_eliminations() && !records.is_empty() {
        diags.info(
            DiagnosticKind::Elimination,
            "history has no elimination lines; hits taken from bust-out records",
        );
        for r in &records {
            for hitman in &r.hitmen {
                if data.players.contains_key(hitman) {
                    ledger.validated += 1;
                    ledger.credit(hitman, &r.victim_uuid, r.time, "", diags);
                } else {
                    diags.push(
                        Diagnostic::new(
                            Severity::Warning,
                            DiagnosticKind::Elimination,
                            format!("bust-out record names unknown hitman '{}'", hitman),
                        )
                        .with_player(r.victim_uuid.clone()),
                    );
                }
            }
        }
    } else {
        for u in narratives.unresolved.iter().filter(|u| u.eliminator_count > 0) {
            ledger.rejected += u.eliminator_count;
            diags.warn(
                DiagnosticKind::Elimination,
                format!(
                    "elimination of unknown player '{}' at {} rejected",
                    u.name, u.timestamp
                ),
            );
        }
        let mut claims = RecordClaims::new(&records);
        for e in &narratives.resolved {
            for name in &e.unknown_eliminators {
                ledger.rejected += 1;
                diags.push(
                    Diagnostic::new(
                        Severity::Warning,
                        DiagnosticKind::Elimination,
                        format!("eliminator '{}' matches no player; credit rejected", name),
                    )
                    .with_player(e.victim.clone()),
                );
            }
            for eliminator in &e.eliminators {
                if claims.claim(&e.victim, eliminator, e.timestamp) {
                    ledger.validated += 1;
                    ledger.credit(eliminator, &e.victim, e.timestamp, &e.text, diags);
                } else {
                    ledger.rejected += 1;
                    diags.push(
                        Diagnostic::new(
                            Severity::Warning,
                            DiagnosticKind::Elimination,
                            "narrative elimination has no matching bust-out record; rejected",
                        )
                        .with_player(e.victim.clone())
                        .with_details(serde_json::json!({
                            "eliminator": eliminator,
                            "timestamp": e.timestamp,
                            "text": e.text,
                        })),
                    );
                }
            }
        }
    }

    let summary = HitSummary {
        mode,
        validated: ledger.validated,
        rejected: ledger.rejected,
        skipped_repeats: ledger.skipped_repeats,
    };
    ledger.apply(data);
    log::debug!(
        "hits ({}): {} validated, {} rejected, {} repeats skipped",
        mode,
        summary.validated,
        summary.rejected,
        summary.skipped_repeats
    );
    summary
}

/// Bust-out records and the (record, hitman) pairs already used to confirm
/// a narrative line. Each pair confirms at most one line.
struct RecordClaims<'a> {
    records: &'a [BustOutRecord],
    used: BTreeSet<(usize, String)>,
}

impl<'a> RecordClaims<'a> {
    fn new(records: &'a [BustOutRecord]) -> Self {
        RecordClaims {
            records,
            used: BTreeSet::new(),
        }
    }

    /// Claim the nearest unused record of `victim` naming `eliminator`
    /// within tolerance of `timestamp`. False when none is left.
    fn claim(&mut self, victim: &str, eliminator: &str, timestamp: i64) -> bool {
        let nearest = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, r)| {
                r.victim_uuid == victim
                    && r.hitmen.iter().any(|h| h == eliminator)
                    && (r.time - timestamp).abs() <= TIMESTAMP_TOLERANCE_MS
                    && !self.used.contains(&(*i, eliminator.to_string()))
            })
            .min_by_key(|(_, r)| (r.time - timestamp).abs())
            .map(|(i, _)| i);
        match nearest {
            Some(i) => self.used.insert((i, eliminator.to_string())),
            None => false,
        }
    }
}

/// Credits accumulated before they are written back to the players.
struct Ledger {
    mode: HitCountingMode,
    credits: BTreeMap<String, Vec<EliminationCredit>>,
    seen: BTreeSet<(String, String)>,
    details: BTreeMap<String, EliminationDetails>,
    validated: usize,
    rejected: usize,
    skipped_repeats: usize,
}

impl Ledger {
    fn new(mode: HitCountingMode) -> Self {
        Ledger {
            mode,
            credits: BTreeMap::new(),
            seen: BTreeSet::new(),
            details: BTreeMap::new(),
            validated: 0,
            rejected: 0,
            skipped_repeats: 0,
        }
    }

    fn credit(
        &mut self,
        eliminator: &str,
        victim: &str,
        timestamp: i64,
        text: &str,
        diags: &mut Diagnostics,
    ) {
        // Latest validated elimination wins; first co-eliminator of that event
        let newer = self
            .details
            .get(victim)
            .map_or(true, |d| timestamp > d.timestamp);
        if newer {
            self.details.insert(
                victim.to_string(),
                EliminationDetails {
                    eliminated_by_uuid: eliminator.to_string(),
                    timestamp,
                    text: text.to_string(),
                },
            );
        }

        let first = self.seen.insert((eliminator.to_string(), victim.to_string()));
        if !first && self.mode == HitCountingMode::UniqueVictims {
            self.skipped_repeats += 1;
            diags.push(
                Diagnostic::new(
                    Severity::Info,
                    DiagnosticKind::Elimination,
                    format!("repeat elimination of '{}' not counted", victim),
                )
                .with_player(eliminator.to_string()),
            );
            return;
        }
        self.credits
            .entry(eliminator.to_string())
            .or_default()
            .push(EliminationCredit {
                eliminated_uuid: victim.to_string(),
                timestamp,
            });
    }

    fn apply(self, data: &mut TournamentData) {
        for (uuid, credits) in self.credits {
            if let Some(p) = data.players.get_mut(&uuid) {
                p.hits = credits.len() as u32;
                p.eliminations = credits;
            }
        }
        for (uuid, details) in self.details {
            if let Some(p) = data.players.get_mut(&uuid) {
                p.elimination_details = Some(details);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdt_core::{Buyin, HistoryEvent, PlayerResult};

    fn event(ts: i64, text: &str) -> HistoryEvent {
        HistoryEvent {
            timestamp: ts,
            text: text.to_string(),
            source: 1,
            category: tdt_core::history::categorize(text),
        }
    }

    fn busted(time: i64, hitmen: &[&str]) -> Buyin {
        Buyin {
            amount: 10,
            bust_out_time: Some(time),
            eliminated_by: Some(hitmen.iter().map(|h| h.to_string()).collect()),
            ..Default::default()
        }
    }

    /// A eliminates B twice (B rebuys once).
    fn repeat_victim() -> TournamentData {
        let mut data = TournamentData::default();
        let mut a = PlayerResult::new("a", "Ann");
        a.buyins.push(Buyin::default());
        let mut b = PlayerResult::new("b", "Ben");
        b.buyins.push(busted(1_000, &["a"]));
        b.buyins.push(busted(5_000, &["a"]));
        data.players.insert("a".into(), a);
        data.players.insert("b".into(), b);
        data.game_history = vec![
            event(1_200, "Ben busted out of the tournament (Table 1, Seat 2) by Ann (Table 1, Seat 1)"),
            event(5_000, "Ben busted out of the tournament (Table 1, Seat 2) by Ann (Table 1, Seat 1)"),
        ];
        data
    }

    #[test]
    fn full_credit_counts_repeats() {
        let mut data = repeat_victim();
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(data.players["a"].hits, 2);
        assert_eq!(summary.validated, 2);
        assert_eq!(summary.skipped_repeats, 0);
        let details = data.players["b"].elimination_details.as_ref().unwrap();
        assert_eq!(details.timestamp, 5_000);
        assert_eq!(details.eliminated_by_uuid, "a");
    }

    #[test]
    fn unique_victims_counts_once() {
        let mut data = repeat_victim();
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::UniqueVictims, &mut diags);
        assert_eq!(data.players["a"].hits, 1);
        assert_eq!(summary.skipped_repeats, 1);
        assert_eq!(diags.count(DiagnosticKind::Elimination), 1);
    }

    #[test]
    fn auto_follows_file_config() {
        let mut data = repeat_victim();
        data.config.hit_mode = Some(EmbeddedHitMode::UniqueVictims);
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::Auto, &mut diags);
        assert_eq!(summary.mode, HitCountingMode::UniqueVictims);
        assert_eq!(data.players["a"].hits, 1);

        // explicit setting beats the file
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.mode, HitCountingMode::FullCredit);
        assert_eq!(data.players["a"].hits, 2);
    }

    #[test]
    fn outside_tolerance_is_rejected() {
        let mut data = repeat_victim();
        data.game_history[0].timestamp = 2_001;
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.rejected, 1);
        assert_eq!(data.players["a"].hits, 1);
    }

    #[test]
    fn duplicate_line_uses_one_record() {
        let mut data = repeat_victim();
        data.players.get_mut("b").unwrap().buyins.truncate(1);
        data.game_history[0].timestamp = 1_000;
        data.game_history[1] = event(
            1_400,
            "Ben busted out of the tournament (Table 1, Seat 2) by Ann (Table 1, Seat 1)",
        );
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.validated, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(data.players["a"].hits, 1);
        let details = data.players["b"].elimination_details.as_ref().unwrap();
        assert_eq!(details.timestamp, 1_000);
    }

    #[test]
    fn nearest_unused_record_is_claimed() {
        // records at 1000 and 1800; the line at 1700 must not take 1000 and
        // starve the line at 900
        let mut data = repeat_victim();
        data.players.get_mut("b").unwrap().buyins[1] = busted(1_800, &["a"]);
        data.game_history[0].timestamp = 1_700;
        data.game_history[1].timestamp = 900;
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.validated, 2);
        assert_eq!(summary.rejected, 0);
        assert_eq!(data.players["a"].hits, 2);
    }

    #[test]
    fn shared_pot_credits_every_co_eliminator() {
        let mut data = TournamentData::default();
        for (uuid, nick) in [("a", "Ann"), ("c", "Cy")] {
            let mut p = PlayerResult::new(uuid, nick);
            p.buyins.push(Buyin::default());
            data.players.insert(uuid.into(), p);
        }
        let mut b = PlayerResult::new("b", "Ben");
        b.buyins.push(busted(900, &["a", "c"]));
        data.players.insert("b".into(), b);
        data.game_history = vec![event(
            1_000,
            "Ben busted out of the tournament (Table 1, Seat 2) by Ann (Table 1, Seat 1), Cy (Table 1, Seat 3)",
        )];

        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.validated, 2);
        assert_eq!(data.players["a"].hits, 1);
        assert_eq!(data.players["c"].hits, 1);
        assert_eq!(
            data.players["b"]
                .elimination_details
                .as_ref()
                .map(|d| d.eliminated_by_uuid.as_str()),
            Some("a")
        );
    }

    #[test]
    fn structured_records_used_without_narrative() {
        let mut data = repeat_victim();
        data.game_history.clear();
        let mut diags = Diagnostics::new();
        let summary = compute_hits(&mut data, HitCountingMode::FullCredit, &mut diags);
        assert_eq!(summary.validated, 2);
        assert_eq!(data.players["a"].hits, 2);
        assert_eq!(data.players["a"].eliminations[0].timestamp, 1_000);
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("full-credit".parse::<HitCountingMode>(), Ok(HitCountingMode::FullCredit));
        assert_eq!("UNIQUE_VICTIMS".parse::<HitCountingMode>(), Ok(HitCountingMode::UniqueVictims));
        assert_eq!("auto".parse::<HitCountingMode>(), Ok(HitCountingMode::Auto));
        assert!("sometimes".parse::<HitCountingMode>().is_err());
        assert_eq!(HitCountingMode::UniqueVictims.to_string(), "unique_victims");
    }
}

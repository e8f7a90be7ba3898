//! Typed tournament record produced by the domain mapper and enriched by the
//! ranking, reconciliation and points passes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ──────────────────────────────────────────────
// Tournament
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct TournamentData {
    pub metadata: Metadata,
    pub financial: Financial,
    /// Keyed by player UUID.
    pub players: BTreeMap<String, PlayerResult>,
    /// Sorted by timestamp ascending.
    pub game_history: Vec<HistoryEvent>,
    pub structure: Structure,
    pub prizes: Vec<Prize>,
    pub config: FileConfig,
}

impl TournamentData {
    /// Case-insensitive exact nickname lookup.
    pub fn find_by_nickname(&self, name: &str) -> Option<&str> {
        let needle = name.trim();
        self.players
            .values()
            .find(|p| p.nickname.eq_ignore_ascii_case(needle))
            .map(|p| p.uuid.as_str())
    }

    pub fn nickname_of(&self, uuid: &str) -> Option<&str> {
        self.players.get(uuid).map(|p| p.nickname.as_str())
    }

    /// All structured bust-out records, one per busted buy-in, ordered by time.
    pub fn bustout_records(&self) -> Vec<BustOutRecord> {
        let mut records: Vec<BustOutRecord> = self
            .players
            .values()
            .flat_map(|p| {
                p.buyins.iter().filter_map(move |b| {
                    b.bust_out_time.map(|time| BustOutRecord {
                        victim_uuid: p.uuid.clone(),
                        time,
                        round: b.bust_out_round,
                        hitmen: b.eliminated_by.clone().unwrap_or_default(),
                    })
                })
            })
            .collect();
        records.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.victim_uuid.cmp(&b.victim_uuid)));
        records
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub version: String,
    pub uuid: String,
    pub league_uuid: String,
    pub league_name: String,
    pub season_uuid: String,
    pub season_name: String,
    pub title: String,
    pub description: String,
    /// Milliseconds since the epoch; 0 when absent.
    pub start_time: i64,
    /// Formula embedded in the file (`PointsForPlaying`), if any.
    pub points_formula: Option<String>,
}

// ──────────────────────────────────────────────
// Financial
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeProfile {
    pub name: String,
    pub fee: Decimal,
    pub chips: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Financial {
    pub fee_profiles: BTreeMap<String, FeeProfile>,
    /// Default buy-in amount; used for unknown fee profiles.
    pub buy_in: Decimal,
    pub total_buyins_amount: Decimal,
    pub total_rebuys_amount: Decimal,
    pub total_addons_amount: Decimal,
    pub prize_pool: Decimal,
}

impl Financial {
    /// Dollar amount for a payment made under `profile`.
    ///
    /// An unknown (or empty) profile name resolves to the tournament's
    /// default buy-in, never to zero.
    pub fn fee_for(&self, profile: &str) -> Decimal {
        self.fee_profiles
            .get(profile)
            .map(|p| p.fee)
            .unwrap_or(self.buy_in)
    }
}

// ──────────────────────────────────────────────
// Players
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Buyin {
    pub amount: i64,
    pub chips: i64,
    pub profile: String,
    pub bust_out_time: Option<i64>,
    pub bust_out_round: Option<i64>,
    pub eliminated_by: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddOn {
    pub amount: i64,
    pub chips: i64,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationDetails {
    pub eliminated_by_uuid: String,
    pub timestamp: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationCredit {
    pub eliminated_uuid: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerResult {
    pub uuid: String,
    pub nickname: String,
    pub buyins: Vec<Buyin>,
    pub addons: Vec<AddOn>,
    pub hits: u32,
    /// 1-based; 0 until the ranking engine assigns it.
    pub finish_position: u32,
    pub winnings: Decimal,
    pub points: Decimal,
    pub total_invested: Decimal,
    pub elimination_details: Option<EliminationDetails>,
    pub eliminations: Vec<EliminationCredit>,
}

impl PlayerResult {
    pub fn new(uuid: impl Into<String>, nickname: impl Into<String>) -> Self {
        PlayerResult {
            uuid: uuid.into(),
            nickname: nickname.into(),
            ..Default::default()
        }
    }

    pub fn rebuy_count(&self) -> usize {
        self.buyins.len().saturating_sub(1)
    }

    /// Latest structured bust-out time across all buy-ins.
    pub fn latest_bust_out(&self) -> Option<i64> {
        self.buyins.iter().filter_map(|b| b.bust_out_time).max()
    }

    /// True when the last buy-in has not busted.
    pub fn still_in(&self) -> bool {
        self.buyins
            .last()
            .map(|b| b.bust_out_time.is_none())
            .unwrap_or(true)
    }
}

/// One structured bust-out, flattened out of a player's buy-ins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BustOutRecord {
    pub victim_uuid: String,
    pub time: i64,
    pub round: Option<i64>,
    pub hitmen: Vec<String>,
}

// ──────────────────────────────────────────────
// History
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryCategory {
    WinnerDeclaration,
    Elimination,
    BustOut,
    Rebuy,
    Addon,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEvent {
    pub timestamp: i64,
    pub text: String,
    pub source: i64,
    pub category: HistoryCategory,
}

// ──────────────────────────────────────────────
// Structure and prizes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Level {
    pub small_blind: i64,
    pub big_blind: i64,
    pub ante: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Structure {
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prize {
    pub description: String,
    pub position: i64,
    pub amount_type: i64,
    pub amount_percent: i64,
    pub calculated_amount: Decimal,
    pub awarded_to: Vec<String>,
}

// ──────────────────────────────────────────────
// Embedded configuration
// ──────────────────────────────────────────────

/// Hit counting policy named in the file's `Config` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedHitMode {
    FullCredit,
    UniqueVictims,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileConfig {
    pub hit_mode: Option<EmbeddedHitMode>,
}

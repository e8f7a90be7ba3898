//! Game-history text handling: category classification and extraction of
//! names from winner and elimination narratives.
//!
//! Narratives look like
//! `"Bob busted out of the tournament (Table 1, Seat 3) by Alice (Table 1, Seat 5)"`,
//! with additional `, Name (Table T, Seat S)` groups for shared pots, and
//! `"Alice won the tournament"`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::HistoryCategory;

static WINNER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+won the tournament").expect("valid winner regex")
});

static BUSTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(.+?)\s+busted out\b(.*)$").expect("valid bust-out regex")
});

static BY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\sby\s").expect("valid by regex"));

static SEATED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*([^,()]+?)\s*\(\s*Table[^)]*\)").expect("valid seated-name regex")
});

/// Classify a history line. Checks run in a fixed order so that
/// "busted out ... by ..." is never mistaken for a bare bust-out.
pub fn categorize(text: &str) -> HistoryCategory {
    let lower = text.to_lowercase();
    if lower.contains("won the tournament") {
        HistoryCategory::WinnerDeclaration
    } else if lower.contains("busted out") && BY_RE.is_match(&lower) {
        HistoryCategory::Elimination
    } else if lower.contains("busted out") {
        HistoryCategory::BustOut
    } else if lower.contains("rebuys") {
        HistoryCategory::Rebuy
    } else if lower.contains("addon") {
        HistoryCategory::Addon
    } else {
        HistoryCategory::General
    }
}

/// Name in `"<Name> won the tournament"`.
pub fn winner_name(text: &str) -> Option<&str> {
    WINNER_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Victim and eliminator names pulled out of a bust-out narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub victim: String,
    /// Empty for a bare bust-out.
    pub eliminators: Vec<String>,
}

/// Parse `"<Victim> busted out ... [by <E1> (Table, Seat)[, <E2> (...)]*]"`.
pub fn parse_bust_out(text: &str) -> Option<Narrative> {
    let caps = BUSTED_RE.captures(text)?;
    let victim = caps.get(1)?.as_str().trim().to_string();
    if victim.is_empty() {
        return None;
    }
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let eliminators = match BY_RE.find(rest) {
        Some(m) => split_eliminators(&rest[m.end()..]),
        None => Vec::new(),
    };
    Some(Narrative {
        victim,
        eliminators,
    })
}

/// Split the text after "by" into individual eliminator names.
fn split_eliminators(list: &str) -> Vec<String> {
    let seated: Vec<String> = SEATED_NAME_RE
        .captures_iter(list)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !seated.is_empty() {
        return seated;
    }
    // No seat annotations: plain comma / "and" separated names
    list.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|s| s.trim().trim_end_matches('.').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

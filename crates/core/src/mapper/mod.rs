//! Domain mapper: generic AST -> typed [`TournamentData`].
//!
//! The root must hold `T: new Tournament({...})`; everything else is
//! optional and degrades to empty values with a diagnostic where the data
//! looks malformed. Collections that exist in two historical encodings are
//! read through [`detect_list`], which picks the encoding up front instead of
//! branching inside each extractor.

mod financial;
mod history;
mod metadata;
mod players;
mod prizes;
mod structure;

use rust_decimal::Decimal;

use crate::ast::{get_scalar, Entries, Node};
use crate::constructor::{object_of, ConstructorKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::MappingError;
use crate::model::{EmbeddedHitMode, FileConfig, TournamentData};

pub use players::NameFormat;

/// Map a parsed document to tournament data.
pub fn map(root: &Node, diags: &mut Diagnostics) -> Result<TournamentData, MappingError> {
    let doc = root
        .as_object()
        .ok_or_else(|| MappingError::new(format!("root is {}, not an object", root.shape())))?;
    let t_node = doc
        .get("T")
        .ok_or_else(|| MappingError::new("missing 'T' key"))?;
    let tournament = object_of(t_node, ConstructorKind::Tournament).ok_or_else(|| {
        MappingError::new(format!(
            "'T' is {} but must be new Tournament({{...}})",
            describe(t_node)
        ))
    })?;

    let financial = financial::map_fee_config(tournament, diags);
    let players = players::map_players(tournament, &financial, diags);
    let mut data = TournamentData {
        metadata: metadata::map_metadata(doc, tournament),
        financial,
        players,
        game_history: history::map_history(tournament, diags),
        structure: structure::map_structure(tournament, diags),
        prizes: prizes::map_prizes(tournament, diags),
        config: map_file_config(tournament, diags),
    };
    financial::compute_totals(&mut data);

    log::debug!(
        "mapped tournament '{}': {} players, {} history events, {} prizes",
        data.metadata.title,
        data.players.len(),
        data.game_history.len(),
        data.prizes.len()
    );
    Ok(data)
}

fn describe(node: &Node) -> String {
    match node {
        Node::New { ctor, .. } => format!("new {}(...)", ctor),
        other => other.shape().to_string(),
    }
}

// ──────────────────────────────────────────────
// Collection format detection
// ──────────────────────────────────────────────

/// How a collection was encoded in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `new Wrapper({ Key: [...] })`
    Wrapped,
    /// A bare `[...]`, or `Map.from([...])`
    Direct,
}

/// Locate the item list of a collection that may be wrapped in a
/// constructor (`new GamePlayers({Players: [...]})`) or written directly as
/// an array. Returns `None` when the node has neither shape.
pub fn detect_list<'a>(
    node: &'a Node,
    wrapper: ConstructorKind,
    inner_key: &str,
) -> Option<(ListFormat, &'a [Node])> {
    if let Some(entries) = object_of(node, wrapper) {
        return entries
            .get(inner_key)
            .map(unwrap_call)
            .and_then(Node::as_array)
            .map(|items| (ListFormat::Wrapped, items));
    }
    unwrap_call(node)
        .as_array()
        .map(|items| (ListFormat::Direct, items))
}

/// `Map.from(x)` is transparent: yield `x`. Any other node is returned as is.
pub fn unwrap_call(node: &Node) -> &Node {
    match node {
        Node::Call { arg, .. } => arg,
        other => other,
    }
}

/// Entries of `new <kind>({...})`, or of a plain object literal.
pub(crate) fn record_of(node: &Node, kind: ConstructorKind) -> Option<&Entries> {
    object_of(node, kind).or_else(|| node.as_object())
}

// ──────────────────────────────────────────────
// Scalar helpers
// ──────────────────────────────────────────────

pub(crate) fn str_field(entries: &Entries, key: &str) -> String {
    get_scalar(entries, key)
        .map(|s| s.as_string())
        .unwrap_or_default()
}

pub(crate) fn opt_str(entries: &Entries, key: &str) -> Option<String> {
    get_scalar(entries, key)
        .map(|s| s.as_string())
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn int_field(entries: &Entries, key: &str) -> i64 {
    opt_int(entries, key).unwrap_or(0)
}

pub(crate) fn opt_int(entries: &Entries, key: &str) -> Option<i64> {
    get_scalar(entries, key).and_then(|s| s.as_i64())
}

pub(crate) fn decimal_field(entries: &Entries, key: &str) -> Decimal {
    get_scalar(entries, key)
        .and_then(|s| s.as_decimal())
        .unwrap_or(Decimal::ZERO)
}

/// A list of strings under `key`; a single string is treated as a
/// one-element list.
pub(crate) fn string_list(entries: &Entries, key: &str) -> Vec<String> {
    match entries.get(key) {
        Some(Node::Array { items }) => items
            .iter()
            .filter_map(Node::as_str)
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Node::String { value }) if !value.is_empty() => vec![value.clone()],
        _ => Vec::new(),
    }
}

// ──────────────────────────────────────────────
// Embedded configuration
// ──────────────────────────────────────────────

fn map_file_config(tournament: &Entries, diags: &mut Diagnostics) -> FileConfig {
    let Some(block) = tournament.get("Config") else {
        return FileConfig::default();
    };
    let entries = match block {
        Node::Object { entries } => entries,
        Node::New { arg, .. } => match arg.as_object() {
            Some(e) => e,
            None => return FileConfig::default(),
        },
        _ => return FileConfig::default(),
    };
    let hit_mode = opt_str(entries, "HitCounting").and_then(|raw| {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "full_credit" | "fullcredit" => Some(EmbeddedHitMode::FullCredit),
            "unique_victims" | "uniquevictims" => Some(EmbeddedHitMode::UniqueVictims),
            _ => {
                diags.warn(
                    DiagnosticKind::Config,
                    format!("unknown HitCounting value '{}' in file config", raw),
                );
                None
            }
        }
    });
    FileConfig { hit_mode }
}

use crate::ast::{Entries, Node};
use crate::constructor::ConstructorKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::history::categorize;
use crate::model::HistoryEvent;

use super::{int_field, record_of, str_field, unwrap_call};

/// Game history sorted by timestamp ascending (stable, so same-millisecond
/// events keep file order).
pub(super) fn map_history(t: &Entries, diags: &mut Diagnostics) -> Vec<HistoryEvent> {
    let Some(node) = t.get("GameHistory") else {
        return Vec::new();
    };
    let Some(items) = unwrap_call(node).as_array() else {
        diags.warn(
            DiagnosticKind::Mapping,
            format!("GameHistory is {}, expected a list", node.shape()),
        );
        return Vec::new();
    };

    let mut events: Vec<HistoryEvent> = items
        .iter()
        .filter_map(|item: &Node| record_of(item, ConstructorKind::GameHistoryItem))
        .map(|e| {
            let text = str_field(e, "Text");
            HistoryEvent {
                timestamp: int_field(e, "Time"),
                category: categorize(&text),
                text,
                source: int_field(e, "Source"),
            }
        })
        .collect();
    if events.len() != items.len() {
        diags.warn(
            DiagnosticKind::Mapping,
            format!(
                "skipped {} malformed history entries",
                items.len() - events.len()
            ),
        );
    }
    events.sort_by_key(|e| e.timestamp);
    events
}

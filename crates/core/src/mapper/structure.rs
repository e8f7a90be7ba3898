use crate::ast::Entries;
use crate::constructor::ConstructorKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{Level, Structure};

use super::{int_field, detect_list, record_of};

pub(super) fn map_structure(t: &Entries, diags: &mut Diagnostics) -> Structure {
    let Some(node) = t.get("Structure") else {
        return Structure::default();
    };
    let Some((_, items)) = detect_list(node, ConstructorKind::GameStructure, "Levels") else {
        diags.warn(
            DiagnosticKind::Mapping,
            format!("Structure is {}, expected GameStructure or a list", node.shape()),
        );
        return Structure::default();
    };
    let levels = items
        .iter()
        .filter_map(|n| record_of(n, ConstructorKind::GameLevel))
        .map(|e| Level {
            small_blind: int_field(e, "SmallBlind"),
            big_blind: int_field(e, "BigBlind"),
            ante: int_field(e, "Ante"),
            minutes: int_field(e, "Minutes"),
        })
        .collect();
    Structure { levels }
}

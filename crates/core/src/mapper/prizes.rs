use crate::ast::Entries;
use crate::constructor::ConstructorKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Prize;

use super::{decimal_field, int_field, detect_list, record_of, str_field, string_list};

pub(super) fn map_prizes(t: &Entries, diags: &mut Diagnostics) -> Vec<Prize> {
    let Some(node) = t.get("Prizes") else {
        return Vec::new();
    };
    let Some((_, items)) = detect_list(node, ConstructorKind::GamePrizes, "Prizes") else {
        diags.warn(
            DiagnosticKind::Mapping,
            format!("Prizes is {}, expected GamePrizes or a list", node.shape()),
        );
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|n| record_of(n, ConstructorKind::GamePrize))
        .map(|e| Prize {
            description: str_field(e, "Description"),
            position: int_field(e, "Position"),
            amount_type: int_field(e, "AmountType"),
            amount_percent: int_field(e, "AmountPercent"),
            calculated_amount: decimal_field(e, "CalculatedAmount"),
            awarded_to: string_list(e, "Recipients"),
        })
        .collect()
}

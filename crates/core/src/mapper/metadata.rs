use crate::ast::{get_scalar, Entries};
use crate::constructor::{object_of, ConstructorKind};
use crate::model::Metadata;

use super::{int_field, opt_str, str_field};

pub(super) fn map_metadata(doc: &Entries, t: &Entries) -> Metadata {
    let (league_uuid, league_name) = named_ref(t, "League", ConstructorKind::League);
    let (season_uuid, season_name) = named_ref(t, "Season", ConstructorKind::Season);
    Metadata {
        version: get_scalar(doc, "V")
            .map(|s| s.as_string())
            .unwrap_or_default(),
        uuid: str_field(t, "UUID"),
        league_uuid,
        league_name,
        season_uuid,
        season_name,
        title: str_field(t, "Title"),
        description: str_field(t, "Description"),
        start_time: int_field(t, "StartTime"),
        points_formula: opt_str(t, "PointsForPlaying"),
    }
}

/// `(uuid, name)` from `Key: new Kind({UUID, Name})`, falling back to the
/// flat `KeyUUID` / `KeyName` entries.
fn named_ref(t: &Entries, key: &str, kind: ConstructorKind) -> (String, String) {
    let nested = t.get(key).and_then(|n| object_of(n, kind));
    let uuid = nested
        .and_then(|e| opt_str(e, "UUID"))
        .or_else(|| opt_str(t, &format!("{}UUID", key)))
        .unwrap_or_default();
    let name = nested
        .and_then(|e| opt_str(e, "Name"))
        .or_else(|| opt_str(t, &format!("{}Name", key)))
        .unwrap_or_default();
    (uuid, name)
}

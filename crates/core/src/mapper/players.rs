use std::collections::BTreeMap;

use crate::ast::{Entries, Node};
use crate::constructor::{object_of, ConstructorKind};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::model::{AddOn, Buyin, Financial, PlayerResult};

use super::{int_field, opt_int, opt_str, detect_list, record_of, str_field, string_list, ListFormat};

/// Which era of player-name encoding supplied the nickname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFormat {
    /// `Name: new PlayerName({Nickname: "..."})`
    Modern,
    /// `Name: "..."`
    Legacy,
    /// `Nickname: "..."`
    LegacyAlias,
}

/// Resolve a player's nickname, trying modern, then legacy, then the legacy
/// alias; the first non-empty result wins.
pub fn player_name(p: &Entries) -> Option<(NameFormat, String)> {
    let modern = p
        .get("Name")
        .and_then(|n| object_of(n, ConstructorKind::PlayerName))
        .and_then(|e| opt_str(e, "Nickname"));
    if let Some(name) = modern {
        return Some((NameFormat::Modern, name.trim().to_string()));
    }
    if let Some(name) = p.get("Name").and_then(Node::as_str).filter(|s| !s.trim().is_empty()) {
        return Some((NameFormat::Legacy, name.trim().to_string()));
    }
    opt_str(p, "Nickname").map(|n| (NameFormat::LegacyAlias, n.trim().to_string()))
}

pub(super) fn map_players(
    t: &Entries,
    financial: &Financial,
    diags: &mut Diagnostics,
) -> BTreeMap<String, PlayerResult> {
    let mut players = BTreeMap::new();
    let Some(node) = t.get("Players") else {
        diags.warn(DiagnosticKind::Mapping, "tournament has no Players entry");
        return players;
    };
    let Some((format, items)) = detect_list(node, ConstructorKind::GamePlayers, "Players") else {
        diags.warn(
            DiagnosticKind::Mapping,
            format!("Players is {}, expected GamePlayers or a list", node.shape()),
        );
        return players;
    };
    if format == ListFormat::Direct {
        diags.info(DiagnosticKind::Mapping, "players stored in legacy direct-list format");
    }

    for item in items {
        let Some(entries) = object_of(item, ConstructorKind::GamePlayer) else {
            diags.warn(
                DiagnosticKind::Mapping,
                format!("skipping players entry of shape {}", item.shape()),
            );
            continue;
        };
        let Some(uuid) = opt_str(entries, "UUID") else {
            diags.warn(DiagnosticKind::Mapping, "skipping player without UUID");
            continue;
        };
        if players.contains_key(&uuid) {
            diags.push(
                Diagnostic::new(
                    Severity::Warning,
                    DiagnosticKind::Mapping,
                    "duplicate player UUID; keeping the first occurrence",
                )
                .with_player(uuid.clone()),
            );
            continue;
        }
        let nickname = match player_name(entries) {
            Some((_, name)) => name,
            None => {
                diags.push(
                    Diagnostic::new(Severity::Warning, DiagnosticKind::Mapping, "player has no name")
                        .with_player(uuid.clone()),
                );
                String::new()
            }
        };
        let mut player = PlayerResult::new(uuid.clone(), nickname);
        player.buyins = list_items(entries, "Buyins")
            .filter_map(|n| record_of(n, ConstructorKind::GameBuyin))
            .map(map_buyin)
            .collect();
        player.addons = list_items(entries, "AddOns")
            .filter_map(|n| record_of(n, ConstructorKind::GameAddOn))
            .map(|e| AddOn {
                amount: int_field(e, "Amount"),
                chips: int_field(e, "Chips"),
                profile: str_field(e, "Profile"),
            })
            .collect();
        for b in &player.buyins {
            if !b.profile.is_empty() && !financial.fee_profiles.contains_key(&b.profile) {
                diags.push(
                    Diagnostic::new(
                        Severity::Info,
                        DiagnosticKind::Mapping,
                        format!(
                            "unknown fee profile '{}'; using default buy-in {}",
                            b.profile, financial.buy_in
                        ),
                    )
                    .with_player(uuid.clone()),
                );
            }
        }
        players.insert(uuid, player);
    }
    players
}

fn list_items<'a>(entries: &'a Entries, key: &str) -> impl Iterator<Item = &'a Node> {
    entries
        .get(key)
        .and_then(Node::as_array)
        .unwrap_or(&[])
        .iter()
}

fn map_buyin(e: &Entries) -> Buyin {
    let bust = e
        .get("BustOut")
        .and_then(|n| record_of(n, ConstructorKind::GameBustOut));
    let hitmen = bust.map(|b| string_list(b, "HitmanUUID"));
    Buyin {
        amount: int_field(e, "Amount"),
        chips: int_field(e, "Chips"),
        profile: str_field(e, "Profile"),
        bust_out_time: bust.and_then(|b| opt_int(b, "Time")),
        bust_out_round: bust.and_then(|b| opt_int(b, "Round")),
        eliminated_by: hitmen.filter(|h| !h.is_empty()),
    }
}

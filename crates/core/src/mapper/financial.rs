use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::ast::{Entries, Node};
use crate::constructor::{object_of, ConstructorKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{FeeProfile, Financial, TournamentData};

use super::{decimal_field, int_field, str_field, unwrap_call};

/// Default buy-in and fee profiles. Totals are filled in later by
/// [`compute_totals`] once players and prizes are known.
pub(super) fn map_fee_config(t: &Entries, diags: &mut Diagnostics) -> Financial {
    let buy_in = decimal_field(t, "BuyIn");
    let fee_profiles = t
        .get("FeeProfiles")
        .map(|node| map_fee_profiles(node, diags))
        .unwrap_or_default();
    Financial {
        fee_profiles,
        buy_in,
        ..Default::default()
    }
}

/// Accepts `Map.from([[name, new FeeProfile({...})], ...])` and
/// `[new FeeProfile({...}), ...]`.
fn map_fee_profiles(node: &Node, diags: &mut Diagnostics) -> BTreeMap<String, FeeProfile> {
    let mut profiles = BTreeMap::new();
    let Some(items) = unwrap_call(node).as_array() else {
        diags.warn(
            DiagnosticKind::Mapping,
            format!("FeeProfiles is {}, expected a list", node.shape()),
        );
        return profiles;
    };
    for item in items {
        let (key, value) = match item.as_array() {
            Some([k, v]) => (k.as_str().map(str::to_string), v),
            _ => (None, item),
        };
        let Some(entries) = object_of(value, ConstructorKind::FeeProfile) else {
            diags.warn(
                DiagnosticKind::Mapping,
                format!("skipping fee profile entry of shape {}", value.shape()),
            );
            continue;
        };
        let name = key.unwrap_or_else(|| str_field(entries, "Name"));
        profiles.insert(
            name.clone(),
            FeeProfile {
                name,
                fee: decimal_field(entries, "Fee"),
                chips: int_field(entries, "Chips"),
            },
        );
    }
    profiles
}

/// Investment totals per player and for the whole tournament.
///
/// The prize pool is the sum of calculated prize amounts, or the total
/// invested when the file carries no calculated amounts.
pub(super) fn compute_totals(data: &mut TournamentData) {
    let financial = &mut data.financial;
    let mut buyins = Decimal::ZERO;
    let mut rebuys = Decimal::ZERO;
    let mut addons = Decimal::ZERO;
    for player in data.players.values_mut() {
        let mut invested = Decimal::ZERO;
        for (i, b) in player.buyins.iter().enumerate() {
            let fee = financial.fee_for(&b.profile);
            if i == 0 {
                buyins += fee;
            } else {
                rebuys += fee;
            }
            invested += fee;
        }
        for a in &player.addons {
            let fee = financial.fee_for(&a.profile);
            addons += fee;
            invested += fee;
        }
        player.total_invested = invested;
    }
    financial.total_buyins_amount = buyins;
    financial.total_rebuys_amount = rebuys;
    financial.total_addons_amount = addons;

    let prize_total: Decimal = data.prizes.iter().map(|p| p.calculated_amount).sum();
    financial.prize_pool = if prize_total > Decimal::ZERO {
        prize_total
    } else {
        buyins + rebuys + addons
    };
}

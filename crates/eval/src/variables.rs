//! Per-player variable seed for points formulas.
//!
//! | name | value |
//! |---|---|
//! | `n`, `entrants` | number of players |
//! | `r`, `place` | finish position |
//! | `buyins` | buy-ins made, first entry included |
//! | `rebuys` | buy-ins after the first |
//! | `addons` | add-ons purchased |
//! | `monies` | total the player invested |
//! | `avgBC` | prize pool / `n` |
//! | `numberofHits` | hits credited |
//! | `T33`, `T80` | `round(n / 3)`, `round(n * 0.8)` |
//! | `points`, `temp` | 0, scratch |
//! | `winnings` | prize money won |
//! | `prizePool` | tournament prize pool |
//! | `buyinAmount` | default buy-in |
//! | `feeAmount` | fee of the player's first buy-in profile |
//! | `totalBuyInsAmount` | the player's first buy-in fee |
//! | `totalRebuysAmount` | the player's rebuy fees |
//! | `totalAddOnsAmount` | the player's add-on fees |

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use tdt_core::{PlayerResult, TournamentData};

use crate::formula::Env;

/// Every name a formula may read without assigning it first.
pub const VARIABLE_NAMES: &[&str] = &[
    "n",
    "r",
    "buyins",
    "rebuys",
    "addons",
    "monies",
    "avgBC",
    "numberofHits",
    "place",
    "entrants",
    "T33",
    "T80",
    "points",
    "temp",
    "winnings",
    "prizePool",
    "buyinAmount",
    "feeAmount",
    "totalBuyInsAmount",
    "totalRebuysAmount",
    "totalAddOnsAmount",
];

fn num(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// All known variables set to 0, with the `n`-derived tiers filled in.
pub fn default_variables(n: usize) -> Env {
    let mut env: Env = VARIABLE_NAMES
        .iter()
        .map(|name| (name.to_string(), 0.0))
        .collect();
    let n = n as f64;
    env.insert("n".into(), n);
    env.insert("entrants".into(), n);
    env.insert("T33".into(), (n / 3.0).round());
    env.insert("T80".into(), (n * 0.8).round());
    env
}

/// Variables for one player of a ranked and reconciled tournament.
pub fn player_variables(data: &TournamentData, player: &PlayerResult) -> Env {
    let financial = &data.financial;
    let n = data.players.len();
    let mut env = default_variables(n);

    let first_fee = player
        .buyins
        .first()
        .map(|b| financial.fee_for(&b.profile));
    let rebuy_fees: Decimal = player
        .buyins
        .iter()
        .skip(1)
        .map(|b| financial.fee_for(&b.profile))
        .sum();
    let addon_fees: Decimal = player
        .addons
        .iter()
        .map(|a| financial.fee_for(&a.profile))
        .sum();
    let avg = if n == 0 {
        0.0
    } else {
        num(financial.prize_pool) / n as f64
    };
    let place = f64::from(player.finish_position);

    let values = [
        ("r", place),
        ("place", place),
        ("buyins", player.buyins.len() as f64),
        ("rebuys", player.rebuy_count() as f64),
        ("addons", player.addons.len() as f64),
        ("monies", num(player.total_invested)),
        ("avgBC", avg),
        ("numberofHits", f64::from(player.hits)),
        ("winnings", num(player.winnings)),
        ("prizePool", num(financial.prize_pool)),
        ("buyinAmount", num(financial.buy_in)),
        ("feeAmount", num(first_fee.unwrap_or(financial.buy_in))),
        ("totalBuyInsAmount", num(first_fee.unwrap_or(Decimal::ZERO))),
        ("totalRebuysAmount", num(rebuy_fees)),
        ("totalAddOnsAmount", num(addon_fees)),
    ];
    for (name, value) in values {
        env.insert(name.to_string(), value);
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdt_core::{AddOn, Buyin, FeeProfile};

    #[test]
    fn every_name_is_seeded() {
        let env = default_variables(9);
        for name in VARIABLE_NAMES {
            assert!(env.contains_key(*name), "{} missing", name);
        }
        assert_eq!(env["T33"], 3.0);
        assert_eq!(env["T80"], 7.0);
        assert_eq!(env["entrants"], 9.0);
    }

    #[test]
    fn player_values_use_fee_profiles() {
        let mut data = TournamentData::default();
        data.financial.buy_in = Decimal::from(20);
        data.financial.prize_pool = Decimal::from(100);
        data.financial.fee_profiles.insert(
            "Rebuy".into(),
            FeeProfile {
                name: "Rebuy".into(),
                fee: Decimal::from(10),
                chips: 0,
            },
        );
        let mut p = PlayerResult::new("a", "Ann");
        p.buyins.push(Buyin {
            profile: "Standard".into(),
            ..Default::default()
        });
        p.buyins.push(Buyin {
            profile: "Rebuy".into(),
            ..Default::default()
        });
        p.addons.push(AddOn {
            profile: "Mystery".into(),
            ..Default::default()
        });
        p.finish_position = 2;
        p.hits = 3;
        data.players.insert("a".into(), p.clone());
        data.players.insert("b".into(), PlayerResult::new("b", "Ben"));

        let env = player_variables(&data, &p);
        assert_eq!(env["n"], 2.0);
        assert_eq!(env["r"], 2.0);
        assert_eq!(env["rebuys"], 1.0);
        assert_eq!(env["numberofHits"], 3.0);
        assert_eq!(env["avgBC"], 50.0);
        // unknown profiles resolve to the default buy-in, never zero
        assert_eq!(env["feeAmount"], 20.0);
        assert_eq!(env["totalRebuysAmount"], 10.0);
        assert_eq!(env["totalAddOnsAmount"], 20.0);
    }
}

use rust_decimal::Decimal;

use tdt_core::TournamentData;

/// Set each player's `winnings` to the total calculated amount of the prizes
/// paying their finish position.
pub fn assign_winnings(data: &mut TournamentData) {
    for player in data.players.values_mut() {
        let position = i64::from(player.finish_position);
        player.winnings = data
            .prizes
            .iter()
            .filter(|p| p.position > 0 && p.position == position)
            .map(|p| p.calculated_amount)
            .sum::<Decimal>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdt_core::{PlayerResult, Prize};

    #[test]
    fn winnings_follow_finish_position() {
        let mut data = TournamentData::default();
        for (uuid, pos) in [("a", 1u32), ("b", 2), ("c", 3)] {
            let mut p = PlayerResult::new(uuid, uuid);
            p.finish_position = pos;
            p.winnings = Decimal::from(99);
            data.players.insert(uuid.into(), p);
        }
        data.prizes = vec![
            Prize {
                position: 1,
                calculated_amount: Decimal::new(6050, 2),
                ..Default::default()
            },
            Prize {
                position: 2,
                calculated_amount: Decimal::from(30),
                ..Default::default()
            },
        ];
        assign_winnings(&mut data);
        assert_eq!(data.players["a"].winnings, Decimal::new(6050, 2));
        assert_eq!(data.players["b"].winnings, Decimal::from(30));
        assert_eq!(data.players["c"].winnings, Decimal::ZERO);
    }
}

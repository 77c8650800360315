use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - AwaitingRoll -> Moving
/// - Moving -> TurnComplete
/// - AwaitingRoll -> TurnComplete (room action or elimination)
/// - any -> AwaitingRoll of the next player
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Start of a turn, dice not thrown yet.
    AwaitingRoll,
    /// Dice thrown, moves remain.
    Moving,
    /// Movement is over for this turn.
    TurnComplete,
}

impl TurnPhase {
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Moving)
    }

    pub const fn is_complete(self) -> bool {
        matches!(self, Self::TurnComplete)
    }
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::AwaitingRoll
    }
}

/// Fixed seating order with a cursor on the current player.
///
/// Eliminated players keep their seat and are skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCycle {
    order: Vec<Suspect>,
    cursor: usize,
    eliminated: BTreeSet<Suspect>,
}

impl TurnCycle {
    pub const MIN_PLAYERS: usize = 3;
    pub const MAX_PLAYERS: usize = Suspect::ALL.len();

    /// Seats `players` clockwise starting from `first`.
    pub fn seat(players: &[Suspect], first: Suspect) -> Result<Self> {
        validate_players(players)?;
        if !players.contains(&first) {
            return Err(GameError::UnknownPlayer);
        }

        let order = (0..Suspect::ALL.len())
            .map(|offset| Suspect::from_slot(first.slot() + offset))
            .filter(|suspect| players.contains(suspect))
            .collect();
        Ok(Self {
            order,
            cursor: 0,
            eliminated: BTreeSet::new(),
        })
    }

    pub fn current(&self) -> Suspect {
        self.order[self.cursor]
    }

    /// Moves the cursor to the next player still in the game.
    pub fn advance(&mut self) -> Result<Suspect> {
        let len = self.order.len();
        for step in 1..=len {
            let cursor = (self.cursor + step) % len;
            if !self.eliminated.contains(&self.order[cursor]) {
                self.cursor = cursor;
                return Ok(self.order[cursor]);
            }
        }
        Err(GameError::NoActivePlayers)
    }

    pub fn order(&self) -> &[Suspect] {
        &self.order
    }

    pub fn contains(&self, suspect: Suspect) -> bool {
        self.order.contains(&suspect)
    }

    pub fn eliminate(&mut self, suspect: Suspect) -> Result<()> {
        if !self.contains(suspect) {
            return Err(GameError::UnknownPlayer);
        }
        self.eliminated.insert(suspect);
        Ok(())
    }

    pub fn is_eliminated(&self, suspect: Suspect) -> bool {
        self.eliminated.contains(&suspect)
    }

    pub fn eliminated(&self) -> impl Iterator<Item = Suspect> + '_ {
        self.eliminated.iter().copied()
    }

    /// Players still in the game, in seating order.
    pub fn active(&self) -> impl Iterator<Item = Suspect> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|suspect| !self.eliminated.contains(suspect))
    }
}

pub(crate) fn validate_players(players: &[Suspect]) -> Result<()> {
    if !(TurnCycle::MIN_PLAYERS..=TurnCycle::MAX_PLAYERS).contains(&players.len()) {
        return Err(GameError::InvalidPlayerCount(players.len()));
    }
    let distinct: BTreeSet<_> = players.iter().collect();
    if distinct.len() != players.len() {
        return Err(GameError::DuplicatePlayer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use Suspect::*;

    #[test]
    fn seating_follows_clockwise_order_from_the_first_player() {
        let cycle = TurnCycle::seat(&[Plum, Scarlett, Green, Mustard], Green).unwrap();

        assert_eq!(cycle.order(), [Green, Plum, Scarlett, Mustard]);
        assert_eq!(cycle.current(), Green);
    }

    #[test]
    fn three_players_from_slot_two_cycle_in_place() {
        let players = [Suspect::from_slot(2), Suspect::from_slot(3), Suspect::from_slot(4)];
        let mut cycle = TurnCycle::seat(&players, Suspect::from_slot(2)).unwrap();

        let mut slots = vec![cycle.current().slot()];
        for _ in 0..6 {
            slots.push(cycle.advance().unwrap().slot());
        }
        assert_eq!(slots, [2, 3, 4, 2, 3, 4, 2]);
    }

    #[test]
    fn full_cycle_returns_to_the_start() {
        let mut cycle = TurnCycle::seat(&Suspect::ALL, Peacock).unwrap();

        let seen: Vec<_> = (0..6).map(|_| cycle.advance().unwrap()).collect();
        assert_eq!(seen, [Plum, Scarlett, Mustard, White, Green, Peacock]);
    }

    #[test]
    fn eliminated_players_keep_their_seat_but_are_skipped() {
        let mut cycle = TurnCycle::seat(&[Scarlett, Mustard, White], Scarlett).unwrap();
        cycle.eliminate(Mustard).unwrap();

        assert_eq!(cycle.advance(), Ok(White));
        assert_eq!(cycle.advance(), Ok(Scarlett));
        assert_eq!(cycle.order(), [Scarlett, Mustard, White]);
        assert_eq!(cycle.active().collect::<Vec<_>>(), [Scarlett, White]);

        cycle.eliminate(Scarlett).unwrap();
        cycle.eliminate(White).unwrap();
        assert_eq!(cycle.advance(), Err(GameError::NoActivePlayers));
        assert_eq!(cycle.eliminate(Plum), Err(GameError::UnknownPlayer));
    }

    #[test]
    fn seating_validates_player_list() {
        assert_eq!(
            TurnCycle::seat(&[Scarlett, Mustard], Scarlett),
            Err(GameError::InvalidPlayerCount(2))
        );
        assert_eq!(
            TurnCycle::seat(&[Scarlett, Mustard, Mustard], Scarlett),
            Err(GameError::DuplicatePlayer)
        );
        assert_eq!(
            TurnCycle::seat(&[Scarlett, Mustard, White], Plum),
            Err(GameError::UnknownPlayer)
        );
    }
}

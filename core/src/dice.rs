use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Faces of the two six-sided dice thrown at the start of a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll(u8, u8);

impl DiceRoll {
    pub const FACES: u8 = 6;

    pub const fn new(first: u8, second: u8) -> Result<Self> {
        if first < 1 || first > Self::FACES {
            return Err(GameError::InvalidDieFace(first));
        }
        if second < 1 || second > Self::FACES {
            return Err(GameError::InvalidDieFace(second));
        }
        Ok(Self(first, second))
    }

    pub const fn faces(self) -> (u8, u8) {
        (self.0, self.1)
    }

    pub const fn total(self) -> u8 {
        self.0 + self.1
    }
}

pub trait Dice {
    fn roll(&mut self) -> DiceRoll;
}

/// Two fair dice driven by a seeded generator.
#[derive(Clone, Debug)]
pub struct RandomDice {
    rng: SmallRng,
}

impl RandomDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> DiceRoll {
        let faces = 1..=DiceRoll::FACES;
        DiceRoll(
            self.rng.random_range(faces.clone()),
            self.rng.random_range(faces),
        )
    }
}

/// Replays a fixed sequence of rolls, starting over once it runs out.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedDice {
    rolls: Vec<DiceRoll>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(rolls: Vec<DiceRoll>) -> Result<Self> {
        if rolls.is_empty() {
            return Err(GameError::InvalidDieFace(0));
        }
        Ok(Self { rolls, next: 0 })
    }

    /// Script of rolls summing to each of `totals`, split as evenly as possible.
    pub fn totals(totals: &[u8]) -> Result<Self> {
        let rolls = totals
            .iter()
            .map(|&total| {
                let first = total / 2;
                DiceRoll::new(first, total - first)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rolls)
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> DiceRoll {
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next = (self.next + 1) % self.rolls.len();
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_faces_are_validated() {
        assert_eq!(DiceRoll::new(3, 4).map(DiceRoll::total), Ok(7));
        assert_eq!(DiceRoll::new(0, 4), Err(GameError::InvalidDieFace(0)));
        assert_eq!(DiceRoll::new(6, 7), Err(GameError::InvalidDieFace(7)));
    }

    #[test]
    fn scripted_dice_cycle() {
        let mut dice = ScriptedDice::totals(&[2, 12, 7]).unwrap();

        assert_eq!(dice.roll().faces(), (1, 1));
        assert_eq!(dice.roll().faces(), (6, 6));
        assert_eq!(dice.roll().faces(), (3, 4));
        assert_eq!(dice.roll().total(), 2);
        assert!(ScriptedDice::totals(&[1]).is_err());
        assert!(ScriptedDice::totals(&[]).is_err());
    }

    #[test]
    fn random_rolls_stay_in_range_and_peak_at_seven() {
        const TRIALS: u32 = 36_000;
        let mut dice = RandomDice::new(0x5eed);
        let mut counts = [0u32; 13];

        for _ in 0..TRIALS {
            let roll = dice.roll();
            let (a, b) = roll.faces();
            assert!((1..=6).contains(&a) && (1..=6).contains(&b));
            assert!((2..=12).contains(&roll.total()));
            counts[usize::from(roll.total())] += 1;
        }

        // Expected count for total t is (6 - |t - 7|) / 36 of all trials.
        for total in 2..=12u32 {
            let ways = 6 - total.abs_diff(7);
            let expected = TRIALS * ways / 36;
            let actual = counts[total as usize];
            assert!(
                actual.abs_diff(expected) * 100 <= expected * 15,
                "total {total}: expected about {expected}, got {actual}"
            );
        }
        let peak = (2..=12).max_by_key(|&total| counts[total]).unwrap();
        assert_eq!(peak, 7);
    }
}

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use dice::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use layout::*;
pub use observation::*;
pub use room::*;
pub use token::*;
pub use turn::*;
pub use types::*;

mod board;
mod dice;
mod engine;
mod error;
mod grid;
mod layout;
mod observation;
mod room;
mod token;
mod turn;
mod types;

/// Who plays and how the game is randomised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: Vec<Suspect>,
    /// Forces the first seat; drawn at random from `players` when absent.
    #[serde(default)]
    pub first_player: Option<Suspect>,
    #[serde(default)]
    pub seed: u64,
}

impl GameConfig {
    pub fn new(players: Vec<Suspect>, seed: u64) -> Result<Self> {
        let config = Self {
            players,
            first_player: None,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_first_player(mut self, first: Suspect) -> Result<Self> {
        self.first_player = Some(first);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        turn::validate_players(&self.players)?;
        match self.first_player {
            Some(first) if !self.players.contains(&first) => Err(GameError::UnknownPlayer),
            _ => Ok(()),
        }
    }
}

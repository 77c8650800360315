use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub piece: PieceId,
    pub owner: PieceOwner,
    pub position: Option<Coord2>,
    pub room: Option<Room>,
}

/// Plain-data view of a game for hosts that render or transmit it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: TurnPhase,
    pub current_player: Suspect,
    pub remaining_moves: u8,
    pub last_roll: Option<DiceRoll>,
    pub seating: Vec<Suspect>,
    pub eliminated: Vec<Suspect>,
    pub pieces: Vec<PieceView>,
}

impl Snapshot {
    pub fn from_game<D: Dice>(game: &Game<D>) -> Self {
        let board = game.board();
        let pieces = board
            .pieces()
            .filter_map(|piece| {
                let owner = game.owner_of(piece)?;
                let position = board.position(piece).ok();
                Some(PieceView {
                    piece,
                    owner,
                    position,
                    room: position.and_then(|coords| game.room_of(coords)),
                })
            })
            .collect();

        Self {
            phase: game.phase(),
            current_player: game.current_player(),
            remaining_moves: game.remaining_moves(),
            last_roll: game.last_roll(),
            seating: game.players().to_vec(),
            eliminated: game.eliminated_players(),
            pieces,
        }
    }

    pub fn piece(&self, owner: PieceOwner) -> Option<&PieceView> {
        self.pieces.iter().find(|view| view.owner == owner)
    }
}

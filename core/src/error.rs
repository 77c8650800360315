use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Coord, Room};

/// Reason a single step was refused by the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveBlock {
    /// The source cell owns a wall in the direction of travel.
    Wall,
    /// The step would leave the grid.
    Edge,
    /// The destination is an out-of-bounds cell.
    OutOfBounds,
    /// Another piece stands on the destination hallway cell.
    Occupied,
}

impl fmt::Display for MoveBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wall => "blocked by a wall",
            Self::Edge => "off the edge of the board",
            Self::OutOfBounds => "destination is out of bounds",
            Self::Occupied => "destination is occupied",
        })
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Malformed cell code at ({x}, {y})")]
    MalformedCell { x: Coord, y: Coord },
    #[error("Duplicate wall in cell code at ({x}, {y})")]
    DuplicateWall { x: Coord, y: Coord },
    #[error("Cell ({x}, {y}) is claimed by more than one room")]
    OverlappingRooms { x: Coord, y: Coord },
    #[error("Inconsistent definition for room {0}")]
    InvalidRoom(Room),
    #[error("Secret passage must join two different rooms")]
    InvalidSecretPassage,
    #[error("Piece is not registered on the board")]
    UnregisteredPiece,
    #[error("Board cannot register more pieces")]
    TooManyPieces,
    #[error("Die face {0} is outside 1..=6")]
    InvalidDieFace(u8),
    #[error("A game needs 3 to 6 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("Player is seated more than once")]
    DuplicatePlayer,
    #[error("Player is not seated in this game")]
    UnknownPlayer,
    #[error("Layout has no start cell for a seated player")]
    MissingStart,
    #[error("Unknown name")]
    UnknownName,
    #[error("Invalid move: {0}")]
    InvalidMove(MoveBlock),
    #[error("No available exit from this room")]
    NoAvailableExit,
    #[error("Player still has moves remaining")]
    HasRemainingMoves,
    #[error("Dice must be rolled first")]
    MustRoll,
    #[error("Movement for this turn is over")]
    MovementOver,
    #[error("Player is not in that room")]
    NotInRoom,
    #[error("Room has no secret passage")]
    NoSecretPassage,
    #[error("A suggestion was already made this turn")]
    AlreadySuggested,
    #[error("Every player has been eliminated")]
    NoActivePlayers,
}

impl GameError {
    /// Whether the caller can carry on by issuing a different command.
    ///
    /// Argument and construction errors are precondition violations and are
    /// never expected during well-formed play.
    pub const fn is_recoverable(self) -> bool {
        use GameError::*;
        match self {
            InvalidMove(_) | NoAvailableExit | HasRemainingMoves | MustRoll | MovementOver
            | NotInRoom | NoSecretPassage | AlreadySuggested => true,
            InvalidCoords | InvalidBoardShape | MalformedCell { .. } | DuplicateWall { .. }
            | OverlappingRooms { .. } | InvalidRoom(_) | InvalidSecretPassage
            | UnregisteredPiece | TooManyPieces | InvalidDieFace(_) | InvalidPlayerCount(_) | DuplicatePlayer
            | UnknownPlayer | MissingStart | UnknownName | NoActivePlayers => false,
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;

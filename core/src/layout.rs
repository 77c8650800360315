use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Wall table of the standard 24×25 board, north row first.
///
/// See [`Cell::parse`] for the code format.
#[rustfmt::skip]
pub const STANDARD_LAYOUT: [&str; BOARD_HEIGHT as usize] = [
    "x   x   x   x   x   x   x   x   x   s   x   x   x   x   s   x   x   x   x   x   x   x   x   x",
    "NWp N   N   N   N   NE  W   .   S   SE  NW  N   N   NE  SW  S   .   E   NW  N   N   N   N   NEp",
    "W   .   .   .   .   E   W   E   NW  N   .   .   .   .   N   NE  W   E   W   .   .   .   .   E",
    "W   .   .   .   .   E   W   E   W   .   .   .   .   .   .   E   W   E   W   .   .   .   .   E",
    "W   .   .   .   .   E   W   E   W   .   .   .   .   .   .   E   W   E   Wd  S   S   S   S   SE",
    "W   .   .   .   .   E   W   .   d   .   .   .   .   .   .   d   .   .   .   N   N   N   N   N",
    "W   .   .   .   .   E   W   E   W   .   .   .   .   .   .   E   W   .   .   .   .   .   .   s",
    "SW  S   S   S   d   SE  W   E   SW  d   S   S   S   S   d   SE  W   .   S   S   S   S   S   S",
    "x   NS  NS  NS  S   NS  .   S   N   .   N   N   N   N   .   N   .   E   NW  N   N   N   N   NE",
    "NW  N   N   N   N   N   d   NE  W   .   .   .   .   .   .   .   .   .   d   .   .   .   .   E",
    "W   .   .   .   .   .   .   E   W   .   x   x   x   x   x   .   .   E   W   .   .   .   .   E",
    "W   .   .   .   .   .   .   E   W   .   x   x   x   x   x   .   .   E   W   .   .   .   .   E",
    "W   .   .   .   .   .   .   d   .   .   x   x   x   x   x   .   .   E   SW  S   S   S   d   SE",
    "W   .   .   .   .   .   .   E   W   .   x   x   x   x   x   .   .   S   NS  NS  N   NS  S   NS",
    "W   .   .   .   .   .   .   E   W   .   x   x   x   x   x   .   E   NW  N   N   d   N   N   NE",
    "SW  S   S   S   S   S   d   SE  W   .   x   x   x   x   x   .   E   W   .   .   .   .   .   E",
    "x   N   N   N   N   N   .   N   .   .   x   x   x   x   x   .   .   d   .   .   .   .   .   E",
    "s   .   .   .   .   .   .   .   .   S   S   .   .   S   S   .   E   W   .   .   .   .   .   E",
    "x   S   S   S   S   S   .   .   E   NW  N   d   d   N   NE  W   E   SW  S   S   S   S   S   SE",
    "NW  N   N   N   N   N   Ed  W   E   W   .   .   .   .   E   W   .   N   N   N   N   N   N   Ns",
    "W   .   .   .   .   .   E   W   E   W   .   .   .   .   d   .   .   .   S   S   S   S   S   S",
    "W   .   .   .   .   .   E   W   E   W   .   .   .   .   E   W   E   Wd  N   N   N   N   N   NE",
    "W   .   .   .   .   .   E   W   E   W   .   .   .   .   E   W   E   W   .   .   .   .   .   E",
    "W   .   .   .   .   .   E   W   E   W   .   .   .   .   E   W   E   W   .   .   .   .   .   E",
    "SWp S   S   S   S   S   SE  x   E   SW  S   S   S   S   SE  W   Es  SW  S   S   S   S   S   SEp",
];

const BALLROOM_AREA: [Area; 2] = [Area::new((10, 1), (13, 1)), Area::new((8, 2), (15, 7))];

pub const STANDARD_ROOMS: [RoomSpec<'static>; 9] = [
    RoomSpec {
        room: Room::Kitchen,
        area: &[Area::new((0, 1), (5, 7))],
        entrances: &[(4, 8)],
        exits: &[(4, 7)],
        exit_targets: &[(4, 8)],
    },
    RoomSpec {
        room: Room::Ballroom,
        area: &BALLROOM_AREA,
        entrances: &[(7, 5), (16, 5), (9, 8), (14, 8)],
        exits: &[(8, 5), (15, 5), (9, 7), (14, 7)],
        exit_targets: &[(7, 5), (16, 5), (9, 8), (14, 8)],
    },
    RoomSpec {
        room: Room::Conservatory,
        area: &[Area::new((18, 1), (23, 4))],
        entrances: &[(18, 5)],
        exits: &[(18, 4)],
        exit_targets: &[(18, 5)],
    },
    RoomSpec {
        room: Room::DiningRoom,
        area: &[Area::new((0, 9), (7, 15))],
        entrances: &[(6, 8), (8, 12), (6, 16)],
        exits: &[(6, 9), (7, 12), (6, 15)],
        exit_targets: &[(6, 8), (8, 12), (6, 16)],
    },
    RoomSpec {
        room: Room::BilliardRoom,
        area: &[Area::new((18, 8), (23, 12))],
        entrances: &[(17, 9), (22, 13)],
        exits: &[(18, 9), (22, 12)],
        exit_targets: &[(17, 9), (22, 13)],
    },
    RoomSpec {
        room: Room::Library,
        area: &[Area::new((17, 14), (23, 18))],
        entrances: &[(20, 13), (16, 16)],
        exits: &[(20, 14), (17, 16)],
        exit_targets: &[(20, 13), (16, 16)],
    },
    RoomSpec {
        room: Room::Lounge,
        area: &[Area::new((0, 19), (6, 24))],
        entrances: &[(6, 18)],
        exits: &[(6, 19)],
        exit_targets: &[(6, 18)],
    },
    RoomSpec {
        room: Room::Hall,
        area: &[Area::new((9, 18), (14, 24))],
        entrances: &[(11, 17), (12, 17), (15, 20)],
        exits: &[(11, 18), (12, 18), (14, 20)],
        exit_targets: &[(11, 17), (12, 17), (15, 20)],
    },
    RoomSpec {
        room: Room::Study,
        area: &[Area::new((17, 21), (23, 24))],
        entrances: &[(17, 20)],
        exits: &[(17, 21)],
        exit_targets: &[(17, 20)],
    },
];

/// Kitchen↔Study and Conservatory↔Lounge.
pub const STANDARD_PASSAGES: [(Coord2, Coord2); 2] = [((0, 1), (23, 24)), ((23, 1), (0, 24))];

pub const STANDARD_STARTS: [(Suspect, Coord2); 6] = [
    (Suspect::Scarlett, (16, 24)),
    (Suspect::Mustard, (0, 17)),
    (Suspect::White, (9, 0)),
    (Suspect::Green, (14, 0)),
    (Suspect::Peacock, (23, 6)),
    (Suspect::Plum, (23, 19)),
];

/// Static topology shared by every observer of a game: grid, rooms, and the
/// start cell of each suspect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardLayoutData")]
pub struct BoardLayout {
    grid: Grid,
    rooms: RoomRegistry,
    starts: BTreeMap<Suspect, Coord2>,
}

#[derive(Deserialize)]
struct BoardLayoutData {
    grid: Grid,
    rooms: RoomRegistry,
    starts: BTreeMap<Suspect, Coord2>,
}

impl TryFrom<BoardLayoutData> for BoardLayout {
    type Error = GameError;

    fn try_from(BoardLayoutData { grid, rooms, starts }: BoardLayoutData) -> Result<Self> {
        let layout = Self { grid, rooms, starts };
        layout.validate()?;
        Ok(layout)
    }
}

impl BoardLayout {
    pub fn new(grid: Grid, rooms: RoomRegistry, starts: &[(Suspect, Coord2)]) -> Result<Self> {
        let layout = Self {
            grid,
            rooms,
            starts: starts.iter().copied().collect(),
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Rooms must match the grid and every start must be a playable cell.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.rooms.validate(&self.grid)?;
        for &coords in self.starts.values() {
            self.grid.validate_coords(coords)?;
            if self.grid.is_out_of_bounds(coords) {
                return Err(GameError::InvalidCoords);
            }
        }
        Ok(())
    }

    pub fn standard() -> Result<Self> {
        let grid = Grid::parse(&STANDARD_LAYOUT)?;
        let rooms = RoomRegistry::new(&grid, &STANDARD_ROOMS, &STANDARD_PASSAGES)?;
        Self::new(grid, rooms, &STANDARD_STARTS)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn start_of(&self, suspect: Suspect) -> Option<Coord2> {
        self.starts.get(&suspect).copied()
    }

    pub fn room_of(&self, coords: Coord2) -> Option<Room> {
        self.rooms.room_of(coords)
    }
}

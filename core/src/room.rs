use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Room {
    Kitchen,
    Ballroom,
    Conservatory,
    DiningRoom,
    BilliardRoom,
    Library,
    Lounge,
    Hall,
    Study,
}

impl Room {
    pub const ALL: [Room; 9] = [
        Self::Kitchen,
        Self::Ballroom,
        Self::Conservatory,
        Self::DiningRoom,
        Self::BilliardRoom,
        Self::Library,
        Self::Lounge,
        Self::Hall,
        Self::Study,
    ];

    pub const fn name(self) -> &'static str {
        use Room::*;
        match self {
            Kitchen => "Kitchen",
            Ballroom => "Ballroom",
            Conservatory => "Conservatory",
            DiningRoom => "Dining Room",
            BilliardRoom => "Billiard Room",
            Library => "Library",
            Lounge => "Lounge",
            Hall => "Hall",
            Study => "Study",
        }
    }

    /// Looks a room up by its display name, ignoring ASCII case and spaces.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.chars().filter(|ch| !ch.is_whitespace());
        Self::ALL.into_iter().find(|room| {
            room.name()
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .map(|ch| ch.to_ascii_lowercase())
                .eq(wanted.clone().map(|ch| ch.to_ascii_lowercase()))
        })
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Room {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or(GameError::UnknownName)
    }
}

/// Inclusive rectangle of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub min: Coord2,
    pub max: Coord2,
}

impl Area {
    pub const fn new(min: Coord2, max: Coord2) -> Self {
        Self { min, max }
    }

    pub const fn cell(coords: Coord2) -> Self {
        Self::new(coords, coords)
    }

    pub fn iter(self) -> impl Iterator<Item = Coord2> {
        let Self { min, max } = self;
        (min.1..=max.1).flat_map(move |y| (min.0..=max.0).map(move |x| (x, y)))
    }
}

/// Hand-written description of a room, consumed by [`RoomRegistry::new`].
///
/// `exits` and `exit_targets` are positionally paired: stepping out through
/// `exits[i]` lands on `exit_targets[i]`.
#[derive(Copy, Clone, Debug)]
pub struct RoomSpec<'a> {
    pub room: Room,
    pub area: &'a [Area],
    pub entrances: &'a [Coord2],
    pub exits: &'a [Coord2],
    pub exit_targets: &'a [Coord2],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Exit {
    /// Door-adjacent cell inside the room.
    pub cell: Coord2,
    /// Hallway cell the exit leads to.
    pub target: Coord2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct RoomEntry {
    cells: Vec<Coord2>,
    entrances: BTreeSet<Coord2>,
    exits: Vec<Exit>,
    /// Passage cell inside this room and the cell it leads to.
    passage: Option<(Coord2, Coord2)>,
}

/// Static partition of grid cells into rooms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoomRegistryData")]
pub struct RoomRegistry {
    membership: Array2<Option<Room>>,
    rooms: BTreeMap<Room, RoomEntry>,
}

#[derive(Deserialize)]
struct RoomRegistryData {
    membership: Array2<Option<Room>>,
    rooms: BTreeMap<Room, RoomEntry>,
}

impl TryFrom<RoomRegistryData> for RoomRegistry {
    type Error = GameError;

    fn try_from(RoomRegistryData { membership, rooms }: RoomRegistryData) -> Result<Self> {
        let registry = Self { membership, rooms };
        registry.check_consistency()?;
        Ok(registry)
    }
}

impl RoomRegistry {
    pub fn new(grid: &Grid, specs: &[RoomSpec], passages: &[(Coord2, Coord2)]) -> Result<Self> {
        let mut membership: Array2<Option<Room>> = Array2::default(grid.size().to_nd_index());
        let mut rooms = BTreeMap::new();

        for spec in specs {
            let mut cells = Vec::new();
            for coords in spec.area.iter().flat_map(|area| area.iter()) {
                let coords = grid.validate_coords(coords)?;
                if grid.is_out_of_bounds(coords) {
                    return Err(GameError::InvalidRoom(spec.room));
                }
                let slot = &mut membership[coords.to_nd_index()];
                if slot.is_some() {
                    return Err(GameError::OverlappingRooms {
                        x: coords.0,
                        y: coords.1,
                    });
                }
                *slot = Some(spec.room);
                cells.push(coords);
            }
            if cells.is_empty() || spec.exits.len() != spec.exit_targets.len() {
                return Err(GameError::InvalidRoom(spec.room));
            }

            let exits = spec
                .exits
                .iter()
                .zip(spec.exit_targets)
                .map(|(&cell, &target)| Exit { cell, target })
                .collect();
            let entry = RoomEntry {
                cells,
                entrances: spec.entrances.iter().copied().collect(),
                exits,
                passage: None,
            };
            if rooms.insert(spec.room, entry).is_some() {
                return Err(GameError::InvalidRoom(spec.room));
            }
        }

        let mut registry = Self { membership, rooms };
        for &(from, to) in passages {
            registry.link_passage(from, to)?;
        }
        registry.validate(grid)?;
        Ok(registry)
    }

    /// Checks the registry against the grid it describes.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        let (width, height) = grid.size();
        if self.membership.dim() != (usize::from(width), usize::from(height)) {
            return Err(GameError::InvalidBoardShape);
        }
        self.check_consistency()?;
        for (&room, entry) in &self.rooms {
            if entry.cells.iter().any(|&coords| grid.is_out_of_bounds(coords)) {
                return Err(GameError::InvalidRoom(room));
            }
            self.validate_doors(grid, room, entry)?;
        }
        Ok(())
    }

    /// Membership array, cell lists and passages must describe the same rooms.
    fn check_consistency(&self) -> Result<()> {
        for (&room, entry) in &self.rooms {
            if entry.cells.is_empty() {
                return Err(GameError::InvalidRoom(room));
            }
            let distinct: BTreeSet<_> = entry.cells.iter().collect();
            if distinct.len() != entry.cells.len() {
                return Err(GameError::InvalidRoom(room));
            }
            for &(x, y) in &entry.cells {
                if self.room_of((x, y)) != Some(room) {
                    return Err(GameError::OverlappingRooms { x, y });
                }
            }

            if let Some((from, to)) = entry.passage {
                let far = self.room_of(to);
                let linked = self.room_of(from) == Some(room)
                    && far.is_some_and(|far| far != room)
                    && far
                        .and_then(|far| self.rooms.get(&far))
                        .is_some_and(|other| other.passage == Some((to, from)));
                if !linked {
                    return Err(GameError::InvalidSecretPassage);
                }
            }
        }

        for ((x, y), slot) in self.membership.indexed_iter() {
            let Some(room) = *slot else {
                continue;
            };
            let coords = (
                Coord::try_from(x).map_err(|_| GameError::InvalidBoardShape)?,
                Coord::try_from(y).map_err(|_| GameError::InvalidBoardShape)?,
            );
            if !self.cells_of(room).contains(&coords) {
                return Err(GameError::InvalidRoom(room));
            }
        }
        Ok(())
    }

    fn validate_doors(&self, grid: &Grid, room: Room, entry: &RoomEntry) -> Result<()> {
        let into_room = |coords: Coord2| {
            Direction::ALL.into_iter().any(|dir| {
                !grid.has_wall(coords, dir)
                    && grid
                        .adjacent(coords, dir)
                        .is_some_and(|next| self.room_of(next) == Some(room))
            })
        };

        for &entrance in &entry.entrances {
            let entrance = grid.validate_coords(entrance)?;
            if self.room_of(entrance).is_some() || !into_room(entrance) {
                return Err(GameError::InvalidRoom(room));
            }
        }
        for exit in &entry.exits {
            let target = grid.validate_coords(exit.target)?;
            if self.room_of(exit.cell) != Some(room)
                || self.room_of(target).is_some()
                || grid.is_out_of_bounds(target)
            {
                return Err(GameError::InvalidRoom(room));
            }
        }
        Ok(())
    }

    fn link_passage(&mut self, from: Coord2, to: Coord2) -> Result<()> {
        let (from_room, to_room) = match (self.room_of(from), self.room_of(to)) {
            (Some(a), Some(b)) if a != b => (a, b),
            _ => return Err(GameError::InvalidSecretPassage),
        };
        for (room, here, there) in [(from_room, from, to), (to_room, to, from)] {
            let entry = self
                .rooms
                .get_mut(&room)
                .ok_or(GameError::InvalidSecretPassage)?;
            if entry.passage.replace((here, there)).is_some() {
                return Err(GameError::InvalidSecretPassage);
            }
        }
        Ok(())
    }

    pub fn room_of(&self, coords: Coord2) -> Option<Room> {
        self.membership
            .get(coords.to_nd_index())
            .copied()
            .flatten()
    }

    pub fn is_room_cell(&self, coords: Coord2) -> bool {
        self.room_of(coords).is_some()
    }

    /// Rooms known to this registry, in declaration order of [`Room`].
    pub fn rooms(&self) -> impl Iterator<Item = Room> + '_ {
        self.rooms.keys().copied()
    }

    pub fn cells_of(&self, room: Room) -> &[Coord2] {
        self.rooms
            .get(&room)
            .map_or(&[][..], |entry| entry.cells.as_slice())
    }

    pub fn entrances_of(&self, room: Room) -> Option<&BTreeSet<Coord2>> {
        self.rooms.get(&room).map(|entry| &entry.entrances)
    }

    pub fn exits_of(&self, room: Room) -> &[Exit] {
        self.rooms
            .get(&room)
            .map_or(&[][..], |entry| entry.exits.as_slice())
    }

    pub fn is_secret_passage_cell(&self, coords: Coord2) -> bool {
        self.secret_passage_destination(coords).is_some()
    }

    pub fn secret_passage_destination(&self, coords: Coord2) -> Option<Coord2> {
        let room = self.room_of(coords)?;
        self.rooms
            .get(&room)?
            .passage
            .filter(|&(cell, _)| cell == coords)
            .map(|(_, to)| to)
    }

    /// The passage cell inside `room`, if the room has one.
    pub fn secret_passage_of(&self, room: Room) -> Option<Coord2> {
        self.rooms
            .get(&room)
            .and_then(|entry| entry.passage)
            .map(|(cell, _)| cell)
    }
}

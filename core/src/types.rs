use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Two-dimensional coordinates `(x, y)`, `y` growing southwards.
pub type Coord2 = (Coord, Coord);

pub const BOARD_WIDTH: Coord = 24;
pub const BOARD_HEIGHT: Coord = 25;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    pub const fn opposite(self) -> Self {
        use Direction::*;
        match self {
            North => South,
            South => North,
            East => West,
            West => East,
        }
    }

    pub const fn delta(self) -> (i8, i8) {
        use Direction::*;
        match self {
            North => (0, -1),
            South => (0, 1),
            East => (1, 0),
            West => (-1, 0),
        }
    }

    pub const fn letter(self) -> char {
        use Direction::*;
        match self {
            North => 'N',
            South => 'S',
            East => 'E',
            West => 'W',
        }
    }
}

impl core::str::FromStr for Direction {
    type Err = crate::GameError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dir| {
                let name = match dir {
                    Self::North => "north",
                    Self::South => "south",
                    Self::East => "east",
                    Self::West => "west",
                };
                s.eq_ignore_ascii_case(name) || s.eq_ignore_ascii_case(&name[..1])
            })
            .ok_or(crate::GameError::UnknownName)
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub(crate) fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn apply_delta_stops_at_bounds() {
        assert_eq!(apply_delta((0, 0), Direction::North.delta(), (3, 3)), None);
        assert_eq!(apply_delta((0, 0), Direction::West.delta(), (3, 3)), None);
        assert_eq!(apply_delta((2, 1), Direction::East.delta(), (3, 3)), None);
        assert_eq!(apply_delta((1, 1), Direction::South.delta(), (3, 3)), Some((1, 2)));
    }

    #[test]
    fn direction_parses_short_and_long_names() {
        assert_eq!("n".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("West".parse::<Direction>(), Ok(Direction::West));
        assert!("up".parse::<Direction>().is_err());
    }
}

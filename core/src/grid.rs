use bitflags::bitflags;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Walls owned by a single cell.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Walls: u8 {
        const NORTH = 1;
        const SOUTH = 1 << 1;
        const EAST  = 1 << 2;
        const WEST  = 1 << 3;
    }
}

impl From<Direction> for Walls {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Walls::NORTH,
            Direction::South => Walls::SOUTH,
            Direction::East => Walls::EAST,
            Direction::West => Walls::WEST,
        }
    }
}

bitflags! {
    /// Static markers read from the layout table.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CellTags: u8 {
        const OUT_OF_BOUNDS  = 1;
        const DOOR           = 1 << 1;
        const SECRET_PASSAGE = 1 << 2;
        const START          = 1 << 3;
    }
}

/// A single board location and the walls it owns.
///
/// Walls are not mirrored onto the neighbouring cell, so movement always
/// consults the cell being left.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    walls: Walls,
    tags: CellTags,
}

impl Cell {
    pub const fn new(coords: Coord2, walls: Walls, tags: CellTags) -> Self {
        Self {
            coords,
            walls,
            tags,
        }
    }

    pub const fn open(coords: Coord2) -> Self {
        Self::new(coords, Walls::empty(), CellTags::empty())
    }

    pub const fn out_of_bounds(coords: Coord2) -> Self {
        Self::new(coords, Walls::empty(), CellTags::OUT_OF_BOUNDS)
    }

    /// Parses one layout code.
    ///
    /// `.` is a plain cell, `x` is out of bounds, otherwise the code is a run of
    /// wall letters `N`/`S`/`E`/`W` followed by markers `d` (door), `p`
    /// (secret passage) and `s` (start).
    pub fn parse(coords: Coord2, code: &str) -> Result<Self> {
        let (x, y) = coords;
        match code {
            "." => return Ok(Self::open(coords)),
            "x" => return Ok(Self::out_of_bounds(coords)),
            "" => return Err(GameError::MalformedCell { x, y }),
            _ => {}
        }

        let mut walls = Walls::empty();
        let mut tags = CellTags::empty();
        for ch in code.chars() {
            match ch {
                'N' | 'S' | 'E' | 'W' => {
                    let wall = match ch {
                        'N' => Walls::NORTH,
                        'S' => Walls::SOUTH,
                        'E' => Walls::EAST,
                        _ => Walls::WEST,
                    };
                    if walls.contains(wall) {
                        return Err(GameError::DuplicateWall { x, y });
                    }
                    walls |= wall;
                }
                'd' | 'p' | 's' => {
                    let tag = match ch {
                        'd' => CellTags::DOOR,
                        'p' => CellTags::SECRET_PASSAGE,
                        _ => CellTags::START,
                    };
                    if tags.contains(tag) {
                        return Err(GameError::MalformedCell { x, y });
                    }
                    tags |= tag;
                }
                _ => return Err(GameError::MalformedCell { x, y }),
            }
        }

        Ok(Self::new(coords, walls, tags))
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn walls(&self) -> Walls {
        self.walls
    }

    pub const fn tags(&self) -> CellTags {
        self.tags
    }

    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls.contains(direction.into())
    }

    pub const fn is_out_of_bounds(&self) -> bool {
        self.tags.contains(CellTags::OUT_OF_BOUNDS)
    }

    pub const fn is_door(&self) -> bool {
        self.tags.contains(CellTags::DOOR)
    }

    pub const fn is_secret_passage(&self) -> bool {
        self.tags.contains(CellTags::SECRET_PASSAGE)
    }

    pub const fn is_start(&self) -> bool {
        self.tags.contains(CellTags::START)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl Eq for Cell {}

/// Immutable cell topology of a board.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    cells: Array2<Cell>,
}

#[derive(Deserialize)]
struct GridData {
    cells: Array2<Cell>,
}

impl TryFrom<GridData> for Grid {
    type Error = GameError;

    fn try_from(GridData { cells }: GridData) -> Result<Self> {
        let grid = Self { cells };
        grid.validate()?;
        Ok(grid)
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.cells.dim() == other.cells.dim()
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.coords == b.coords && a.walls == b.walls && a.tags == b.tags)
    }
}

impl Grid {
    /// A grid of the given size with no walls or markers.
    pub fn open(size: Coord2) -> Self {
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(x, y)| {
            Cell::open((x as Coord, y as Coord))
        });
        Self { cells }
    }

    /// Parses a layout table, one string per row from north to south, codes
    /// separated by whitespace.
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let height: Coord = rows
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidBoardShape)?;
        let width: Coord = match rows.first() {
            Some(row) => row
                .split_whitespace()
                .count()
                .try_into()
                .map_err(|_| GameError::InvalidBoardShape)?,
            None => return Err(GameError::InvalidBoardShape),
        };
        if width == 0 {
            return Err(GameError::InvalidBoardShape);
        }

        let mut grid = Self::open((width, height));
        for (y, row) in (0..height).zip(rows) {
            let mut codes = row.split_whitespace();
            for x in 0..width {
                let code = codes.next().ok_or(GameError::InvalidBoardShape)?;
                grid.cells[(x, y).to_nd_index()] = Cell::parse((x, y), code)?;
            }
            if codes.next().is_some() {
                return Err(GameError::InvalidBoardShape);
            }
        }

        Ok(grid)
    }

    /// Each cell must sit at its own coordinates on a non-empty grid that
    /// fits [`Coord`].
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.cells.dim();
        if width == 0
            || height == 0
            || Coord::try_from(width).is_err()
            || Coord::try_from(height).is_err()
        {
            return Err(GameError::InvalidBoardShape);
        }
        for ((x, y), cell) in self.cells.indexed_iter() {
            if cell.coords.to_nd_index() != [x, y] {
                return Err(GameError::InvalidBoardShape);
            }
        }
        Ok(())
    }

    /// Replaces a cell during construction.
    pub fn with_cell(mut self, cell: Cell) -> Result<Self> {
        let coords = self.validate_coords(cell.coords())?;
        self.cells[coords.to_nd_index()] = cell;
        Ok(self)
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.validate_coords(coords)
            .ok()
            .map(|coords| &self.cells[coords.to_nd_index()])
    }

    pub fn has_wall(&self, coords: Coord2, direction: Direction) -> bool {
        self.cell(coords).is_some_and(|cell| cell.has_wall(direction))
    }

    pub fn is_out_of_bounds(&self, coords: Coord2) -> bool {
        self.cell(coords).is_none_or(Cell::is_out_of_bounds)
    }

    /// Neighbouring coordinates, or `None` past the grid edge.
    pub fn adjacent(&self, coords: Coord2, direction: Direction) -> Option<Coord2> {
        apply_delta(coords, direction.delta(), self.size())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Renders the grid back into table form.
    pub fn to_codes(&self) -> alloc::vec::Vec<alloc::string::String> {
        use alloc::string::String;

        let (width, height) = self.size();
        (0..height)
            .map(|y| {
                let mut row = String::new();
                for x in 0..width {
                    if x > 0 {
                        row.push(' ');
                    }
                    row.push_str(&cell_code(&self.cells[(x, y).to_nd_index()]));
                }
                row
            })
            .collect()
    }
}

fn cell_code(cell: &Cell) -> alloc::string::String {
    use alloc::string::String;

    if cell.is_out_of_bounds() {
        return String::from("x");
    }
    let mut code: String = Direction::ALL
        .into_iter()
        .filter(|&dir| cell.has_wall(dir))
        .map(Direction::letter)
        .collect();
    for (tag, marker) in [
        (CellTags::DOOR, 'd'),
        (CellTags::SECRET_PASSAGE, 'p'),
        (CellTags::START, 's'),
    ] {
        if cell.tags().contains(tag) {
            code.push(marker);
        }
    }
    if code.is_empty() {
        code.push('.');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_walls_and_markers() {
        let cell = Cell::parse((1, 2), "NWp").unwrap();

        assert!(cell.has_wall(Direction::North));
        assert!(cell.has_wall(Direction::West));
        assert!(!cell.has_wall(Direction::South));
        assert!(cell.is_secret_passage());
        assert!(!cell.is_door());
    }

    #[test]
    fn parse_rejects_duplicate_walls() {
        assert_eq!(
            Cell::parse((3, 4), "NSN"),
            Err(GameError::DuplicateWall { x: 3, y: 4 })
        );
    }

    #[test]
    fn parse_rejects_unknown_characters() {
        assert_eq!(
            Cell::parse((0, 0), "Nq"),
            Err(GameError::MalformedCell { x: 0, y: 0 })
        );
        assert_eq!(
            Cell::parse((0, 0), "dd"),
            Err(GameError::MalformedCell { x: 0, y: 0 })
        );
    }

    #[test]
    fn grid_parse_rejects_ragged_rows() {
        assert_eq!(
            Grid::parse(&[". . .", ". ."]),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            Grid::parse(&[". .", ". . ."]),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(Grid::parse(&[]), Err(GameError::InvalidBoardShape));
    }

    #[test]
    fn adjacent_stays_inside_the_grid() {
        let grid = Grid::parse(&["S x", ". E"]).unwrap();

        assert_eq!(grid.size(), (2, 2));
        assert_eq!(grid.adjacent((0, 0), Direction::East), Some((1, 0)));
        assert_eq!(grid.adjacent((0, 0), Direction::North), None);
        assert_eq!(grid.adjacent((1, 1), Direction::East), None);
        assert!(grid.has_wall((0, 0), Direction::South));
        assert!(grid.has_wall((1, 1), Direction::East));
        assert!(grid.is_out_of_bounds((1, 0)));
        assert!(grid.is_out_of_bounds((5, 5)));
    }

    #[test]
    fn codes_round_trip_through_the_table_format() {
        let rows = ["NW Nd x", "SWs . Sp"];
        let grid = Grid::parse(&rows).unwrap();

        assert_eq!(grid.to_codes(), rows);
    }

    #[test]
    fn grid_survives_a_json_round_trip() {
        let grid = Grid::parse(&["NW Nd x", "SWs . Sp"]).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let back: Grid = serde_json::from_str(&json).unwrap();

        assert_eq!(back, grid);
    }

    #[test]
    fn validate_rejects_misplaced_cells() {
        let mut grid = Grid::open((2, 2));
        grid.cells[[0, 0]] = Cell::open((1, 1));

        assert_eq!(grid.validate(), Err(GameError::InvalidBoardShape));
        let json = serde_json::to_string(&grid).unwrap();
        assert!(serde_json::from_str::<Grid>(&json).is_err());
    }

    #[test]
    fn cells_compare_by_coordinates() {
        let a = Cell::parse((2, 2), "N").unwrap();
        let b = Cell::open((2, 2));

        assert_eq!(a, b);
        assert_ne!(a, Cell::open((2, 3)));
    }
}

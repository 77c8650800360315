use alloc::sync::Arc;
use alloc::vec::Vec;
use ndarray::Array2;
use smallvec::SmallVec;

use crate::*;

type Occupants = SmallVec<[PieceId; 2]>;

/// Dynamic piece placement over a shared [`BoardLayout`].
///
/// Hallway cells hold at most one piece; room cells may hold several.
#[derive(Clone, Debug)]
pub struct Board {
    layout: Arc<BoardLayout>,
    positions: Vec<Option<Coord2>>,
    occupancy: Array2<Occupants>,
}

impl Board {
    pub fn new(layout: Arc<BoardLayout>) -> Self {
        let size = layout.grid().size();
        Self {
            layout,
            positions: Vec::new(),
            occupancy: Array2::from_elem(size.to_nd_index(), Occupants::new()),
        }
    }

    pub fn layout(&self) -> &Arc<BoardLayout> {
        &self.layout
    }

    /// Allocates a new piece. It has no position until [`Board::set_position`].
    pub fn add_piece(&mut self) -> Result<PieceId> {
        let piece = PieceId::new(self.positions.len())?;
        self.positions.push(None);
        Ok(piece)
    }

    pub fn piece_count(&self) -> usize {
        self.positions.len()
    }

    /// Every registered piece, in allocation order.
    pub fn pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        (0..self.positions.len()).filter_map(|index| PieceId::new(index).ok())
    }

    /// Places `piece` on `coords` regardless of walls or occupancy.
    pub fn set_position(&mut self, piece: PieceId, coords: Coord2) -> Result<()> {
        let slot = *self
            .positions
            .get(piece.index())
            .ok_or(GameError::UnregisteredPiece)?;
        let coords = self.layout.grid().validate_coords(coords)?;
        if self.layout.grid().is_out_of_bounds(coords) {
            return Err(GameError::InvalidCoords);
        }

        if let Some(previous) = slot {
            self.occupancy[previous.to_nd_index()].retain(|other| *other != piece);
        }
        self.occupancy[coords.to_nd_index()].push(piece);
        self.positions[piece.index()] = Some(coords);
        Ok(())
    }

    pub fn position(&self, piece: PieceId) -> Result<Coord2> {
        self.positions
            .get(piece.index())
            .copied()
            .flatten()
            .ok_or(GameError::UnregisteredPiece)
    }

    pub fn occupants(&self, coords: Coord2) -> &[PieceId] {
        self.occupancy
            .get(coords.to_nd_index())
            .map_or(&[][..], |occupants| occupants.as_slice())
    }

    /// Whether a piece other than `piece` stands on `coords`.
    pub fn is_blocked_for(&self, piece: PieceId, coords: Coord2) -> bool {
        self.occupants(coords).iter().any(|&other| other != piece)
    }

    pub fn room_of_piece(&self, piece: PieceId) -> Result<Option<Room>> {
        Ok(self.layout.room_of(self.position(piece)?))
    }

    pub fn pieces_in(&self, room: Room) -> Vec<PieceId> {
        self.layout
            .rooms()
            .cells_of(room)
            .iter()
            .flat_map(|&coords| self.occupants(coords).iter().copied())
            .collect()
    }

    /// A cell to drop a piece on when it is sent into `room`: the first empty
    /// interior cell that is not a door, else any interior cell.
    pub fn placement_cell(&self, room: Room) -> Option<Coord2> {
        let cells = self.layout.rooms().cells_of(room);
        let grid = self.layout.grid();
        cells
            .iter()
            .copied()
            .find(|&coords| {
                self.occupants(coords).is_empty()
                    && grid.cell(coords).is_some_and(|cell| !cell.is_door())
            })
            .or_else(|| cells.first().copied())
    }

    /// Checks a single step for `piece` without moving it.
    pub fn check_move(&self, piece: PieceId, direction: Direction) -> Result<Coord2> {
        self.check_step_from(piece, self.position(piece)?, direction)
    }

    pub(crate) fn check_step_from(
        &self,
        piece: PieceId,
        from: Coord2,
        direction: Direction,
    ) -> Result<Coord2> {
        let grid = self.layout.grid();
        if grid.has_wall(from, direction) {
            return Err(GameError::InvalidMove(MoveBlock::Wall));
        }
        let to = grid
            .adjacent(from, direction)
            .ok_or(GameError::InvalidMove(MoveBlock::Edge))?;
        if grid.is_out_of_bounds(to) {
            return Err(GameError::InvalidMove(MoveBlock::OutOfBounds));
        }
        if !self.layout.rooms().is_room_cell(to) && self.is_blocked_for(piece, to) {
            return Err(GameError::InvalidMove(MoveBlock::Occupied));
        }
        Ok(to)
    }

    /// Moves `piece` one cell. A refused move leaves the board untouched.
    pub fn move_piece(&mut self, piece: PieceId, direction: Direction) -> Result<Coord2> {
        let to = self.check_move(piece, direction)?;
        self.set_position(piece, to)?;
        Ok(to)
    }

    pub fn legal_directions(&self, piece: PieceId) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.check_move(piece, dir).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board(size: Coord2, cells: &[Cell], rooms: &[RoomSpec]) -> Board {
        let mut grid = Grid::open(size);
        for &cell in cells {
            grid = grid.with_cell(cell).unwrap();
        }
        let registry = RoomRegistry::new(&grid, rooms, &[]).unwrap();
        Board::new(Arc::new(BoardLayout::new(grid, registry, &[]).unwrap()))
    }

    fn standard_board() -> Board {
        Board::new(Arc::new(BoardLayout::standard().unwrap()))
    }

    #[test]
    fn wall_on_source_cell_blocks_the_move() {
        let wall = Cell::new((5, 5), Walls::NORTH, CellTags::empty());
        let mut board = open_board((8, 8), &[wall], &[]);
        let piece = board.add_piece().unwrap();
        board.set_position(piece, (5, 5)).unwrap();

        assert_eq!(
            board.move_piece(piece, Direction::North),
            Err(GameError::InvalidMove(MoveBlock::Wall))
        );
        assert_eq!(board.position(piece), Ok((5, 5)));
        assert_eq!(board.occupants((5, 5)), &[piece]);
    }

    #[test]
    fn wall_on_destination_does_not_block() {
        let wall = Cell::new((5, 4), Walls::SOUTH, CellTags::empty());
        let mut board = open_board((8, 8), &[wall], &[]);
        let piece = board.add_piece().unwrap();
        board.set_position(piece, (5, 5)).unwrap();

        assert_eq!(board.move_piece(piece, Direction::North), Ok((5, 4)));
        assert_eq!(
            board.move_piece(piece, Direction::South),
            Err(GameError::InvalidMove(MoveBlock::Wall))
        );
    }

    #[test]
    fn successful_move_vacates_the_old_cell() {
        let mut board = open_board((4, 4), &[], &[]);
        let piece = board.add_piece().unwrap();
        board.set_position(piece, (1, 1)).unwrap();

        assert_eq!(board.move_piece(piece, Direction::East), Ok((2, 1)));
        assert!(board.occupants((1, 1)).is_empty());
        assert_eq!(board.occupants((2, 1)), &[piece]);
        assert_eq!(board.position(piece), Ok((2, 1)));
    }

    #[test]
    fn edges_and_out_of_bounds_cells_are_rejected() {
        let void = Cell::out_of_bounds((1, 0));
        let mut board = open_board((3, 3), &[void], &[]);
        let piece = board.add_piece().unwrap();
        board.set_position(piece, (0, 0)).unwrap();

        assert_eq!(
            board.move_piece(piece, Direction::West),
            Err(GameError::InvalidMove(MoveBlock::Edge))
        );
        assert_eq!(
            board.move_piece(piece, Direction::East),
            Err(GameError::InvalidMove(MoveBlock::OutOfBounds))
        );
        assert_eq!(board.set_position(piece, (1, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.set_position(piece, (3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.position(piece), Ok((0, 0)));
    }

    #[test]
    fn hallway_cells_hold_one_piece_but_rooms_share() {
        let area = [Area::new((2, 0), (3, 3))];
        let den = RoomSpec {
            room: Room::Study,
            area: &area,
            entrances: &[],
            exits: &[],
            exit_targets: &[],
        };
        let mut board = open_board((4, 4), &[], &[den]);
        let first = board.add_piece().unwrap();
        let second = board.add_piece().unwrap();
        board.set_position(first, (1, 0)).unwrap();
        board.set_position(second, (0, 0)).unwrap();

        assert_eq!(
            board.move_piece(second, Direction::East),
            Err(GameError::InvalidMove(MoveBlock::Occupied))
        );

        board.set_position(first, (2, 0)).unwrap();
        board.set_position(second, (1, 0)).unwrap();
        assert_eq!(board.move_piece(second, Direction::East), Ok((2, 0)));
        assert_eq!(board.occupants((2, 0)), &[first, second]);
        assert_eq!(board.pieces_in(Room::Study), [first, second]);
    }

    #[test]
    fn unplaced_pieces_are_unregistered() {
        let mut board = open_board((2, 2), &[], &[]);
        let piece = board.add_piece().unwrap();

        assert_eq!(board.position(piece), Err(GameError::UnregisteredPiece));
        assert_eq!(
            board.move_piece(piece, Direction::East),
            Err(GameError::UnregisteredPiece)
        );
        assert_eq!(
            board.set_position(PieceId::new(7).unwrap(), (0, 0)),
            Err(GameError::UnregisteredPiece)
        );
    }

    #[test]
    fn piece_ids_run_out_instead_of_wrapping() {
        let mut board = open_board((2, 2), &[], &[]);

        for expected in 0..=usize::from(u16::MAX) {
            assert_eq!(board.add_piece().map(PieceId::index), Ok(expected));
        }
        assert_eq!(board.add_piece(), Err(GameError::TooManyPieces));
        assert_eq!(board.piece_count(), usize::from(u16::MAX) + 1);
        assert_eq!(board.pieces().last().map(PieceId::index), Some(usize::from(u16::MAX)));
    }

    #[test]
    fn owned_walls_always_block_on_the_standard_board() {
        let mut board = standard_board();
        let piece = board.add_piece().unwrap();
        let blocker = board.add_piece().unwrap();
        let grid = board.layout().grid().clone();

        for cell in grid.iter().filter(|cell| !cell.is_out_of_bounds()) {
            for dir in Direction::ALL.into_iter().filter(|&dir| cell.has_wall(dir)) {
                board.set_position(piece, cell.coords()).unwrap();
                let neighbour = grid.adjacent(cell.coords(), dir);
                for occupied in [false, true] {
                    if let Some(next) = neighbour.filter(|&next| !grid.is_out_of_bounds(next)) {
                        if occupied {
                            board.set_position(blocker, next).unwrap();
                        }
                    }
                    assert_eq!(
                        board.move_piece(piece, dir),
                        Err(GameError::InvalidMove(MoveBlock::Wall))
                    );
                    assert_eq!(board.position(piece), Ok(cell.coords()));
                }
            }
        }
    }

    #[test]
    fn placement_prefers_empty_non_door_cells() {
        let mut board = standard_board();
        let piece = board.add_piece().unwrap();
        let first = board.placement_cell(Room::Kitchen).unwrap();
        board.set_position(piece, first).unwrap();

        let second = board.placement_cell(Room::Kitchen).unwrap();
        assert_ne!(first, second);
        assert_eq!(board.layout().room_of(second), Some(Room::Kitchen));
        assert_eq!(board.room_of_piece(piece), Ok(Some(Room::Kitchen)));
    }

    #[test]
    fn legal_directions_from_a_start_cell() {
        let mut board = standard_board();
        let piece = board.add_piece().unwrap();
        board.set_position(piece, (9, 0)).unwrap();

        assert_eq!(board.legal_directions(piece), [Direction::South]);
    }
}

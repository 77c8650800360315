use alloc::collections::{BTreeSet, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Something the current player may do right now.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    RollDice,
    Step(Direction),
    TakeExit(Exit),
    SecretPassage { to: Coord2 },
    Suggest,
    EndTurn,
}

/// Record of a suggestion; resolving it against the case file is up to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggester: Suspect,
    pub suspect: Suspect,
    pub weapon: Weapon,
    pub room: Room,
}

const PIECE_OWNERS: usize = Suspect::ALL.len() + Weapon::ALL.len();

/// Pieces are allocated suspects first, then weapons, so the id of an owner is
/// fixed for every game.
const fn piece_index(owner: PieceOwner) -> u16 {
    match owner {
        PieceOwner::Suspect(suspect) => suspect as u16,
        PieceOwner::Weapon(weapon) => Suspect::ALL.len() as u16 + weapon as u16,
    }
}

fn owner_at(index: usize) -> Option<PieceOwner> {
    let suspects = Suspect::ALL.len();
    if index < suspects {
        Some(PieceOwner::Suspect(Suspect::ALL[index]))
    } else {
        Weapon::ALL
            .get(index - suspects)
            .map(|&weapon| PieceOwner::Weapon(weapon))
    }
}

/// Turn engine: seating, dice budget, and the movement state machine over a
/// [`Board`].
#[derive(Clone, Debug)]
pub struct Game<D = RandomDice> {
    board: Board,
    cycle: TurnCycle,
    dice: D,
    phase: TurnPhase,
    remaining_moves: u8,
    last_roll: Option<DiceRoll>,
    suggested: bool,
}

impl Game<RandomDice> {
    /// Standard board with fair dice seeded from the config.
    pub fn new(config: &GameConfig) -> Result<Self> {
        Self::with_dice(config, RandomDice::new(config.seed))
    }
}

impl<D: Dice> Game<D> {
    pub fn with_dice(config: &GameConfig, dice: D) -> Result<Self> {
        Self::with_layout(config, Arc::new(BoardLayout::standard()?), dice)
    }

    pub fn with_layout(config: &GameConfig, layout: Arc<BoardLayout>, dice: D) -> Result<Self> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(!config.seed);
        let first = match config.first_player {
            Some(first) => first,
            None => *config
                .players
                .choose(&mut rng)
                .ok_or(GameError::InvalidPlayerCount(0))?,
        };
        let cycle = TurnCycle::seat(&config.players, first)?;

        let mut board = Board::new(layout.clone());
        for _ in 0..PIECE_OWNERS {
            board.add_piece()?;
        }

        for suspect in Suspect::ALL {
            let piece = PieceId::from_raw(piece_index(suspect.into()));
            match layout.start_of(suspect) {
                Some(start) => board.set_position(piece, start)?,
                None if cycle.contains(suspect) => return Err(GameError::MissingStart),
                None => log::debug!("{suspect} has no start cell, kept off the board"),
            }
        }

        let mut rooms: Vec<Room> = layout.rooms().rooms().collect();
        if rooms.is_empty() {
            log::warn!("Layout has no rooms, weapons kept off the board");
        }
        rooms.shuffle(&mut rng);
        for (weapon, &room) in Weapon::ALL.into_iter().zip(rooms.iter().cycle()) {
            if let Some(cell) = board.placement_cell(room) {
                board.set_position(PieceId::from_raw(piece_index(weapon.into())), cell)?;
            }
        }

        log::debug!("Seating order: {:?}", cycle.order());
        Ok(Self {
            board,
            cycle,
            dice,
            phase: TurnPhase::AwaitingRoll,
            remaining_moves: 0,
            last_roll: None,
            suggested: false,
        })
    }

    pub fn layout(&self) -> &Arc<BoardLayout> {
        self.board.layout()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_player(&self) -> Suspect {
        self.cycle.current()
    }

    pub fn remaining_moves(&self) -> u8 {
        self.remaining_moves
    }

    pub fn has_rolled(&self) -> bool {
        self.last_roll.is_some()
    }

    /// Roll made this turn, if any.
    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.last_roll
    }

    pub fn has_suggested(&self) -> bool {
        self.suggested
    }

    /// Every seated player in turn order, eliminated or not.
    pub fn players(&self) -> &[Suspect] {
        self.cycle.order()
    }

    pub fn active_players(&self) -> Vec<Suspect> {
        self.cycle.active().collect()
    }

    pub fn eliminated_players(&self) -> Vec<Suspect> {
        self.cycle.eliminated().collect()
    }

    pub fn is_eliminated(&self, player: Suspect) -> bool {
        self.cycle.is_eliminated(player)
    }

    pub fn piece_of(&self, owner: impl Into<PieceOwner>) -> PieceId {
        PieceId::from_raw(piece_index(owner.into()))
    }

    pub fn owner_of(&self, piece: PieceId) -> Option<PieceOwner> {
        owner_at(piece.index())
    }

    pub fn position(&self, owner: impl Into<PieceOwner>) -> Result<Coord2> {
        self.board.position(self.piece_of(owner))
    }

    pub fn room_of(&self, coords: Coord2) -> Option<Room> {
        self.layout().room_of(coords)
    }

    fn current_piece(&self) -> PieceId {
        self.piece_of(self.current_player())
    }

    pub fn current_room(&self) -> Option<Room> {
        self.board
            .room_of_piece(self.current_piece())
            .ok()
            .flatten()
    }

    pub fn is_in_room(&self) -> bool {
        self.current_room().is_some()
    }

    /// Exits of `room` whose hallway cell is free for the current player.
    pub fn available_exits(&self, room: Room) -> Vec<Exit> {
        let piece = self.current_piece();
        self.layout()
            .rooms()
            .exits_of(room)
            .iter()
            .copied()
            .filter(|exit| !self.board.is_blocked_for(piece, exit.target))
            .collect()
    }

    /// Relocates a piece unconditionally, e.g. when a host resolves an effect
    /// outside the turn engine.
    pub fn place(&mut self, owner: impl Into<PieceOwner>, coords: Coord2) -> Result<()> {
        let piece = self.piece_of(owner);
        self.board.set_position(piece, coords)
    }

    pub fn roll_dice(&mut self) -> Result<DiceRoll> {
        if self.phase != TurnPhase::AwaitingRoll {
            return Err(GameError::HasRemainingMoves);
        }

        let roll = self.dice.roll();
        self.remaining_moves = roll.total();
        self.last_roll = Some(roll);
        self.phase = TurnPhase::Moving;
        log::debug!(
            "{} rolled {:?}, {} moves",
            self.current_player(),
            roll.faces(),
            self.remaining_moves
        );
        Ok(roll)
    }

    /// Validates a step for the current player without taking it.
    pub fn check_step(&self, direction: Direction) -> Result<Coord2> {
        match self.phase {
            TurnPhase::AwaitingRoll => return Err(GameError::MustRoll),
            TurnPhase::TurnComplete => return Err(GameError::MovementOver),
            TurnPhase::Moving => {}
        }

        let piece = self.current_piece();
        let from = self.board.position(piece)?;
        let to = self.board.check_move(piece, direction)?;
        if let Some(room) = self.room_of(from) {
            if self.room_of(to) != Some(room) && self.available_exits(room).is_empty() {
                return Err(GameError::NoAvailableExit);
            }
        }
        Ok(to)
    }

    /// Takes one step, spending one move. Entering a room ends movement.
    pub fn step(&mut self, direction: Direction) -> Result<Coord2> {
        let to = self.check_step(direction)?;
        let piece = self.current_piece();
        let from_room = self.current_room();
        self.board.set_position(piece, to)?;
        self.remaining_moves = self.remaining_moves.saturating_sub(1);

        let to_room = self.room_of(to);
        if to_room.is_some() && to_room != from_room {
            log::debug!("{} entered the {:?}", self.current_player(), to_room);
            self.finish_movement();
        } else if self.remaining_moves == 0 {
            self.finish_movement();
        }
        Ok(to)
    }

    fn check_room_action(&self, room: Room) -> Result<()> {
        if self.current_room() != Some(room) {
            return Err(GameError::NotInRoom);
        }
        if self.phase.is_complete() {
            return Err(GameError::MovementOver);
        }
        Ok(())
    }

    /// Leaves `room` through `exit_cell`, landing on its hallway cell.
    pub fn take_exit(&mut self, room: Room, exit_cell: Coord2) -> Result<Coord2> {
        self.check_room_action(room)?;
        let exit = self
            .available_exits(room)
            .into_iter()
            .find(|exit| exit.cell == exit_cell)
            .ok_or(GameError::NoAvailableExit)?;

        let piece = self.current_piece();
        self.board.set_position(piece, exit.target)?;
        log::debug!("{} left the {room} to {:?}", self.current_player(), exit.target);
        self.finish_movement();
        Ok(exit.target)
    }

    /// Destination of the passage the current player stands on.
    fn passage_destination(&self) -> Option<Coord2> {
        let from = self.board.position(self.current_piece()).ok()?;
        self.layout().rooms().secret_passage_destination(from)
    }

    /// Crosses the secret passage marked on the current player's cell.
    pub fn use_secret_passage(&mut self) -> Result<Coord2> {
        let room = self.current_room().ok_or(GameError::NotInRoom)?;
        self.check_room_action(room)?;
        let to = self
            .passage_destination()
            .ok_or(GameError::NoSecretPassage)?;

        let piece = self.current_piece();
        self.board.set_position(piece, to)?;
        log::debug!("{} took the passage from the {room}", self.current_player());
        self.finish_movement();
        Ok(to)
    }

    /// Calls `suspect` and `weapon` into the current player's room.
    pub fn suggest(&mut self, suspect: Suspect, weapon: Weapon) -> Result<Suggestion> {
        let room = self.current_room().ok_or(GameError::NotInRoom)?;
        if self.suggested {
            return Err(GameError::AlreadySuggested);
        }

        for owner in [PieceOwner::Suspect(suspect), PieceOwner::Weapon(weapon)] {
            let piece = self.piece_of(owner);
            if self.board.room_of_piece(piece).ok().flatten() == Some(room) {
                continue;
            }
            let cell = self
                .board
                .placement_cell(room)
                .ok_or(GameError::InvalidRoom(room))?;
            self.board.set_position(piece, cell)?;
        }

        self.suggested = true;
        self.finish_movement();
        let suggestion = Suggestion {
            suggester: self.current_player(),
            suspect,
            weapon,
            room,
        };
        log::debug!("Suggestion: {suggestion:?}");
        Ok(suggestion)
    }

    /// Takes `player` out of the rotation after a failed accusation.
    pub fn eliminate(&mut self, player: Suspect) -> Result<()> {
        self.cycle.eliminate(player)?;
        log::info!("{player} is out of the game");
        if player == self.current_player() {
            self.finish_movement();
        }
        Ok(())
    }

    fn check_end_turn(&self) -> Result<()> {
        match self.phase {
            TurnPhase::TurnComplete => Ok(()),
            _ if self.is_in_room() => Ok(()),
            TurnPhase::AwaitingRoll => Err(GameError::MustRoll),
            TurnPhase::Moving => Err(GameError::HasRemainingMoves),
        }
    }

    /// Hands the turn to the next player still in the game.
    pub fn next_turn(&mut self) -> Result<Suspect> {
        self.check_end_turn()?;
        let next = self.cycle.advance()?;

        self.phase = TurnPhase::AwaitingRoll;
        self.remaining_moves = 0;
        self.last_roll = None;
        self.suggested = false;
        log::info!("{next} to play");
        Ok(next)
    }

    fn finish_movement(&mut self) {
        self.remaining_moves = 0;
        self.phase = TurnPhase::TurnComplete;
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.phase {
            TurnPhase::AwaitingRoll => actions.push(Action::RollDice),
            TurnPhase::Moving => actions.extend(
                Direction::ALL
                    .into_iter()
                    .filter(|&dir| self.check_step(dir).is_ok())
                    .map(Action::Step),
            ),
            TurnPhase::TurnComplete => {}
        }

        if let Some(room) = self.current_room() {
            if !self.phase.is_complete() {
                actions.extend(self.available_exits(room).into_iter().map(Action::TakeExit));
                if let Some(to) = self.passage_destination() {
                    actions.push(Action::SecretPassage { to });
                }
            }
            if !self.suggested {
                actions.push(Action::Suggest);
            }
        }

        if self.check_end_turn().is_ok() {
            actions.push(Action::EndTurn);
        }
        actions
    }

    /// Cells the current player could stop on with the moves left.
    pub fn reachable_cells(&self) -> BTreeSet<Coord2> {
        let mut reachable = BTreeSet::new();
        if !self.phase.is_moving() {
            return reachable;
        }
        let piece = self.current_piece();
        let Ok(start) = self.board.position(piece) else {
            return reachable;
        };
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([(start, 0u8)]);
        while let Some((coords, steps)) = to_visit.pop_front() {
            if steps >= self.remaining_moves {
                continue;
            }
            let here = self.room_of(coords);
            for dir in Direction::ALL {
                let Ok(next) = self.board.check_step_from(piece, coords, dir) else {
                    continue;
                };
                if !visited.insert(next) {
                    continue;
                }
                reachable.insert(next);

                let there = self.room_of(next);
                let entered_room = there.is_some() && there != here;
                if !entered_room {
                    to_visit.push_back((next, steps + 1));
                }
            }
        }
        reachable
    }
}

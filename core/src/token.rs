use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

/// Playable characters, listed in canonical clockwise seating order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suspect {
    Scarlett,
    Mustard,
    White,
    Green,
    Peacock,
    Plum,
}

impl Suspect {
    pub const ALL: [Suspect; 6] = [
        Self::Scarlett,
        Self::Mustard,
        Self::White,
        Self::Green,
        Self::Peacock,
        Self::Plum,
    ];

    /// Slot in the clockwise seating order.
    pub const fn slot(self) -> usize {
        self as usize
    }

    pub const fn from_slot(slot: usize) -> Self {
        Self::ALL[slot % Self::ALL.len()]
    }

    pub const fn name(self) -> &'static str {
        use Suspect::*;
        match self {
            Scarlett => "Miss Scarlett",
            Mustard => "Colonel Mustard",
            White => "Mrs. White",
            Green => "Reverend Green",
            Peacock => "Mrs. Peacock",
            Plum => "Professor Plum",
        }
    }

    const fn key(self) -> &'static str {
        use Suspect::*;
        match self {
            Scarlett => "scarlett",
            Mustard => "mustard",
            White => "white",
            Green => "green",
            Peacock => "peacock",
            Plum => "plum",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Candlestick,
    Dagger,
    LeadPipe,
    Revolver,
    Rope,
    Wrench,
}

impl Weapon {
    pub const ALL: [Weapon; 6] = [
        Self::Candlestick,
        Self::Dagger,
        Self::LeadPipe,
        Self::Revolver,
        Self::Rope,
        Self::Wrench,
    ];

    pub const fn name(self) -> &'static str {
        use Weapon::*;
        match self {
            Candlestick => "Candlestick",
            Dagger => "Dagger",
            LeadPipe => "Lead Pipe",
            Revolver => "Revolver",
            Rope => "Rope",
            Wrench => "Wrench",
        }
    }

    const fn key(self) -> &'static str {
        use Weapon::*;
        match self {
            Candlestick => "candlestick",
            Dagger => "dagger",
            LeadPipe => "pipe",
            Revolver => "revolver",
            Rope => "rope",
            Wrench => "wrench",
        }
    }
}

fn matches_name(input: &str, key: &str, name: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case(key) || input.eq_ignore_ascii_case(name)
}

impl FromStr for Suspect {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|suspect| matches_name(s, suspect.key(), suspect.name()))
            .ok_or(GameError::UnknownName)
    }
}

impl FromStr for Weapon {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|weapon| matches_name(s, weapon.key(), weapon.name()))
            .ok_or(GameError::UnknownName)
    }
}

impl fmt::Display for Suspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle to a token on the board, allocated by [`Board::add_piece`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(u16);

impl PieceId {
    pub(crate) const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub(crate) fn new(index: usize) -> Result<Self> {
        u16::try_from(index)
            .map(Self)
            .map_err(|_| GameError::TooManyPieces)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Logical owner of a piece for the whole game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceOwner {
    Suspect(Suspect),
    Weapon(Weapon),
}

impl From<Suspect> for PieceOwner {
    fn from(suspect: Suspect) -> Self {
        Self::Suspect(suspect)
    }
}

impl From<Weapon> for PieceOwner {
    fn from(weapon: Weapon) -> Self {
        Self::Weapon(weapon)
    }
}

/// Identity of a card; a host keys its card faces on this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Card {
    Suspect(Suspect),
    Weapon(Weapon),
    Room(Room),
}

impl Card {
    /// The full deck: six suspects, six weapons, nine rooms.
    pub fn all() -> impl Iterator<Item = Card> {
        Suspect::ALL
            .into_iter()
            .map(Card::Suspect)
            .chain(Weapon::ALL.into_iter().map(Card::Weapon))
            .chain(Room::ALL.into_iter().map(Card::Room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_ids_fit_in_sixteen_bits() {
        assert_eq!(PieceId::new(7).map(PieceId::index), Ok(7));
        assert_eq!(PieceId::new(70_000), Err(GameError::TooManyPieces));
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("SCARLETT".parse::<Suspect>(), Ok(Suspect::Scarlett));
        assert_eq!("professor plum".parse::<Suspect>(), Ok(Suspect::Plum));
        assert_eq!("lead pipe".parse::<Weapon>(), Ok(Weapon::LeadPipe));
        assert_eq!("pipe".parse::<Weapon>(), Ok(Weapon::LeadPipe));
        assert_eq!("spoon".parse::<Weapon>(), Err(GameError::UnknownName));
    }

    #[test]
    fn slots_wrap_around_the_table() {
        assert_eq!(Suspect::from_slot(Suspect::Plum.slot() + 1), Suspect::Scarlett);
        assert_eq!(Suspect::from_slot(2), Suspect::White);
    }

    #[test]
    fn deck_has_twenty_one_distinct_cards() {
        let deck: alloc::collections::BTreeSet<Card> = Card::all().collect();
        assert_eq!(deck.len(), 21);
    }
}

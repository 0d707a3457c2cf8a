//! Board geometry: colors, the shared ring, home paths and position codes.
//!
//! Positions are stored as compact codes so that a `GameState` serializes to
//! the same blob shape regardless of storage backend:
//! `-1` yard, `0..=51` absolute ring square, `101..=106` home path, `107` home.

use serde::{Deserialize, Serialize};

pub const TRACK_LEN: i16 = 52;
pub const YARD: i16 = -1;
pub const HOME_PATH_START: i16 = 101;
pub const HOME_PATH_END: i16 = 106;
pub const HOME: i16 = 107;
pub const TOKENS_PER_PLAYER: usize = 4;

/// Squares on which no token can be captured.
pub const SAFE_ZONES: [i16; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

/// Last ring square a token visits before turning into its home path,
/// measured from the color's own start square.
pub const HOME_ENTRY_RELATIVE: i16 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub const fn start_square(self) -> i16 {
        match self {
            Color::Red => 0,
            Color::Green => 13,
            Color::Yellow => 26,
            Color::Blue => 39,
        }
    }

    /// Absolute ring index of the home-entry square (RED 50, GREEN 11, YELLOW 24, BLUE 37).
    pub const fn home_entry(self) -> i16 {
        (self.start_square() + HOME_ENTRY_RELATIVE) % TRACK_LEN
    }

    /// Distance travelled from this color's start square to `square`.
    pub fn relative(self, square: i16) -> i16 {
        (square - self.start_square()).rem_euclid(TRACK_LEN)
    }
}

/// Decoded form of a position code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Yard,
    Track(i16),
    HomePath(i16),
    Home,
}

impl Position {
    pub fn from_code(code: i16) -> Option<Position> {
        match code {
            YARD => Some(Position::Yard),
            0..=51 => Some(Position::Track(code)),
            HOME_PATH_START..=HOME_PATH_END => Some(Position::HomePath(code)),
            HOME => Some(Position::Home),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Position::Yard => YARD,
            Position::Track(square) | Position::HomePath(square) => square,
            Position::Home => HOME,
        }
    }
}

pub fn is_valid_code(code: i16) -> bool {
    Position::from_code(code).is_some()
}

pub fn is_safe(square: i16) -> bool {
    SAFE_ZONES.contains(&square)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_entries_per_color() {
        assert_eq!(Color::Red.home_entry(), 50);
        assert_eq!(Color::Green.home_entry(), 11);
        assert_eq!(Color::Yellow.home_entry(), 24);
        assert_eq!(Color::Blue.home_entry(), 37);
    }

    #[test]
    fn relative_wraps_around_the_ring() {
        assert_eq!(Color::Yellow.relative(26), 0);
        assert_eq!(Color::Yellow.relative(0), 26);
        assert_eq!(Color::Yellow.relative(24), 50);
        assert_eq!(Color::Red.relative(51), 51);
    }

    #[test]
    fn code_ranges() {
        assert_eq!(Position::from_code(-1), Some(Position::Yard));
        assert_eq!(Position::from_code(51), Some(Position::Track(51)));
        assert_eq!(Position::from_code(52), None);
        assert_eq!(Position::from_code(100), None);
        assert_eq!(Position::from_code(104), Some(Position::HomePath(104)));
        assert_eq!(Position::from_code(107), Some(Position::Home));
        assert_eq!(Position::from_code(108), None);
    }

    #[test]
    fn colors_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Color::Yellow).unwrap(), "\"YELLOW\"");
    }
}

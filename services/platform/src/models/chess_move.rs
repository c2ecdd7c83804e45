//! Move model: squares, result marks and plies

use serde::{Deserialize, Serialize};

/// Number of files and ranks on the board
pub const BOARD_SIZE: u8 = 8;

/// Side of the board a participant plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other side
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Side to move after `turn` plies have been played
    #[must_use]
    pub const fn to_move(turn: u32) -> Self {
        if turn % 2 == 0 { Self::White } else { Self::Black }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// A board square as zero-based (file, rank) indices
///
/// Rank index 0 is the far rank "8" and rank index 7 is rank "1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    file: u8,
    rank: u8,
}

/// Unchecked wire shape of a [`Square`]
#[derive(Deserialize)]
struct RawSquare {
    file: u8,
    rank: u8,
}

impl TryFrom<RawSquare> for Square {
    type Error = String;

    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        Self::new(raw.file, raw.rank)
            .ok_or_else(|| format!("square ({}, {}) is off the board", raw.file, raw.rank))
    }
}

impl Square {
    /// Create a square, `None` if either index is off the board
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_SIZE && rank < BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Parse a square from its file letter and rank digit
    #[must_use]
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        if !file.is_ascii_lowercase() {
            return None;
        }
        let file = (file as u8).checked_sub(b'a')?;
        let digit = rank.to_digit(10)? as u8;
        // '0' maps to rank index 8 and is rejected by `new`
        let rank = BOARD_SIZE.checked_sub(digit)?;
        Self::new(file, rank)
    }

    /// Parse a square written as e.g. "e2"
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Self::from_chars(file, rank),
            _ => None,
        }
    }

    pub const fn file(&self) -> u8 {
        self.file
    }

    pub const fn rank(&self) -> u8 {
        self.rank
    }

    /// File letter, 'a' for file index 0
    pub const fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    /// Rank digit, '8' for rank index 0
    pub const fn rank_char(&self) -> char {
        (b'0' + BOARD_SIZE - self.rank) as char
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// Result mark attached to a ply
///
/// Check, mate and stalemate are mutually exclusive: mate and stalemate
/// override check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    #[default]
    None,
    Check,
    Mate,
    Stalemate,
}

/// The notational part of a ply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Piece letter; case encodes the side
    pub piece: char,
    pub from: Square,
    pub to: Square,
    /// Accepted here but never carried by the textual notation
    pub promotion: Option<char>,
    pub capture: bool,
    pub mark: Mark,
}

impl Move {
    /// A quiet move with no capture, mark or promotion
    pub fn new(piece: char, from: Square, to: Square) -> Self {
        Self {
            piece,
            from,
            to,
            promotion: None,
            capture: false,
            mark: Mark::None,
        }
    }

    #[must_use]
    pub fn with_capture(mut self) -> Self {
        self.capture = true;
        self
    }

    #[must_use]
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = mark;
        self
    }

    #[must_use]
    pub fn with_promotion(mut self, piece: char) -> Self {
        self.promotion = Some(piece);
        self
    }

    pub fn is_check(&self) -> bool {
        self.mark == Mark::Check
    }

    pub fn is_mate(&self) -> bool {
        self.mark == Mark::Mate
    }

    pub fn is_stalemate(&self) -> bool {
        self.mark == Mark::Stalemate
    }
}

/// A move as played: notation plus the time it took and who made it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ply {
    pub chess_move: Move,
    /// Time units spent on this ply
    pub elapsed: u64,
    /// Username of the acting player
    pub player: String,
}

impl Ply {
    pub fn new(chess_move: Move, elapsed: u64, player: impl Into<String>) -> Self {
        Self {
            chess_move,
            elapsed,
            player: player.into(),
        }
    }
}

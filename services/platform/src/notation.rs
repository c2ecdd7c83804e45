//! Compact move notation
//!
//! A move is written as the piece letter, the start square, an optional `x`
//! for a capture, the destination square and at most one result marker
//! (`#` mate, `+` check, `$` stalemate), e.g. `Ne2f4` or `qd8xh4#`. The
//! piece is any ASCII letter except `x`.
//!
//! Promotion is accepted on [`Move`] but is not part of the text, so decoding
//! always yields `promotion: None`.

use std::str::FromStr;

use crate::error::{PlatformError, PlatformResult};
use crate::models::{Mark, Move, Square};

pub const CAPTURE: char = 'x';
pub const MATE: char = '#';
pub const CHECK: char = '+';
pub const STALEMATE: char = '$';

/// Separator between plies in a stored history; never emitted by [`encode`]
pub const HISTORY_DELIMITER: char = ' ';

/// Encode a move into its compact notation
///
/// Fails with `MalformedNotation` when the piece is not a letter or is the
/// capture marker, since such text would not decode back to the same move.
pub fn encode(chess_move: &Move) -> PlatformResult<String> {
    check_piece(chess_move.piece)?;

    let mut text = String::with_capacity(7);
    text.push(chess_move.piece);
    text.push(chess_move.from.file_char());
    text.push(chess_move.from.rank_char());
    if chess_move.capture {
        text.push(CAPTURE);
    }
    text.push(chess_move.to.file_char());
    text.push(chess_move.to.rank_char());

    match chess_move.mark {
        Mark::Mate => text.push(MATE),
        Mark::Check => text.push(CHECK),
        Mark::Stalemate => text.push(STALEMATE),
        Mark::None => {}
    }

    Ok(text)
}

/// Check that a piece letter survives an encode/decode cycle
pub fn check_piece(piece: char) -> PlatformResult<()> {
    if piece.is_ascii_alphabetic() && piece != CAPTURE {
        Ok(())
    } else {
        Err(PlatformError::MalformedNotation(format!(
            "{:?} is not a piece letter",
            piece
        )))
    }
}

/// Decode compact notation back into a move
///
/// Capture and result markers are detected wherever they appear. If several
/// result markers are present the one `encode` would pick wins.
pub fn decode(text: &str) -> PlatformResult<Move> {
    let (mut capture, mut mate, mut check, mut stalemate) = (false, false, false, false);

    let body: Vec<char> = text
        .chars()
        .filter(|c| match *c {
            CAPTURE => {
                capture = true;
                false
            }
            MATE => {
                mate = true;
                false
            }
            CHECK => {
                check = true;
                false
            }
            STALEMATE => {
                stalemate = true;
                false
            }
            _ => true,
        })
        .collect();

    let &[piece, from_file, from_rank, to_file, to_rank] = body.as_slice() else {
        return Err(malformed(text, "expected a piece letter and two squares"));
    };

    if !piece.is_ascii_alphabetic() {
        return Err(malformed(text, "piece must be a letter"));
    }

    let from = Square::from_chars(from_file, from_rank)
        .ok_or_else(|| malformed(text, "invalid start square"))?;
    let to = Square::from_chars(to_file, to_rank)
        .ok_or_else(|| malformed(text, "invalid destination square"))?;

    let mark = if mate {
        Mark::Mate
    } else if check {
        Mark::Check
    } else if stalemate {
        Mark::Stalemate
    } else {
        Mark::None
    };

    Ok(Move {
        piece,
        from,
        to,
        promotion: None,
        capture,
        mark,
    })
}

/// Join encoded moves into a history string
pub fn encode_history(moves: &[Move]) -> PlatformResult<String> {
    let mut history = String::new();
    for chess_move in moves {
        append_to_history(&mut history, &encode(chess_move)?);
    }
    Ok(history)
}

/// Append one encoded ply to a history string
pub fn append_to_history(history: &mut String, token: &str) {
    if !history.is_empty() {
        history.push(HISTORY_DELIMITER);
    }
    history.push_str(token);
}

/// Decode every ply of a history string, in order
pub fn decode_history(history: &str) -> PlatformResult<Vec<Move>> {
    history
        .split(HISTORY_DELIMITER)
        .filter(|token| !token.is_empty())
        .map(decode)
        .collect()
}

fn malformed(text: &str, reason: &str) -> PlatformError {
    PlatformError::MalformedNotation(format!("'{}': {}", text, reason))
}

impl FromStr for Move {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

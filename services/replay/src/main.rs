//! Decode a stored ply history and print it ply by ply
//!
//! Usage: `replay [--json] [HISTORY...]`. Without HISTORY the history is
//! read from stdin.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use tracing::{debug, info};

use common::telemetry::{TelemetryConfig, init_tracing};
use platform::models::{Mark, Move, Side};
use platform::notation;

/// One decoded ply, as printed with `--json`
#[derive(Debug, Serialize)]
struct ReplayedPly {
    ply: u32,
    side: Side,
    notation: String,
    #[serde(flatten)]
    chess_move: Move,
}

fn describe(ply: &ReplayedPly) -> String {
    let m = &ply.chess_move;
    let mut line = format!(
        "{:>3}. {} {} {} {} {}",
        ply.ply,
        ply.side,
        m.piece,
        m.from,
        if m.capture { "x" } else { "-" },
        m.to
    );
    match m.mark {
        Mark::Check => line.push_str(" check"),
        Mark::Mate => line.push_str(" mate"),
        Mark::Stalemate => line.push_str(" stalemate"),
        Mark::None => {}
    }
    line
}

fn read_history(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(&notation::HISTORY_DELIMITER.to_string()));
    }

    let mut history = String::new();
    std::io::stdin()
        .read_to_string(&mut history)
        .context("Failed to read history from stdin")?;
    Ok(history
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&notation::HISTORY_DELIMITER.to_string()))
}

fn main() -> Result<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = match args.iter().position(|arg| arg == "--json") {
        Some(idx) => {
            args.remove(idx);
            true
        }
        None => false,
    };

    let history = read_history(&args)?;
    debug!("Replaying history: {}", history);

    let moves = notation::decode_history(&history).context("Failed to decode history")?;
    let plies = moves
        .into_iter()
        .enumerate()
        .map(|(idx, chess_move)| {
            let ply = idx as u32;
            Ok(ReplayedPly {
                ply: ply + 1,
                side: Side::to_move(ply),
                notation: notation::encode(&chess_move)?,
                chess_move,
            })
        })
        .collect::<platform::PlatformResult<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plies)?);
    } else {
        for ply in &plies {
            println!("{}", describe(ply));
        }
    }

    info!("Replayed {} plies", plies.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replayed(text: &str, ply: u32) -> ReplayedPly {
        ReplayedPly {
            ply,
            side: Side::to_move(ply - 1),
            notation: text.to_string(),
            chess_move: text.parse().unwrap(),
        }
    }

    #[test]
    fn test_describe_quiet_move() {
        assert_eq!(describe(&replayed("Ne2f4", 1)), "  1. white N e2 - f4");
    }

    #[test]
    fn test_describe_capture_with_mark() {
        assert_eq!(describe(&replayed("qd8xh4#", 4)), "  4. black q d8 x h4 mate");
    }

    #[test]
    fn test_read_history_joins_arguments() {
        let args = vec!["Pe2e4".to_string(), "pe7e5".to_string()];
        assert_eq!(read_history(&args).unwrap(), "Pe2e4 pe7e5");
    }
}

//! Minimal engine speaking the Kalmia line protocol, playing random legal moves.
//!
//! Used as a stand-in engine in tests. Flags:
//! - `--crash-on-go`: exit without answering `go`
//! - `--ignore-quit`: keep running after `quit`
//! - `--exit-on-usi`: exit before acknowledging `usi`

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use reversi_core::{DiscColor, Move, Position};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Default)]
struct Flags {
    crash_on_go: bool,
    ignore_quit: bool,
    exit_on_usi: bool,
}

impl Flags {
    fn from_args() -> Self {
        let mut flags = Flags::default();
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--crash-on-go" => flags.crash_on_go = true,
                "--ignore-quit" => flags.ignore_quit = true,
                "--exit-on-usi" => flags.exit_on_usi = true,
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }
        flags
    }
}

fn pick_move(pos: &Position) -> Move {
    let moves = pos.legal_moves();
    moves
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(Move::Pass)
}

/// Disc difference from the side to move's point of view.
fn disc_diff(pos: &Position) -> i64 {
    let side: DiscColor = pos.side_to_move();
    i64::from(pos.disc_count(side)) - i64::from(pos.disc_count(side.opponent()))
}

fn write_search_result(out: &mut impl Write, pos: &Position) -> Result<()> {
    let mv = pick_move(pos);
    writeln!(
        out,
        "info depth 1 nodes {} nps 1 score {} pv {mv}",
        pos.legal_moves().len(),
        disc_diff(pos)
    )?;
    writeln!(out, "bestmove {mv}")?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("random_usi=info".parse()?))
        .init();

    let flags = Flags::from_args();
    let stdin = io::stdin();
    let mut out = io::stdout();

    let mut pos = Position::new();
    let mut pondering = false;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            continue;
        };

        match command {
            "usi" => {
                if flags.exit_on_usi {
                    return Ok(());
                }
                writeln!(out, "id name RandomUSI 0.1")?;
                writeln!(out, "id author Kalmia")?;
                writeln!(out, "option name playout type spin default 3200")?;
                writeln!(out, "usiok")?;
                out.flush()?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
                out.flush()?;
            }
            "setoption" => {
                // setoption name <n> value <v>
                tracing::debug!(
                    option = parts.get(2).copied(),
                    value = parts.get(4).copied(),
                    "option set"
                );
            }
            "usinewgame" => pos = Position::new(),
            "position" => match parts.get(2).map(|s| Position::from_encoded(s)) {
                Some(Ok(decoded)) => pos = decoded,
                Some(Err(e)) => tracing::warn!(error = %e, "bad position"),
                None => tracing::warn!("position without board"),
            },
            "score_scale_and_type" => {
                writeln!(out, "scoretype stone min -64 max 64")?;
                out.flush()?;
            }
            "go" => {
                if flags.crash_on_go {
                    return Ok(());
                }
                if parts.get(1) == Some(&"ponder") {
                    pondering = true;
                    writeln!(out, "info depth 1 score {}", disc_diff(&pos))?;
                    out.flush()?;
                } else {
                    write_search_result(&mut out, &pos)?;
                }
            }
            "stop" => {
                if pondering {
                    pondering = false;
                    write_search_result(&mut out, &pos)?;
                }
            }
            "gameover" => tracing::info!(result = parts.get(1).copied(), "game over"),
            "quit" => {
                if !flags.ignore_quit {
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

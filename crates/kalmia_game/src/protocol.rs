//! Line protocol spoken with the engine over stdin/stdout.
//!
//! Engine output is tokenized on whitespace and the first token selects a
//! handler. Unknown commands and malformed fields are absorbed here and never
//! reach the read loop as errors.

use reversi_core::{parse_move, Move, Position};
use std::fmt;

/// Scale an engine reports evaluation scores on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreType {
    /// Win probability in percent
    #[default]
    WinRate,
    /// Expected final disc difference
    DiscDiff,
    Other,
}

impl ScoreType {
    pub fn from_token(token: &str) -> ScoreType {
        match token {
            "WP" => ScoreType::WinRate,
            "stone" => ScoreType::DiscDiff,
            _ => ScoreType::Other,
        }
    }
}

/// Score scale metadata declared by `scoretype`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreScale {
    pub kind: ScoreType,
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            kind: ScoreType::WinRate,
            min: 0.0,
            max: 100.0,
        }
    }
}

/// Telemetry carried by one `info` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    pub multipv: Option<u32>,
    pub nps: Option<u64>,
    pub nodes: Option<u64>,
    pub depth: Option<u32>,
    pub score: Option<f64>,
    /// Principal variation, best line first
    pub pv: Vec<Move>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    Name,
    Author,
}

/// A parsed line of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    Id { field: IdField, value: String },
    UsiOk,
    ReadyOk,
    /// None when the token is missing or not a coordinate
    BestMove(Option<Move>),
    Info(SearchInfo),
    Option,
    ScoreType {
        kind: ScoreType,
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// Parse one output line. Returns None for blank lines, unknown commands and
/// `id` lines without a value.
pub fn parse_line(line: &str) -> Option<EngineMessage> {
    let mut tokens = line.split_whitespace();
    let command = tokens.next()?;
    match command {
        "id" => parse_id(tokens),
        "usiok" => Some(EngineMessage::UsiOk),
        "readyok" => Some(EngineMessage::ReadyOk),
        "bestmove" => Some(EngineMessage::BestMove(tokens.next().and_then(parse_move))),
        "info" => Some(EngineMessage::Info(parse_info(tokens))),
        "option" => Some(EngineMessage::Option),
        "scoretype" => Some(parse_score_type(tokens)),
        _ => None,
    }
}

fn parse_id<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<EngineMessage> {
    let field = match tokens.next()? {
        "name" => IdField::Name,
        "author" => IdField::Author,
        _ => return None,
    };
    let value = tokens.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return None;
    }
    Some(EngineMessage::Id { field, value })
}

fn parse_info<'a>(mut tokens: impl Iterator<Item = &'a str>) -> SearchInfo {
    let mut info = SearchInfo::default();
    while let Some(token) = tokens.next() {
        match token {
            "score" => info.score = tokens.next().and_then(|v| v.parse().ok()).or(info.score),
            "depth" => info.depth = tokens.next().and_then(|v| v.parse().ok()).or(info.depth),
            "nps" => info.nps = tokens.next().and_then(|v| v.parse().ok()).or(info.nps),
            "nodes" => info.nodes = tokens.next().and_then(|v| v.parse().ok()).or(info.nodes),
            "multipv" => {
                info.multipv = tokens.next().and_then(|v| v.parse().ok()).or(info.multipv)
            }
            "pv" => {
                // the rest of the line is the variation, up to the first non-move
                for token in tokens.by_ref() {
                    match parse_move(token) {
                        Some(mv) => info.pv.push(mv),
                        None => break,
                    }
                }
                break;
            }
            _ => {}
        }
    }
    info
}

fn parse_score_type<'a>(mut tokens: impl Iterator<Item = &'a str>) -> EngineMessage {
    let kind = ScoreType::from_token(tokens.next().unwrap_or_default());
    let mut min = None;
    let mut max = None;
    while let Some(token) = tokens.next() {
        match token {
            "min" => {
                if let Some(v) = tokens.next().and_then(|v| v.parse().ok()) {
                    min = Some(v);
                }
            }
            "max" => {
                if let Some(v) = tokens.next().and_then(|v| v.parse().ok()) {
                    max = Some(v);
                }
            }
            _ => {}
        }
    }
    EngineMessage::ScoreType { kind, min, max }
}

/// Result reported to the engine by `gameover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverKind {
    Win,
    Lose,
    Draw,
}

/// A command sent to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Usi,
    IsReady,
    SetOption { name: String, value: String },
    UsiNewGame,
    Position(String),
    ScoreScaleAndType,
    Go,
    GoPonder,
    Stop,
    GameOver(GameOverKind),
    Quit,
}

impl Command {
    /// `setoption` with the value rendered lowercase.
    pub fn set_option(name: &str, value: impl fmt::Display) -> Command {
        Command::SetOption {
            name: name.to_string(),
            value: value.to_string().to_lowercase(),
        }
    }

    pub fn position(pos: &Position) -> Command {
        Command::Position(pos.to_encoded())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Usi => write!(f, "usi"),
            Command::IsReady => write!(f, "isready"),
            Command::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            Command::UsiNewGame => write!(f, "usinewgame"),
            Command::Position(encoded) => write!(f, "position sfen {encoded}"),
            Command::ScoreScaleAndType => write!(f, "score_scale_and_type"),
            Command::Go => write!(f, "go"),
            Command::GoPonder => write!(f, "go ponder"),
            Command::Stop => write!(f, "stop"),
            Command::GameOver(kind) => {
                let text = match kind {
                    GameOverKind::Win => "win",
                    GameOverKind::Lose => "lose",
                    GameOverKind::Draw => "draw",
                };
                write!(f, "gameover {text}")
            }
            Command::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

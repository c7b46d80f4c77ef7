//! Game record storage

use reversi_core::{DiscColor, Move, Position, PositionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RecordError;

fn initial_board() -> String {
    Position::new().to_encoded()
}

/// A finished or suspended game, as saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Name of the player with the black discs
    pub black: String,
    pub white: String,
    /// Encoded board the game started from
    #[serde(default = "initial_board")]
    pub start: String,
    /// Moves in coordinate text, passes included
    pub moves: Vec<String>,
    pub black_discs: u32,
    pub white_discs: u32,
    /// "black", "white", "draw", or None while the game is unfinished
    pub result: Option<String>,
}

impl GameRecord {
    pub fn new(
        black: &str,
        white: &str,
        start: &Position,
        moves: &[Move],
        position: &Position,
    ) -> Self {
        let result = position.game_result().map(|r| match r.winner {
            Some(DiscColor::Black) => "black".to_string(),
            Some(DiscColor::White) => "white".to_string(),
            None => "draw".to_string(),
        });
        Self {
            black: black.to_string(),
            white: white.to_string(),
            start: start.to_encoded(),
            moves: moves.iter().map(Move::to_string).collect(),
            black_discs: position.disc_count(DiscColor::Black),
            white_discs: position.disc_count(DiscColor::White),
            result,
        }
    }

    /// Replay the recorded moves from the starting position.
    pub fn replay(&self) -> Result<Position, PositionError> {
        let mut pos = Position::from_encoded(&self.start)?;
        for text in &self.moves {
            let mv: Move = text.parse()?;
            pos.update(mv)?;
        }
        Ok(pos)
    }

    /// Save record to JSON file
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| RecordError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load record from JSON file
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RecordError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_replays_to_same_position() {
        let start = Position::new();
        let mut pos = start.clone();
        let moves: Vec<Move> = ["f5", "d6", "c3"].iter().map(|s| s.parse().unwrap()).collect();
        for mv in &moves {
            pos.update(*mv).unwrap();
        }

        let record = GameRecord::new("Human", "Kalmia", &start, &moves, &pos);
        assert_eq!(record.moves, vec!["f5", "d6", "c3"]);
        assert_eq!(record.result, None);
        assert_eq!(record.black_discs + record.white_discs, 7);
        assert_eq!(record.replay().unwrap(), pos);
    }

    #[test]
    fn test_replay_starts_from_recorded_board() {
        let mut start = Position::new();
        start.update("f5".parse().unwrap()).unwrap();
        let mut pos = start.clone();
        let moves: Vec<Move> = ["d6", "c3"].iter().map(|s| s.parse().unwrap()).collect();
        for mv in &moves {
            pos.update(*mv).unwrap();
        }

        let record = GameRecord::new("Human", "Kalmia", &start, &moves, &pos);
        assert_eq!(record.replay().unwrap(), pos);
    }

    #[test]
    fn test_missing_start_defaults_to_initial_board() {
        let json = r#"{"black":"A","white":"B","moves":["f5"],"black_discs":4,"white_discs":1,"result":null}"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.start, Position::new().to_encoded());
        assert_eq!(record.replay().unwrap().disc_count(DiscColor::Black), 4);
    }

    #[test]
    fn test_save_and_load() {
        let start = Position::new();
        let record = GameRecord::new("Human", "Kalmia", &start, &[], &start);
        let path = std::env::temp_dir().join(format!("kalmia_record_{}.json", std::process::id()));

        record.save(&path).unwrap();
        let loaded = GameRecord::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_reports_parse_failure() {
        let path = std::env::temp_dir().join(format!("kalmia_bad_{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let err = GameRecord::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, RecordError::Json(_)));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let path = std::env::temp_dir().join("kalmia_record_does_not_exist.json");
        let err = GameRecord::load(&path).unwrap_err();
        assert!(matches!(err, RecordError::Read { .. }));
    }
}

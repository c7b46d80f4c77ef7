//! Game configuration loaded from TOML.
//!
//! Every struct is passed explicitly at construction; missing fields fall
//! back to their defaults so a partial file is enough.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// How to launch one engine subprocess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path of the engine executable
    pub path: PathBuf,
    /// Extra command line arguments
    pub args: Vec<String>,
    /// Working directory (None = the executable's own directory)
    pub work_dir: Option<PathBuf>,
    /// How long `quit` waits for a clean exit before killing the process
    pub quit_timeout_ms: u64,
    /// How long stopping a ponder waits for the closing best move
    pub ponder_stop_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("engine/Kalmia"),
            args: Vec::new(),
            work_dir: None,
            quit_timeout_ms: 10_000,
            ponder_stop_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn quit_timeout(&self) -> Duration {
        Duration::from_millis(self.quit_timeout_ms)
    }

    pub fn ponder_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.ponder_stop_timeout_ms)
    }

    /// Directory the engine runs in.
    pub fn resolved_work_dir(&self) -> Option<PathBuf> {
        match &self.work_dir {
            Some(dir) => Some(dir.clone()),
            None => self
                .path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf),
        }
    }
}

fn hardware_threads() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Search options sent to an engine playing as a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub playout: u32,
    pub stochastic_move_num: u32,
    pub softmax_temperature: f64,
    pub thread_num: u32,
    pub enable_extra_search: bool,
    pub reuse_subtree: bool,
    pub node_num_limit: u64,
    /// Move number from which the engine switches to exact endgame search (-1 = engine default)
    pub endgame_move_num: i32,
    pub endgame_tt_size_mib: u32,
    pub show_search_info_interval_cs: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            playout: 3200,
            stochastic_move_num: 0,
            softmax_temperature: 1.0,
            thread_num: hardware_threads(),
            enable_extra_search: false,
            reuse_subtree: true,
            node_num_limit: 200_000_000,
            endgame_move_num: -1,
            endgame_tt_size_mib: 256,
            show_search_info_interval_cs: 10,
        }
    }
}

impl EngineOptions {
    /// Options as (name, value) pairs in the order they are sent.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("playout", self.playout.to_string()),
            ("stochastic_move_num", self.stochastic_move_num.to_string()),
            ("softmax_temperature", self.softmax_temperature.to_string()),
            ("thread_num", self.thread_num.to_string()),
            ("enable_extra_search", self.enable_extra_search.to_string()),
            ("reuse_subtree", self.reuse_subtree.to_string()),
            ("node_num_limit", self.node_num_limit.to_string()),
            ("endgame_move_num", self.endgame_move_num.to_string()),
            ("endgame_tt_size_mib", self.endgame_tt_size_mib.to_string()),
            (
                "show_search_info_interval_cs",
                self.show_search_info_interval_cs.to_string(),
            ),
        ]
    }
}

/// Search options for the evaluation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    pub playout: u32,
    pub node_num_limit: u64,
    pub thread_num: u32,
    pub show_search_info_interval_cs: u32,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            playout: 3200,
            node_num_limit: 200_000_000,
            thread_num: hardware_threads(),
            show_search_info_interval_cs: 10,
        }
    }
}

impl EvaluatorOptions {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("playout", self.playout.to_string()),
            ("node_num_limit", self.node_num_limit.to_string()),
            ("thread_num", self.thread_num.to_string()),
            (
                "show_search_info_interval_cs",
                self.show_search_info_interval_cs.to_string(),
            ),
        ]
    }
}

/// Everything needed to set up a human vs engine game with evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub player: EngineOptions,
    pub evaluator: EvaluatorOptions,
    pub game: GameManagerConfig,
}

/// Settings for the game loop itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameManagerConfig {
    /// How long `suspend` waits for the loop to stop
    pub suspend_timeout_ms: u64,
}

impl Default for GameManagerConfig {
    fn default() -> Self {
        Self {
            suspend_timeout_ms: 10_000,
        }
    }
}

impl GameManagerConfig {
    pub fn suspend_timeout(&self) -> Duration {
        Duration::from_millis(self.suspend_timeout_ms)
    }
}

impl GameConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

use crate::grid::check_board;
use crate::{Result, Topology};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything needed to start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub topology: Topology,
    pub width: u32,
    pub height: u32,
    pub mine_count: u32,
    /// Countdown length in seconds.
    pub time_limit: u32,
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        check_board(self.width, self.height, self.mine_count)?;
        Ok(())
    }

    pub fn preset(topology: Topology, difficulty: Difficulty) -> Self {
        use Difficulty::*;

        let (width, height, mine_count, time_limit) = match (topology, difficulty) {
            (Topology::Orthogonal, Easy) => (10, 10, 8, 120),
            (Topology::Hex, Easy) => (15, 15, 10, 120),
            (_, Medium) => (20, 20, 30, 300),
            (_, Hard) => (30, 30, 100, 600),
            (_, SuperHard) => (30, 30, 200, 600),
        };
        Self {
            topology,
            width,
            height,
            mine_count,
            time_limit,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Topology::default(), Difficulty::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    SuperHard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::SuperHard,
    ];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::SuperHard => "super-hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty {0:?}")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            "super-hard" | "superhard" | "s" => Ok(Difficulty::SuperHard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

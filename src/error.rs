use crate::Position;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// The concrete reason a board could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board size {width}x{height} has no cells")]
    EmptyBoard { width: u32, height: u32 },
    #[error("board size {width}x{height} is too large")]
    BoardTooLarge { width: u32, height: u32 },
    #[error("too many mines ({mines}) for board size {width}x{height}")]
    TooManyMines { width: u32, height: u32, mines: u32 },
    #[error("mine at {0:?} is outside the board")]
    MineOutOfBounds(Position),
    #[error("mine at {0:?} is listed twice")]
    DuplicateMine(Position),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("failed to write score: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode score: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod position;
pub mod score;
pub mod session;
pub mod topology;

pub use cell::Cell;
pub use config::{Difficulty, GameConfig};
pub use error::{ConfigError, GameError, Result, ScoreError};
pub use grid::{FlagOutcome, Grid, RevealOutcome};
pub use position::Position;
pub use score::{HighScores, JsonLinesSink, ScoreRecord, ScoreSink};
pub use session::{Session, Status, Step};
pub use topology::{Adjacency, HexColumns, Orthogonal, Topology};

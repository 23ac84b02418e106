use crate::{ScoreError, Topology};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

/// A won game, as handed to whatever keeps the high-score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub topology: Topology,
    pub width: u32,
    pub height: u32,
    pub mine_count: u32,
    /// Seconds left on the clock; higher is better.
    pub score: u32,
    pub player_name: String,
}

impl ScoreRecord {
    /// Same topology, dimensions and mine count.
    pub fn same_board(&self, other: &ScoreRecord) -> bool {
        self.topology == other.topology
            && self.width == other.width
            && self.height == other.height
            && self.mine_count == other.mine_count
    }
}

pub trait ScoreSink {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), ScoreError>;
}

/// In-memory high-score table, best score first.
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    records: Vec<ScoreRecord>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn for_topology(&self, topology: Topology) -> impl Iterator<Item = &ScoreRecord> {
        self.records.iter().filter(move |r| r.topology == topology)
    }

    /// Best score recorded on the same kind of board as `record`.
    pub fn best_for(&self, record: &ScoreRecord) -> Option<&ScoreRecord> {
        self.records.iter().find(|r| r.same_board(record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ScoreSink for HighScores {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), ScoreError> {
        // Ties keep submission order.
        let at = self.records.partition_point(|r| r.score >= record.score);
        self.records.insert(at, record);
        Ok(())
    }
}

/// Appends each record as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ScoreSink for JsonLinesSink<W> {
    fn submit(&mut self, record: ScoreRecord) -> Result<(), ScoreError> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        debug!(player = %record.player_name, score = record.score, "score written");
        Ok(())
    }
}

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ORTHOGONAL_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// Flat-top hex layout with odd columns shifted half a cell down.
const HEX_EVEN_COLUMN_OFFSETS: [(i32, i32); 6] =
    [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];
const HEX_ODD_COLUMN_OFFSETS: [(i32, i32); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// Neighbor rule for a grid layout.
pub trait Adjacency {
    /// Raw neighbor offsets for `pos`, before any bounds check.
    fn offsets(&self, pos: Position) -> &'static [(i32, i32)];

    /// In-bounds neighbors of `pos` on a `width` x `height` board.
    fn neighbors(
        &self,
        pos: Position,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = Position> {
        self.offsets(pos)
            .iter()
            .map(move |&delta| pos.offset(delta))
            .filter(move |&p| in_bounds(p, width, height))
    }
}

pub fn in_bounds(pos: Position, width: u32, height: u32) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < width && (pos.y as u32) < height
}

/// Square cells, eight neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orthogonal;

impl Adjacency for Orthogonal {
    fn offsets(&self, _pos: Position) -> &'static [(i32, i32)] {
        &ORTHOGONAL_OFFSETS
    }
}

/// Offset-column hexagons, six neighbors chosen by column parity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexColumns;

impl Adjacency for HexColumns {
    fn offsets(&self, pos: Position) -> &'static [(i32, i32)] {
        if pos.is_odd_column() {
            &HEX_ODD_COLUMN_OFFSETS
        } else {
            &HEX_EVEN_COLUMN_OFFSETS
        }
    }
}

/// Runtime choice of layout, as carried in configs and score records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    #[serde(rename = "normal")]
    Orthogonal,
    #[serde(rename = "hex")]
    Hex,
}

impl Adjacency for Topology {
    fn offsets(&self, pos: Position) -> &'static [(i32, i32)] {
        match self {
            Topology::Orthogonal => Orthogonal.offsets(pos),
            Topology::Hex => HexColumns.offsets(pos),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Orthogonal => write!(f, "normal"),
            Topology::Hex => write!(f, "hex"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topology {0:?}, expected \"normal\" or \"hex\"")]
pub struct ParseTopologyError(String);

impl FromStr for Topology {
    type Err = ParseTopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "orthogonal" | "n" => Ok(Topology::Orthogonal),
            "hex" | "h" => Ok(Topology::Hex),
            _ => Err(ParseTopologyError(s.to_string())),
        }
    }
}

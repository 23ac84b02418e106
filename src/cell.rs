/// State of a single grid position.
///
/// `mined` and `adjacent_count` are fixed once the grid has placed its mines.
/// A flagged cell is always covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub mined: bool,
    pub covered: bool,
    pub flagged: bool,
    pub adjacent_count: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            mined: false,
            covered: true,
            flagged: false,
            adjacent_count: 0,
        }
    }
}

impl Cell {
    /// Covered, unflagged, and safe: the only cells a cascade may open.
    pub fn is_cascade_target(&self) -> bool {
        self.covered && !self.flagged && !self.mined
    }
}

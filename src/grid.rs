use crate::topology::{in_bounds, Adjacency, Topology};
use crate::{Cell, ConfigError, Position, Result};
use itertools::iproduct;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Out of bounds, already uncovered, flagged, or the grid has detonated.
    NoOp,
    Detonated,
    /// Number of cells uncovered by this call, cascade included.
    Revealed(u32),
    AlreadyWon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    Added,
    Removed,
    Rejected,
}

/// Checks board dimensions and mine count, returning the cell count.
pub(crate) fn check_board(
    width: u32,
    height: u32,
    mine_count: u32,
) -> std::result::Result<u32, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyBoard { width, height });
    }
    let total = width
        .checked_mul(height)
        .filter(|_| width <= i32::MAX as u32 && height <= i32::MAX as u32)
        .ok_or(ConfigError::BoardTooLarge { width, height })?;
    if mine_count >= total {
        return Err(ConfigError::TooManyMines {
            width,
            height,
            mines: mine_count,
        });
    }
    Ok(total)
}

#[derive(Debug, Clone)]
pub struct Grid {
    cells: Array2<Cell>,
    topology: Topology,
    width: u32,
    height: u32,
    mine_positions: Vec<Position>,
    revealed_count: u32,
    flag_count: u32,
    detonated: Option<Position>,
}

impl Grid {
    /// Builds a board and places `mine_count` mines uniformly at random,
    /// driven by a generator seeded from `seed`.
    pub fn new(
        topology: Topology,
        width: u32,
        height: u32,
        mine_count: u32,
        seed: u64,
    ) -> Result<Self> {
        check_board(width, height, mine_count)?;

        let mut grid = Self::empty(topology, width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        grid.place_mines(mine_count, &mut rng);
        debug!(%topology, width, height, mine_count, seed, "grid generated");
        Ok(grid)
    }

    /// Builds a board with mines at exactly the given positions.
    pub fn with_mines(
        topology: Topology,
        width: u32,
        height: u32,
        mines: &[Position],
    ) -> Result<Self> {
        let mine_count = u32::try_from(mines.len()).unwrap_or(u32::MAX);
        check_board(width, height, mine_count)?;

        let mut grid = Self::empty(topology, width, height);
        for &pos in mines {
            let Some(cell) = grid.cell(pos) else {
                return Err(ConfigError::MineOutOfBounds(pos).into());
            };
            if cell.mined {
                return Err(ConfigError::DuplicateMine(pos).into());
            }
            grid.lay_mine(pos);
        }
        Ok(grid)
    }

    fn empty(topology: Topology, width: u32, height: u32) -> Self {
        Self {
            cells: Array2::from_elem((width as usize, height as usize), Cell::default()),
            topology,
            width,
            height,
            mine_positions: Vec::new(),
            revealed_count: 0,
            flag_count: 0,
            detonated: None,
        }
    }

    /// Rejection-samples coordinates until `mine_count` distinct cells are mined.
    fn place_mines<R: Rng>(&mut self, mine_count: u32, rng: &mut R) {
        let mut placed = 0;
        while placed < mine_count {
            let x = rng.gen_range(0..self.width) as i32;
            let y = rng.gen_range(0..self.height) as i32;
            let pos = Position::new(x, y);

            if !self.cells[index(pos)].mined {
                self.lay_mine(pos);
                placed += 1;
            }
        }
    }

    fn lay_mine(&mut self, pos: Position) {
        self.cells[index(pos)].mined = true;
        self.mine_positions.push(pos);

        let topology = self.topology;
        for neighbor in topology.neighbors(pos, self.width, self.height) {
            self.cells[index(neighbor)].adjacent_count += 1;
        }
    }

    pub fn reveal(&mut self, pos: Position) -> RevealOutcome {
        if self.detonated.is_some() {
            return RevealOutcome::NoOp;
        }
        if self.is_cleared() {
            return RevealOutcome::AlreadyWon;
        }
        let Some(cell) = self.cell(pos) else {
            return RevealOutcome::NoOp;
        };
        if !cell.covered || cell.flagged {
            return RevealOutcome::NoOp;
        }
        if cell.mined {
            info!(x = pos.x, y = pos.y, "mine detonated");
            self.detonated = Some(pos);
            return RevealOutcome::Detonated;
        }

        self.uncover(pos);
        let mut opened = 1;

        // Cells are uncovered before they are queued, so each enters at most once.
        let mut frontier = VecDeque::new();
        if cell.adjacent_count == 0 {
            frontier.push_back(pos);
        }
        let topology = self.topology;
        while let Some(current) = frontier.pop_front() {
            for neighbor in topology.neighbors(current, self.width, self.height) {
                let next = self.cells[index(neighbor)];
                if !next.is_cascade_target() {
                    continue;
                }
                self.uncover(neighbor);
                opened += 1;
                if next.adjacent_count == 0 {
                    frontier.push_back(neighbor);
                }
            }
        }

        if opened > 1 {
            debug!(x = pos.x, y = pos.y, opened, "cascade");
        }
        RevealOutcome::Revealed(opened)
    }

    fn uncover(&mut self, pos: Position) {
        self.cells[index(pos)].covered = false;
        self.revealed_count += 1;
    }

    pub fn toggle_flag(&mut self, pos: Position) -> FlagOutcome {
        if self.detonated.is_some() || !self.contains(pos) {
            return FlagOutcome::Rejected;
        }

        let cell = &mut self.cells[index(pos)];
        if !cell.covered {
            return FlagOutcome::Rejected;
        }
        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flag_count += 1;
            FlagOutcome::Added
        } else {
            self.flag_count -= 1;
            FlagOutcome::Removed
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.revealed_count == self.safe_cell_count()
    }

    /// Every mine is flagged and no flag sits on a safe cell.
    pub fn all_mines_flagged(&self) -> bool {
        self.mine_positions
            .iter()
            .all(|&pos| self.cells[index(pos)].flagged)
            && self.flag_count == self.mine_count()
    }

    pub fn contains(&self, pos: Position) -> bool {
        in_bounds(pos, self.width, self.height)
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.contains(pos).then(|| self.cells[index(pos)])
    }

    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        self.topology.neighbors(pos, self.width, self.height)
    }

    /// Row-major iteration over every position on the board.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.height as i32, 0..self.width as i32).map(|(y, x)| Position::new(x, y))
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mine_count(&self) -> u32 {
        self.mine_positions.len() as u32
    }

    pub fn mine_positions(&self) -> &[Position] {
        &self.mine_positions
    }

    pub fn safe_cell_count(&self) -> u32 {
        self.width * self.height - self.mine_count()
    }

    pub fn revealed_count(&self) -> u32 {
        self.revealed_count
    }

    pub fn flag_count(&self) -> u32 {
        self.flag_count
    }

    /// Mines not yet accounted for by flags; negative when over-flagged.
    pub fn mines_left(&self) -> i64 {
        i64::from(self.mine_count()) - i64::from(self.flag_count)
    }

    pub fn detonated(&self) -> Option<Position> {
        self.detonated
    }
}

fn index(pos: Position) -> [usize; 2] {
    [pos.x as usize, pos.y as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;
    use std::collections::HashSet;

    fn grid(topology: Topology, width: u32, height: u32, mines: &[(i32, i32)]) -> Grid {
        let mines: Vec<Position> = mines.iter().copied().map(Position::from).collect();
        Grid::with_mines(topology, width, height, &mines).unwrap()
    }

    fn covered_and_flagged(grid: &Grid) -> Vec<(bool, bool)> {
        grid.positions()
            .filter_map(|p| grid.cell(p))
            .map(|c| (c.covered, c.flagged))
            .collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            Grid::new(Topology::Orthogonal, 0, 5, 0, 1),
            Err(GameError::InvalidConfig(ConfigError::EmptyBoard { .. }))
        ));
        assert!(matches!(
            Grid::new(Topology::Hex, 3, 3, 9, 1),
            Err(GameError::InvalidConfig(ConfigError::TooManyMines { mines: 9, .. }))
        ));
        assert!(Grid::new(Topology::Hex, 3, 3, 8, 1).is_ok());
    }

    #[test]
    fn test_with_mines_rejects_bad_layouts() {
        let outside = [Position::new(3, 0)];
        let twice = [Position::new(1, 1), Position::new(1, 1)];

        assert_eq!(
            Grid::with_mines(Topology::Orthogonal, 3, 3, &outside).unwrap_err(),
            GameError::InvalidConfig(ConfigError::MineOutOfBounds(Position::new(3, 0)))
        );
        assert_eq!(
            Grid::with_mines(Topology::Orthogonal, 3, 3, &twice).unwrap_err(),
            GameError::InvalidConfig(ConfigError::DuplicateMine(Position::new(1, 1)))
        );
    }

    #[test]
    fn test_place_mines_exact_count_and_adjacency() {
        for topology in [Topology::Orthogonal, Topology::Hex] {
            let grid = Grid::new(topology, 9, 7, 20, 42).unwrap();
            let mines: HashSet<Position> = grid.mine_positions().iter().copied().collect();

            assert_eq!(mines.len(), 20);
            assert_eq!(
                grid.positions()
                    .filter(|&p| grid.cell(p).unwrap().mined)
                    .count(),
                20
            );
            for pos in grid.positions() {
                let expected = grid.neighbors(pos).filter(|n| mines.contains(n)).count();
                assert_eq!(grid.cell(pos).unwrap().adjacent_count as usize, expected);
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Grid::new(Topology::Hex, 12, 12, 30, 7).unwrap();
        let b = Grid::new(Topology::Hex, 12, 12, 30, 7).unwrap();
        assert_eq!(a.mine_positions(), b.mine_positions());
    }

    #[test]
    fn test_hex_adjacency_counts() {
        // Mine in an even column touches the row above on both sides.
        let g = grid(Topology::Hex, 5, 5, &[(2, 2)]);
        for (x, y) in [(1, 1), (1, 2), (2, 1), (2, 3), (3, 1), (3, 2)] {
            assert_eq!(g.cell(Position::new(x, y)).unwrap().adjacent_count, 1);
        }
        assert_eq!(g.cell(Position::new(1, 3)).unwrap().adjacent_count, 0);
        assert_eq!(g.cell(Position::new(3, 3)).unwrap().adjacent_count, 0);

        // Mine in an odd column touches the row below on both sides.
        let g = grid(Topology::Hex, 5, 5, &[(1, 2)]);
        for (x, y) in [(0, 2), (0, 3), (1, 1), (1, 3), (2, 2), (2, 3)] {
            assert_eq!(g.cell(Position::new(x, y)).unwrap().adjacent_count, 1);
        }
        assert_eq!(g.cell(Position::new(0, 1)).unwrap().adjacent_count, 0);
    }

    #[test]
    fn test_reveal_flagged_cell_is_noop() {
        let mut g = grid(Topology::Orthogonal, 3, 3, &[(2, 2)]);
        assert_eq!(g.toggle_flag(Position::new(0, 0)), FlagOutcome::Added);

        let before = covered_and_flagged(&g);
        assert_eq!(g.reveal(Position::new(0, 0)), RevealOutcome::NoOp);
        assert_eq!(covered_and_flagged(&g), before);
        assert_eq!(g.revealed_count(), 0);
    }

    #[test]
    fn test_reveal_mine_leaves_board_untouched() {
        let mut g = grid(Topology::Orthogonal, 3, 3, &[(1, 1)]);
        g.reveal(Position::new(0, 0));
        g.toggle_flag(Position::new(2, 2));
        let before = covered_and_flagged(&g);

        assert_eq!(g.reveal(Position::new(1, 1)), RevealOutcome::Detonated);
        assert_eq!(g.detonated(), Some(Position::new(1, 1)));
        assert_eq!(covered_and_flagged(&g), before);

        assert_eq!(g.reveal(Position::new(2, 0)), RevealOutcome::NoOp);
        assert_eq!(g.toggle_flag(Position::new(2, 0)), FlagOutcome::Rejected);
        assert_eq!(covered_and_flagged(&g), before);
    }

    #[test]
    fn test_reveal_numbered_cell_does_not_cascade() {
        let mut g = grid(Topology::Orthogonal, 3, 3, &[(0, 0)]);

        assert_eq!(g.reveal(Position::new(1, 1)), RevealOutcome::Revealed(1));
        assert_eq!(g.revealed_count(), 1);
        assert_eq!(g.reveal(Position::new(1, 1)), RevealOutcome::NoOp);
    }

    #[test]
    fn test_flood_fill_opens_zero_region_and_border() {
        // Column of mines at x == 2 walls off the right side.
        let mut g = grid(Topology::Orthogonal, 5, 3, &[(2, 0), (2, 1), (2, 2)]);

        assert_eq!(g.reveal(Position::new(0, 0)), RevealOutcome::Revealed(6));
        for y in 0..3 {
            assert!(!g.cell(Position::new(0, y)).unwrap().covered);
            assert!(!g.cell(Position::new(1, y)).unwrap().covered);
            assert!(g.cell(Position::new(2, y)).unwrap().covered);
            assert!(g.cell(Position::new(3, y)).unwrap().covered);
        }
    }

    #[test]
    fn test_flood_fill_skips_flags() {
        let mut g = grid(Topology::Orthogonal, 4, 1, &[]);
        g.toggle_flag(Position::new(2, 0));

        assert_eq!(g.reveal(Position::new(0, 0)), RevealOutcome::Revealed(2));
        assert!(g.cell(Position::new(2, 0)).unwrap().flagged);
        assert!(g.cell(Position::new(3, 0)).unwrap().covered);
    }

    #[test]
    fn test_hex_flood_fill_follows_hex_neighbors() {
        // In a single row, hex columns still link sideways through (±1, 0).
        let mut g = grid(Topology::Hex, 4, 2, &[(3, 1)]);
        let outcome = g.reveal(Position::new(0, 0));

        assert_eq!(outcome, RevealOutcome::Revealed(7));
        assert!(g.is_cleared());
    }

    #[test]
    fn test_cascade_over_large_empty_board() {
        let mut g = Grid::new(Topology::Orthogonal, 400, 400, 0, 0).unwrap();

        assert_eq!(
            g.reveal(Position::new(200, 200)),
            RevealOutcome::Revealed(160_000)
        );
        assert!(g.is_cleared());
        assert_eq!(g.reveal(Position::new(0, 0)), RevealOutcome::AlreadyWon);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut g = grid(Topology::Hex, 3, 3, &[(0, 0)]);

        assert_eq!(g.reveal(Position::new(-1, 0)), RevealOutcome::NoOp);
        assert_eq!(g.reveal(Position::new(0, 3)), RevealOutcome::NoOp);
        assert_eq!(g.toggle_flag(Position::new(3, 0)), FlagOutcome::Rejected);
        assert_eq!(g.revealed_count(), 0);
        assert_eq!(g.flag_count(), 0);
    }

    #[test]
    fn test_toggle_flag() {
        let mut g = grid(Topology::Orthogonal, 3, 3, &[(0, 0)]);
        let pos = Position::new(0, 0);

        assert_eq!(g.toggle_flag(pos), FlagOutcome::Added);
        assert_eq!(g.flag_count(), 1);
        assert_eq!(g.mines_left(), 0);
        assert_eq!(g.toggle_flag(pos), FlagOutcome::Removed);
        assert_eq!(g.flag_count(), 0);

        g.reveal(Position::new(2, 2));
        assert_eq!(g.toggle_flag(Position::new(2, 2)), FlagOutcome::Rejected);
        assert_eq!(g.flag_count(), 0);
    }

    #[test]
    fn test_is_cleared_three_by_three() {
        let mut g = grid(Topology::Orthogonal, 3, 3, &[(2, 2)]);
        assert!(!g.is_cleared());

        for pos in g.positions().collect::<Vec<_>>() {
            if pos != Position::new(2, 2) {
                g.reveal(pos);
            }
        }

        assert_eq!(g.revealed_count(), 8);
        assert!(g.is_cleared());
    }

    #[test]
    fn test_all_mines_flagged_rejects_extra_flags() {
        let mut g = grid(Topology::Orthogonal, 2, 2, &[(0, 0)]);
        assert!(!g.all_mines_flagged());

        g.toggle_flag(Position::new(0, 0));
        assert!(g.all_mines_flagged());

        g.toggle_flag(Position::new(1, 1));
        assert_eq!(g.mines_left(), -1);
        assert!(!g.all_mines_flagged());
    }

    #[test]
    fn test_all_mines_flagged_needs_flags_on_mines() {
        let mut g = grid(Topology::Orthogonal, 2, 2, &[(0, 0)]);
        g.toggle_flag(Position::new(1, 0));

        assert_eq!(g.flag_count(), g.mine_count());
        assert!(!g.all_mines_flagged());
    }

    #[test]
    fn test_positions_row_major() {
        let g = grid(Topology::Orthogonal, 2, 2, &[]);
        let positions: Vec<_> = g.positions().collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
    }
}

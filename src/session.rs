use crate::{FlagOutcome, GameConfig, Grid, Position, Result, RevealOutcome, ScoreRecord};
use tracing::{info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Won | Status::Lost)
    }
}

/// What a move did to the grid, and where the session stands afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<O> {
    pub outcome: O,
    pub status: Status,
}

/// One play-through of a grid against a countdown.
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    status: Status,
    time_remaining: u32,
    score: Option<u32>,
}

impl Session {
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(
            config.topology,
            config.width,
            config.height,
            config.mine_count,
            seed,
        )?;
        Ok(Self::from_grid(grid, config.time_limit))
    }

    /// Wraps a prebuilt grid. A grid that has already detonated or been won
    /// yields a session that is already over.
    pub fn from_grid(grid: Grid, time_limit: u32) -> Self {
        let mut session = Self {
            grid,
            status: Status::InProgress,
            time_remaining: time_limit,
            score: None,
        };

        let played = session.grid.revealed_count() > 0 || session.grid.flag_count() > 0;
        if session.grid.detonated().is_some() {
            session.finish(Status::Lost);
        } else if played {
            session.evaluate_win();
        }
        session
    }

    pub fn reveal(&mut self, pos: Position) -> Step<RevealOutcome> {
        if self.status.is_terminal() {
            return self.step(RevealOutcome::NoOp);
        }

        let outcome = self.grid.reveal(pos);
        match outcome {
            RevealOutcome::Detonated => self.finish(Status::Lost),
            RevealOutcome::Revealed(_) => self.evaluate_win(),
            RevealOutcome::NoOp | RevealOutcome::AlreadyWon => {}
        }
        self.step(outcome)
    }

    pub fn toggle_flag(&mut self, pos: Position) -> Step<FlagOutcome> {
        if self.status.is_terminal() {
            return self.step(FlagOutcome::Rejected);
        }

        let outcome = self.grid.toggle_flag(pos);
        if outcome != FlagOutcome::Rejected {
            self.evaluate_win();
        }
        self.step(outcome)
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        trace!(time_remaining = self.time_remaining, "tick");
        if self.time_remaining == 0 {
            if self.win_condition() {
                self.finish(Status::Won);
            } else {
                self.finish(Status::Lost);
            }
        }
        self.status
    }

    fn win_condition(&self) -> bool {
        self.grid.is_cleared() || self.grid.all_mines_flagged()
    }

    fn evaluate_win(&mut self) {
        if self.win_condition() {
            self.finish(Status::Won);
        }
    }

    fn finish(&mut self, status: Status) {
        self.status = status;
        if status == Status::Won {
            self.score = Some(self.time_remaining);
        }
        info!(?status, score = self.score, "session finished");
    }

    fn step<O>(&self, outcome: O) -> Step<O> {
        Step {
            outcome,
            status: self.status,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Seconds left on the clock when the session was won.
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The record handed to the score keeper, available only after a win.
    pub fn score_record(&self, player_name: impl Into<String>) -> Option<ScoreRecord> {
        let score = self.score?;
        let (width, height) = self.grid.dimensions();
        Some(ScoreRecord {
            topology: self.grid.topology(),
            width,
            height,
            mine_count: self.grid.mine_count(),
            score,
            player_name: player_name.into(),
        })
    }
}

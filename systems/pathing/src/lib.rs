#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Contract that incremental pathfinding algorithms implement.
//!
//! An algorithm advances one unit of work per [`PathAlgorithm::step`] over a
//! [`WeightGrid`] snapshot and flags completion through its embedded
//! [`SearchState`]. [`PathAlgorithm::calculate`] drives steps synchronously on
//! the calling thread until the search reports done or the step budget runs
//! out. No concrete algorithm lives here; the trait has no default
//! implementor, so there is nothing to instantiate without supplying `step`.

use pathgrid_core::{CellCoord, WeightGrid};
use thiserror::Error;
use tracing::warn;

/// Number of steps [`StepBudget::default`] allows before giving up.
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// Endpoints and completion flag shared by every algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchState {
    start: CellCoord,
    end: CellCoord,
    done: bool,
}

impl SearchState {
    /// Creates an unfinished search between two cells.
    #[must_use]
    pub const fn new(start: CellCoord, end: CellCoord) -> Self {
        Self {
            start,
            end,
            done: false,
        }
    }

    /// Cell the search starts from.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell the search tries to reach.
    #[must_use]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Reports whether the search has finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Flags the search as finished.
    pub fn mark_done(&mut self) {
        self.done = true;
    }
}

impl Default for SearchState {
    /// Both endpoints sit in the top-left corner.
    fn default() -> Self {
        Self::new(CellCoord::new(0, 0), CellCoord::new(0, 0))
    }
}

/// Upper bound on the number of steps a calculation may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepBudget {
    /// Stop with an error once this many steps ran without finishing.
    Limited(u64),
    /// Keep stepping until the algorithm reports done, however long it takes.
    Unbounded,
}

impl Default for StepBudget {
    fn default() -> Self {
        Self::Limited(DEFAULT_STEP_LIMIT)
    }
}

/// Reasons a calculation ended without the algorithm finishing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathingError {
    /// The step budget ran out before the algorithm reported done.
    #[error("pathfinding did not finish within {steps} steps")]
    BudgetExhausted {
        /// Steps performed before giving up.
        steps: u64,
    },
}

/// Incremental pathfinding algorithm.
pub trait PathAlgorithm {
    /// Endpoints and completion flag of the running search.
    fn state(&self) -> &SearchState;

    /// Performs one unit of work toward a solution.
    ///
    /// Implementations must eventually mark their [`SearchState`] done.
    fn step(&mut self, grid: &WeightGrid);

    /// Reports whether the search has finished.
    fn is_done(&self) -> bool {
        self.state().is_done()
    }

    /// Steps until the search is done, returning the number of steps taken.
    ///
    /// Runs to completion without yielding.
    fn calculate(&mut self, grid: &WeightGrid, budget: StepBudget) -> Result<u64, PathingError> {
        let mut steps = 0_u64;
        while !self.is_done() {
            if let StepBudget::Limited(limit) = budget {
                if steps >= limit {
                    warn!(steps, "pathfinding step budget exhausted");
                    return Err(PathingError::BudgetExhausted { steps });
                }
            }
            self.step(grid);
            steps = steps.saturating_add(1);
        }
        Ok(steps)
    }
}

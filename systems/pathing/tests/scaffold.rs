use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use pathgrid_core::{CellCoord, Direction, TileColor, TileType, Weight, WeightGrid};
use pathgrid_system_pathing::{
    PathAlgorithm, PathingError, SearchState, StepBudget, DEFAULT_STEP_LIMIT,
};
use pathgrid_world::{query, World};

/// Finishes after a fixed number of steps.
struct Countdown {
    state: SearchState,
    remaining: u32,
}

impl PathAlgorithm for Countdown {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn step(&mut self, _grid: &WeightGrid) {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state.mark_done();
        }
    }
}

/// Never makes progress.
#[derive(Default)]
struct Stalled {
    state: SearchState,
    steps: u64,
}

impl PathAlgorithm for Stalled {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn step(&mut self, _grid: &WeightGrid) {
        self.steps += 1;
    }
}

/// Walks east one cell per step and stops at the end cell or a barrier.
struct EastwardWalker {
    state: SearchState,
    cursor: CellCoord,
    blocked: bool,
}

impl EastwardWalker {
    fn new(start: CellCoord, end: CellCoord) -> Self {
        Self {
            state: SearchState::new(start, end),
            cursor: start,
            blocked: false,
        }
    }
}

impl PathAlgorithm for EastwardWalker {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn step(&mut self, grid: &WeightGrid) {
        if self.cursor == self.state.end() {
            self.state.mark_done();
            return;
        }
        match self.cursor.step(Direction::East) {
            Some(next) if grid.is_passable(next) => self.cursor = next,
            _ => {
                self.blocked = true;
                self.state.mark_done();
            }
        }
    }
}

/// Breadth-first flood that expands one frontier cell per step.
struct FloodReach {
    state: SearchState,
    frontier: VecDeque<CellCoord>,
    visited: HashSet<CellCoord>,
    reached: bool,
}

impl FloodReach {
    fn new(start: CellCoord, end: CellCoord) -> Self {
        Self {
            state: SearchState::new(start, end),
            frontier: VecDeque::from([start]),
            visited: HashSet::from([start]),
            reached: false,
        }
    }
}

impl PathAlgorithm for FloodReach {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn step(&mut self, grid: &WeightGrid) {
        let Some(cell) = self.frontier.pop_front() else {
            self.state.mark_done();
            return;
        };
        if cell == self.state.end() {
            self.reached = true;
            self.state.mark_done();
            return;
        }
        for neighbor in grid.neighbors(cell) {
            if grid.is_passable(neighbor) && self.visited.insert(neighbor) {
                self.frontier.push_back(neighbor);
            }
        }
    }
}

fn grid() -> WeightGrid {
    let world = World::new(6, 2).expect("valid grid");
    query::weight_grid(&world)
}

#[test]
fn default_state_starts_unfinished_in_the_corner() {
    let state = SearchState::default();
    assert_eq!(state.start(), CellCoord::new(0, 0));
    assert_eq!(state.end(), CellCoord::new(0, 0));
    assert!(!state.is_done());
    assert_eq!(StepBudget::default(), StepBudget::Limited(DEFAULT_STEP_LIMIT));
}

#[test]
fn calculate_steps_until_done() {
    let mut algorithm = Countdown {
        state: SearchState::default(),
        remaining: 5,
    };

    assert_eq!(algorithm.calculate(&grid(), StepBudget::Unbounded), Ok(5));
    assert!(algorithm.is_done());
    assert_eq!(algorithm.calculate(&grid(), StepBudget::default()), Ok(0));
}

#[test]
fn calculate_gives_up_when_the_budget_runs_out() {
    let mut algorithm = Stalled::default();

    assert_eq!(
        algorithm.calculate(&grid(), StepBudget::Limited(64)),
        Err(PathingError::BudgetExhausted { steps: 64 })
    );
    assert_eq!(algorithm.steps, 64);
    assert!(!algorithm.is_done());
}

#[test]
fn algorithms_read_weights_from_the_painted_grid() {
    let mut world = World::new(6, 2).expect("valid grid");
    let barrier = Rc::new(TileType::new("Barrier", Weight::IMPASSABLE, TileColor::BLACK));
    assert!(world.set_tile_type(CellCoord::new(3, 0), barrier));
    let weights = query::weight_grid(&world);

    let mut open_row = EastwardWalker::new(CellCoord::new(0, 1), CellCoord::new(5, 1));
    assert_eq!(open_row.calculate(&weights, StepBudget::default()), Ok(6));
    assert!(!open_row.blocked);

    let mut walled_row = EastwardWalker::new(CellCoord::new(0, 0), CellCoord::new(5, 0));
    assert_eq!(walled_row.calculate(&weights, StepBudget::default()), Ok(3));
    assert!(walled_row.blocked);
}

#[test]
fn flood_stays_inside_the_grid_and_behind_walls() {
    let mut world = World::new(6, 2).expect("valid grid");
    let barrier = Rc::new(TileType::new("Barrier", Weight::IMPASSABLE, TileColor::BLACK));
    assert!(world.set_tile_type(CellCoord::new(3, 0), Rc::clone(&barrier)));
    assert!(world.set_tile_type(CellCoord::new(3, 1), barrier));
    let weights = query::weight_grid(&world);

    let mut walled = FloodReach::new(CellCoord::new(0, 0), CellCoord::new(5, 0));
    assert_eq!(walled.calculate(&weights, StepBudget::default()), Ok(7));
    assert!(!walled.reached);
    assert_eq!(walled.visited.len(), 6);
    assert!(walled.visited.iter().all(|cell| cell.column() < 3));

    let mut same_side = FloodReach::new(CellCoord::new(0, 0), CellCoord::new(2, 1));
    assert!(same_side.calculate(&weights, StepBudget::default()).is_ok());
    assert!(same_side.reached);
}

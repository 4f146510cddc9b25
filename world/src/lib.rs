#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid model for Waypoint.
//!
//! The [`Grid`] owns the dense obstacle matrix together with the start and
//! goal cells. It answers occupancy and boundary questions and hands out
//! borrowed [`GridView`] snapshots to the search engine and movement system.

use rand::Rng;
use tracing::{debug, info};
use waypoint_core::{Cell, ConfigError, GridView, ObstacleError, OutOfBoundsError};

/// Square obstacle grid with fixed start and goal cells.
#[derive(Clone, Debug)]
pub struct Grid {
    size: u32,
    start: Cell,
    goal: Cell,
    cells: Vec<bool>,
}

impl Grid {
    /// Allocates a `size` x `size` grid with no obstacles.
    pub fn new(size: u32, start: Cell, goal: Cell) -> Result<Self, ConfigError> {
        validate_layout(size, start, goal)?;

        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Ok(Self {
            size,
            start,
            goal,
            cells: vec![false; capacity],
        })
    }

    /// Builds a grid from an explicit obstacle layout.
    pub fn with_obstacles(
        size: u32,
        start: Cell,
        goal: Cell,
        obstacles: &[Cell],
    ) -> Result<Self, ConfigError> {
        let mut grid = Self::new(size, start, goal)?;
        for &cell in obstacles {
            let Some(index) = grid.index(cell) else {
                return Err(ConfigError::ObstacleOutOfBounds { cell, size });
            };
            if grid.is_endpoint(cell) {
                return Err(ConfigError::ObstacleOnEndpoint { cell });
            }
            grid.cells[index] = true;
        }
        Ok(grid)
    }

    /// Marks exactly `count` additional distinct cells as obstacles.
    ///
    /// Cells are sampled uniformly and resampled when they hit an existing
    /// obstacle, the start or the goal. Callers must keep `count` well below
    /// the number of free cells; this loop never finishes otherwise.
    pub fn place_random_obstacles<R: Rng>(&mut self, count: usize, rng: &mut R) {
        let mut placed = 0;
        let mut samples: u64 = 0;
        while placed < count {
            let cell = Cell::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size));
            samples += 1;
            if self.is_endpoint(cell) {
                continue;
            }
            let Some(index) = self.index(cell) else {
                continue;
            };
            if self.cells[index] {
                continue;
            }
            self.cells[index] = true;
            placed += 1;
        }

        info!(count, samples, size = self.size, "placed random obstacles");
    }

    /// Marks a single cell as an obstacle on the live grid.
    ///
    /// Placing an obstacle on an already occupied cell is accepted and leaves
    /// the grid unchanged.
    pub fn place_obstacle(&mut self, cell: Cell) -> Result<(), ObstacleError> {
        let index = self.index(cell).ok_or(ObstacleError::OutOfBounds)?;
        if self.is_endpoint(cell) {
            return Err(ObstacleError::Endpoint);
        }
        self.cells[index] = true;
        debug!(%cell, "obstacle placed");
        Ok(())
    }

    /// Reports whether the cell holds an obstacle.
    pub fn is_occupied(&self, cell: Cell) -> Result<bool, OutOfBoundsError> {
        self.view().is_occupied(cell)
    }

    /// Pure boundary test accepting signed coordinates.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        self.view().in_bounds(x, y)
    }

    /// Edge length of the square grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Cell the agent departs from.
    #[must_use]
    pub const fn start(&self) -> Cell {
        self.start
    }

    /// Cell the agent tries to reach.
    #[must_use]
    pub const fn goal(&self) -> Cell {
        self.goal
    }

    /// Borrows a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size, self.start, self.goal)
    }

    fn is_endpoint(&self, cell: Cell) -> bool {
        cell == self.start || cell == self.goal
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x() < self.size && cell.y() < self.size {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Largest obstacle count that random placement accepts for a grid edge.
///
/// This is the largest value strictly below `size * size - 2`, so at least one
/// free cell besides start and goal survives and sampling terminates.
#[must_use]
pub fn max_random_obstacles(size: u32) -> usize {
    let cells = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(usize::MAX);
    cells.saturating_sub(3)
}

/// Largest grid edge accepted at construction.
pub const MAX_GRID_SIZE: u32 = 4096;

/// Checks that the grid size is allocatable and holds two distinct endpoints.
pub fn validate_layout(size: u32, start: Cell, goal: Cell) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    if size > MAX_GRID_SIZE {
        return Err(ConfigError::GridTooLarge {
            size,
            max: MAX_GRID_SIZE,
        });
    }
    if start.x() >= size || start.y() >= size {
        return Err(ConfigError::StartOutOfBounds { cell: start, size });
    }
    if goal.x() >= size || goal.y() >= size {
        return Err(ConfigError::GoalOutOfBounds { cell: goal, size });
    }
    if start == goal {
        return Err(ConfigError::StartEqualsGoal { cell: start });
    }
    Ok(())
}

/// Query functions that provide read-only access to the grid.
pub mod query {
    use super::Grid;
    use waypoint_core::Cell;

    /// Enumerates every obstacle cell in row-major order.
    #[must_use]
    pub fn obstacles(grid: &Grid) -> Vec<Cell> {
        grid.view().obstacles().collect()
    }

    /// Number of cells currently marked as obstacles.
    #[must_use]
    pub fn obstacle_count(grid: &Grid) -> usize {
        grid.view().obstacles().count()
    }
}

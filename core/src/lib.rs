#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint navigation engine.
//!
//! This crate defines the vocabulary that connects the grid model, the path
//! search engine, the movement state machine and the adapters that drive them.
//! Adapters submit [`Command`] values through the navigation agent, the agent
//! executes them atomically, and then reports [`Event`] values that renderers
//! and schedulers consume. Read access to the occupancy grid flows through the
//! borrowed [`GridView`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as x (column) and y (row).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    x: u32,
    y: u32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Signed offset that leads from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Cell) -> (i64, i64) {
        (
            i64::from(other.x) - i64::from(self.x),
            i64::from(other.y) - i64::from(self.y),
        )
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two cells share an edge on the 4-connected grid.
    #[must_use]
    pub fn is_adjacent_to(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions available to the agent.
///
/// Rows grow downwards, so [`Direction::Down`] increases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Neighbour reached by moving one cell from `cell`, if it does not
    /// underflow the coordinate space. Upper bounds are the grid's concern.
    #[must_use]
    pub fn step_from(self, cell: Cell) -> Option<Cell> {
        match self {
            Self::Up => cell.y().checked_sub(1).map(|y| Cell::new(cell.x(), y)),
            Self::Down => cell.y().checked_add(1).map(|y| Cell::new(cell.x(), y)),
            Self::Left => cell.x().checked_sub(1).map(|x| Cell::new(x, cell.y())),
            Self::Right => cell.x().checked_add(1).map(|x| Cell::new(x, cell.y())),
        }
    }
}

/// Identifies which collaborator requested a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// One step per external activation, regardless of the navigating latch.
    Manual,
    /// Repeating scheduler tick that only acts while the agent is idle.
    Autonomous,
}

/// Commands that express all permissible mutations of the navigation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests a single step from the provided trigger source.
    Step {
        /// Collaborator that issued the request.
        trigger: Trigger,
    },
    /// Signals that the last committed move was observed, clearing the
    /// navigating latch so the autonomous trigger may act again.
    Acknowledge,
    /// Marks a cell as an obstacle on the live grid without replanning.
    PlaceObstacle {
        /// Cell that should become occupied.
        cell: Cell,
    },
}

/// Events reported after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Position-changed notification emitted after every committed step.
    ///
    /// `from` equals `to` when the step consumed a route cell without moving.
    PositionChanged {
        /// Cell the agent occupied before the step.
        from: Cell,
        /// Cell the agent occupies after the step.
        to: Cell,
        /// Collaborator that requested the step.
        trigger: Trigger,
    },
    /// Reports that a directional move was refused by the live grid.
    StepRejected {
        /// Cell the agent stayed on.
        at: Cell,
        /// Direction that was attempted.
        direction: Direction,
        /// Route cell that was discarded with the rejected move.
        discarded: Cell,
    },
    /// Announces that the last route cell was consumed.
    RouteExhausted {
        /// Final position of the agent.
        position: Cell,
        /// Whether the final position is the goal cell.
        reached_goal: bool,
    },
    /// Confirms the navigating latch was cleared.
    Acknowledged,
    /// Confirms that an obstacle was added to the live grid.
    ObstaclePlaced {
        /// Cell that became occupied.
        cell: Cell,
    },
    /// Reports that an obstacle placement request was refused.
    ObstacleRejected {
        /// Cell named in the request.
        cell: Cell,
        /// Specific reason the placement failed.
        reason: ObstacleError,
    },
}

/// Ordered sequence of cells leading from start to goal.
///
/// The route is stored as a stack whose top is the next cell to consume, so
/// [`Route::pop`] yields cells in start to goal order and the route shrinks
/// monotonically as the agent advances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    stack: Vec<Cell>,
}

impl Route {
    /// Builds a route from cells listed in start to goal order.
    #[must_use]
    pub fn from_path(mut path: Vec<Cell>) -> Self {
        path.reverse();
        Self { stack: path }
    }

    /// Route that signals "no path found".
    #[must_use]
    pub const fn empty() -> Self {
        Self { stack: Vec::new() }
    }

    /// Reports whether every cell has been consumed or none existed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of cells that remain to be consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Next cell that [`Route::pop`] would yield.
    #[must_use]
    pub fn peek(&self) -> Option<Cell> {
        self.stack.last().copied()
    }

    /// Removes and returns the next cell.
    pub fn pop(&mut self) -> Option<Cell> {
        self.stack.pop()
    }

    /// Remaining cells in start to goal order.
    pub fn cells(&self) -> impl DoubleEndedIterator<Item = Cell> + '_ {
        self.stack.iter().rev().copied()
    }
}

/// Read-only view into the dense obstacle grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [bool],
    size: u32,
    start: Cell,
    goal: Cell,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [bool], size: u32, start: Cell, goal: Cell) -> Self {
        Self {
            cells,
            size,
            start,
            goal,
        }
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

    /// Pure boundary test accepting signed coordinates.
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        let size = i64::from(self.size);
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Reports whether the cell holds an obstacle.
    pub fn is_occupied(&self, cell: Cell) -> Result<bool, OutOfBoundsError> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(OutOfBoundsError {
                cell,
                size: self.size,
            })
    }

    /// Reports whether the cell can be entered: in bounds and obstacle free.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        matches!(self.is_occupied(cell), Ok(false))
    }

    /// Iterator over every obstacle cell in row-major order.
    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + 'a {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(Cell::new(index % size, index / size))
            })
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

/// Reasons the grid configuration may be rejected at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid must contain at least one cell per side.
    #[error("grid size must be greater than zero")]
    EmptyGrid,
    /// The grid edge exceeds the supported maximum.
    #[error("grid size {size} exceeds the maximum of {max}")]
    GridTooLarge {
        /// Requested edge length.
        size: u32,
        /// Largest accepted edge length.
        max: u32,
    },
    /// The start cell lies outside the grid.
    #[error("start cell {cell} lies outside a {size}x{size} grid")]
    StartOutOfBounds {
        /// Offending start cell.
        cell: Cell,
        /// Configured edge length.
        size: u32,
    },
    /// The goal cell lies outside the grid.
    #[error("goal cell {cell} lies outside a {size}x{size} grid")]
    GoalOutOfBounds {
        /// Offending goal cell.
        cell: Cell,
        /// Configured edge length.
        size: u32,
    },
    /// Start and goal name the same cell.
    #[error("start and goal must differ, both are {cell}")]
    StartEqualsGoal {
        /// Cell used for both endpoints.
        cell: Cell,
    },
    /// An explicit obstacle lies outside the grid.
    #[error("obstacle {cell} lies outside a {size}x{size} grid")]
    ObstacleOutOfBounds {
        /// Offending obstacle cell.
        cell: Cell,
        /// Configured edge length.
        size: u32,
    },
    /// An explicit obstacle covers the start or goal cell.
    #[error("obstacle {cell} covers the start or goal cell")]
    ObstacleOnEndpoint {
        /// Offending obstacle cell.
        cell: Cell,
    },
    /// Random placement could never finish with the requested count.
    #[error("{requested} obstacles do not fit, at most {available} free cells are allowed")]
    TooManyObstacles {
        /// Requested obstacle count.
        requested: usize,
        /// Largest count accepted for the grid.
        available: usize,
    },
}

/// Raised when a coordinate query falls outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("cell {cell} lies outside a {size}x{size} grid")]
pub struct OutOfBoundsError {
    /// Cell that was queried.
    pub cell: Cell,
    /// Edge length of the grid.
    pub size: u32,
}

/// Reasons a runtime obstacle placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ObstacleError {
    /// The requested cell extends beyond the grid bounds.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// Start and goal cells can never hold an obstacle.
    #[error("start and goal cells cannot hold obstacles")]
    Endpoint,
    /// The agent currently stands on the requested cell.
    #[error("the agent occupies this cell")]
    AgentCell,
}

#[cfg(test)]
mod tests {
    use super::{Cell, Direction, GridView, OutOfBoundsError, Route};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert!(origin.is_adjacent_to(Cell::new(1, 2)));
        assert!(!origin.is_adjacent_to(Cell::new(2, 2)));
    }

    #[test]
    fn delta_is_signed() {
        assert_eq!(Cell::new(3, 1).delta_to(Cell::new(1, 4)), (-2, 3));
    }

    #[test]
    fn step_from_refuses_underflow() {
        let corner = Cell::new(0, 0);
        assert_eq!(Direction::Up.step_from(corner), None);
        assert_eq!(Direction::Left.step_from(corner), None);
        assert_eq!(Direction::Down.step_from(corner), Some(Cell::new(0, 1)));
        assert_eq!(Direction::Right.step_from(corner), Some(Cell::new(1, 0)));
    }

    #[test]
    fn route_pops_in_start_to_goal_order() {
        let path = vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)];
        let mut route = Route::from_path(path.clone());

        assert_eq!(route.cells().collect::<Vec<_>>(), path);
        assert_eq!(route.peek(), Some(Cell::new(0, 0)));
        assert_eq!(route.pop(), Some(Cell::new(0, 0)));
        assert_eq!(route.pop(), Some(Cell::new(1, 0)));
        assert_eq!(route.len(), 1);
        assert_eq!(route.pop(), Some(Cell::new(1, 1)));
        assert!(route.is_empty());
        assert_eq!(route.pop(), None);
    }

    #[test]
    fn grid_view_reports_out_of_bounds_queries() {
        let cells = [false, true, false, false];
        let view = GridView::new(&cells, 2, Cell::new(0, 0), Cell::new(1, 1));

        assert_eq!(view.is_occupied(Cell::new(1, 0)), Ok(true));
        assert_eq!(view.is_occupied(Cell::new(0, 1)), Ok(false));
        assert_eq!(
            view.is_occupied(Cell::new(2, 0)),
            Err(OutOfBoundsError {
                cell: Cell::new(2, 0),
                size: 2,
            })
        );
        assert!(!view.is_free(Cell::new(0, 2)));
        assert!(view.in_bounds(1, 1));
        assert!(!view.in_bounds(-1, 0));
        assert_eq!(view.obstacles().collect::<Vec<_>>(), vec![Cell::new(1, 0)]);
    }

    #[test]
    fn cell_deserializes_from_toml_table() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            start: Cell,
        }

        let wrapper: Wrapper = toml::from_str("start = { x = 2, y = 7 }").expect("parse");
        assert_eq!(wrapper.start, Cell::new(2, 7));
    }
}

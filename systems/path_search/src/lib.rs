#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic depth-first route search over the 4-connected grid.
//!
//! The search keeps a last-in-first-out frontier and expands neighbours in the
//! fixed order left, right, up, down. It is not cost aware: the order decides
//! which of several equally valid routes is returned, so it must not change.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use waypoint_core::{Cell, GridView, Route};

/// Counters collected while running a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of cells popped from the frontier.
    pub expanded: usize,
    /// Largest frontier length observed.
    pub frontier_peak: usize,
}

/// Route search with reusable working buffers.
#[derive(Debug, Default)]
pub struct PathSearch {
    frontier: Vec<Cell>,
    pending: HashSet<Cell>,
    visited: HashSet<Cell>,
    parents: HashMap<Cell, Cell>,
    stats: SearchStats,
}

impl PathSearch {
    /// Searches for a route from the view's start to its goal.
    ///
    /// Returns an empty route when the goal cannot be reached.
    pub fn find_route(&mut self, grid: GridView<'_>) -> Route {
        self.reset();

        let start = grid.start();
        let goal = grid.goal();
        self.frontier.push(start);
        let _ = self.pending.insert(start);

        let mut route = Route::empty();
        while let Some(current) = self.frontier.pop() {
            let _ = self.pending.remove(&current);
            self.stats.expanded += 1;

            if current == goal {
                route = self.reconstruct(start, goal);
                break;
            }

            let _ = self.visited.insert(current);

            for neighbor in neighbors(current, &grid) {
                if self.visited.contains(&neighbor) || self.pending.contains(&neighbor) {
                    continue;
                }
                if !grid.is_free(neighbor) {
                    continue;
                }

                let _ = self.parents.insert(neighbor, current);
                let _ = self.pending.insert(neighbor);
                self.frontier.push(neighbor);
            }
            self.stats.frontier_peak = self.stats.frontier_peak.max(self.frontier.len());
        }

        debug!(
            %start,
            %goal,
            route_len = route.len(),
            expanded = self.stats.expanded,
            frontier_peak = self.stats.frontier_peak,
            "route search finished"
        );
        route
    }

    /// Counters gathered by the most recent search.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn reset(&mut self) {
        self.frontier.clear();
        self.pending.clear();
        self.visited.clear();
        self.parents.clear();
        self.stats = SearchStats::default();
    }

    fn reconstruct(&self, start: Cell, goal: Cell) -> Route {
        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            let Some(&parent) = self.parents.get(&current) else {
                return Route::empty();
            };
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Route::from_path(path)
    }
}

/// Runs a one-off search with fresh buffers.
#[must_use]
pub fn find_route(grid: GridView<'_>) -> Route {
    PathSearch::default().find_route(grid)
}

fn neighbors(cell: Cell, grid: &GridView<'_>) -> impl Iterator<Item = Cell> {
    let x = i64::from(cell.x());
    let y = i64::from(cell.y());
    let offsets = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)];
    let mut candidates = [None; 4];

    for (slot, (nx, ny)) in candidates.iter_mut().zip(offsets) {
        if grid.in_bounds(nx, ny) {
            if let (Ok(nx), Ok(ny)) = (u32::try_from(nx), u32::try_from(ny)) {
                *slot = Some(Cell::new(nx, ny));
            }
        }
    }

    candidates.into_iter().flatten()
}

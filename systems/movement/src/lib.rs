#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement state machine that walks the agent along a planned route.
//!
//! Each step pops one route cell, derives a single cardinal direction from the
//! offset to the agent's position and re-validates that move against the live
//! grid. The route is trusted for direction only: a move refused by the grid is
//! skipped and its route cell stays discarded.

use tracing::{debug, trace};
use waypoint_core::{Cell, Direction, Event, GridView, Route, Trigger};

/// Observable lifecycle of the navigator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No commitment pending and route cells remain.
    Idle,
    /// A step was committed and has not been acknowledged yet.
    Stepping,
    /// The route is empty: the goal was reached or no route exists.
    Arrived,
}

/// Result of a single step request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The route was empty, nothing happened.
    NoRoute,
    /// The autonomous trigger found the navigating latch set and did nothing.
    Latched,
    /// The agent moved one cell.
    Moved {
        /// Cell before the move.
        from: Cell,
        /// Cell after the move.
        to: Cell,
        /// Direction of travel.
        direction: Direction,
    },
    /// The popped cell matched the agent position, no move was needed.
    Held {
        /// Cell the agent stays on.
        at: Cell,
    },
    /// The live grid refused the move; the popped cell was discarded.
    Rejected {
        /// Cell the agent stays on.
        at: Cell,
        /// Direction that was attempted.
        direction: Direction,
        /// Route cell that was consumed without moving.
        discarded: Cell,
    },
}

impl StepOutcome {
    /// Reports whether a route cell was consumed.
    #[must_use]
    pub const fn consumed_route_cell(&self) -> bool {
        matches!(
            self,
            Self::Moved { .. } | Self::Held { .. } | Self::Rejected { .. }
        )
    }

    /// Reports whether the agent position changed.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Owns the agent position, the remaining route and the navigating latch.
#[derive(Clone, Debug)]
pub struct Navigator {
    position: Cell,
    route: Route,
    navigating: bool,
}

impl Navigator {
    /// Creates a navigator parked on `start` with the provided route.
    #[must_use]
    pub fn new(start: Cell, route: Route) -> Self {
        Self {
            position: start,
            route,
            navigating: false,
        }
    }

    /// Current agent position.
    #[must_use]
    pub fn position(&self) -> Cell {
        self.position
    }

    /// Whether a step was committed since the last acknowledgement.
    #[must_use]
    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    /// Route cell the next step will consume, used for highlighting.
    #[must_use]
    pub fn next_cell(&self) -> Option<Cell> {
        self.route.peek()
    }

    /// Route cells that have not been consumed yet.
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Number of route cells that remain.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.route.len()
    }

    /// Lifecycle phase derived from the route and the latch.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.route.is_empty() {
            Phase::Arrived
        } else if self.navigating {
            Phase::Stepping
        } else {
            Phase::Idle
        }
    }

    /// Manual entry point: always attempts a step.
    pub fn manual_step(&mut self, grid: GridView<'_>, out: &mut Vec<Event>) -> StepOutcome {
        self.advance_one_step(grid, Trigger::Manual, out)
    }

    /// Autonomous entry point: steps only while idle.
    ///
    /// After a step the latch stays set, so repeated ticks are no-ops until
    /// [`Navigator::acknowledge`] clears it.
    pub fn tick(&mut self, grid: GridView<'_>, out: &mut Vec<Event>) -> StepOutcome {
        if self.route.is_empty() {
            return StepOutcome::NoRoute;
        }
        if self.navigating {
            return StepOutcome::Latched;
        }
        self.advance_one_step(grid, Trigger::Autonomous, out)
    }

    /// Clears the navigating latch so the autonomous trigger can act again.
    pub fn acknowledge(&mut self, out: &mut Vec<Event>) {
        if self.navigating {
            self.navigating = false;
            out.push(Event::Acknowledged);
        }
    }

    /// Pops one route cell and attempts the corresponding move.
    pub fn advance_one_step(
        &mut self,
        grid: GridView<'_>,
        trigger: Trigger,
        out: &mut Vec<Event>,
    ) -> StepOutcome {
        let Some(next) = self.route.pop() else {
            return StepOutcome::NoRoute;
        };

        let from = self.position;
        let (dx, dy) = from.delta_to(next);
        let outcome = match direction_for_delta(dx, dy) {
            None => StepOutcome::Held { at: from },
            Some(direction) => match try_move(from, direction, &grid) {
                Some(to) => {
                    self.position = to;
                    StepOutcome::Moved {
                        from,
                        to,
                        direction,
                    }
                }
                None => {
                    trace!(%from, ?direction, discarded = %next, "move refused by live grid");
                    out.push(Event::StepRejected {
                        at: from,
                        direction,
                        discarded: next,
                    });
                    StepOutcome::Rejected {
                        at: from,
                        direction,
                        discarded: next,
                    }
                }
            },
        };

        self.navigating = true;
        out.push(Event::PositionChanged {
            from,
            to: self.position,
            trigger,
        });
        debug!(
            ?trigger,
            %from,
            to = %self.position,
            remaining = self.route.len(),
            "step committed"
        );

        if self.route.is_empty() {
            out.push(Event::RouteExhausted {
                position: self.position,
                reached_goal: self.position == grid.goal(),
            });
        }

        outcome
    }
}

/// Picks the single direction to attempt for an offset.
///
/// Horizontal correction wins over vertical; a diagonal offset therefore
/// drops its vertical component.
fn direction_for_delta(dx: i64, dy: i64) -> Option<Direction> {
    if dx > 0 {
        Some(Direction::Right)
    } else if dx < 0 {
        Some(Direction::Left)
    } else if dy > 0 {
        Some(Direction::Down)
    } else if dy < 0 {
        Some(Direction::Up)
    } else {
        None
    }
}

fn try_move(from: Cell, direction: Direction, grid: &GridView<'_>) -> Option<Cell> {
    direction
        .step_from(from)
        .filter(|candidate| grid.is_free(*candidate))
}

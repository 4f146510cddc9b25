#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Synchronized navigation agent that owns the grid and the movement state.
//!
//! The agent is the single owner of the grid model, the remaining route, the
//! agent position and the navigating latch. Every public operation takes one
//! lock for its whole duration, so a step (pop, compute, validate, apply) is
//! atomic with respect to any other trigger, whichever thread it runs on.
//! Renderers read [`AgentSnapshot`] values and drain the queued [`Event`]s.

pub mod config;
pub mod trigger;

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use waypoint_core::{Cell, Command, ConfigError, Event, ObstacleError, Trigger};
use waypoint_system_movement::Navigator;
use waypoint_system_path_search::PathSearch;
use waypoint_world::{query, Grid};

pub use config::{AgentConfig, DEFAULT_SEED};
pub use trigger::{AutonomousTrigger, ManualTrigger, StepTrigger};
pub use waypoint_system_movement::{Phase, StepOutcome};

/// Oldest notifications are dropped once this many are waiting.
const MAX_PENDING_EVENTS: usize = 1024;

/// Thread-safe owner of the navigation state.
#[derive(Debug)]
pub struct NavigationAgent {
    state: Mutex<AgentState>,
}

#[derive(Debug)]
struct AgentState {
    grid: Grid,
    navigator: Navigator,
    pending: VecDeque<Event>,
}

impl NavigationAgent {
    /// Builds the grid described by `config`, places seeded random obstacles
    /// and plans the route once.
    pub fn new(config: &AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut grid = Grid::new(config.grid_size, config.start, config.goal)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        grid.place_random_obstacles(config.obstacle_count, &mut rng);
        Ok(Self::from_grid(grid))
    }

    /// Plans a route over a prepared grid and parks the agent on its start.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        let mut search = PathSearch::default();
        let route = search.find_route(grid.view());
        if route.is_empty() {
            warn!(start = %grid.start(), goal = %grid.goal(), "no route to the goal");
        }
        info!(
            size = grid.size(),
            obstacles = query::obstacle_count(&grid),
            route_len = route.len(),
            "navigation agent ready"
        );

        let navigator = Navigator::new(grid.start(), route);
        Self {
            state: Mutex::new(AgentState {
                grid,
                navigator,
                pending: VecDeque::new(),
            }),
        }
    }

    /// Executes a command atomically.
    ///
    /// Step commands report their outcome; the other commands return `None`.
    pub fn apply(&self, command: Command) -> Option<StepOutcome> {
        let mut state = self.lock();
        let mut events = Vec::new();
        let outcome = state.execute(command, &mut events);
        state.queue(events);
        outcome
    }

    /// Manual entry point: one step per external activation.
    pub fn manual_step(&self) -> StepOutcome {
        self.step(Trigger::Manual)
    }

    /// Autonomous entry point, safe to call as often as the scheduler likes.
    pub fn tick(&self) -> StepOutcome {
        self.step(Trigger::Autonomous)
    }

    /// Clears the navigating latch after the last move was observed.
    pub fn acknowledge(&self) {
        let _ = self.apply(Command::Acknowledge);
    }

    /// Adds an obstacle to the live grid. The planned route is kept as is.
    ///
    /// The cell the agent stands on is refused along with start and goal.
    pub fn place_obstacle(&self, cell: Cell) -> Result<(), ObstacleError> {
        let mut state = self.lock();
        let mut events = Vec::new();
        let result = state.place_obstacle(cell, &mut events);
        state.queue(events);
        result
    }

    /// Captures the state a renderer needs in one consistent read.
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        let state = self.lock();
        let navigator = &state.navigator;
        AgentSnapshot {
            size: state.grid.size(),
            start: state.grid.start(),
            goal: state.grid.goal(),
            obstacles: query::obstacles(&state.grid),
            position: navigator.position(),
            navigating: navigator.is_navigating(),
            next_cell: navigator.next_cell(),
            route: navigator.route().cells().collect(),
            phase: navigator.phase(),
        }
    }

    /// Takes every queued notification, oldest first.
    pub fn drain_events(&self) -> Vec<Event> {
        self.lock().pending.drain(..).collect()
    }

    fn step(&self, trigger: Trigger) -> StepOutcome {
        self.apply(Command::Step { trigger }).unwrap_or(StepOutcome::NoRoute)
    }

    fn lock(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AgentState {
    fn execute(&mut self, command: Command, out: &mut Vec<Event>) -> Option<StepOutcome> {
        match command {
            Command::Step { trigger } => {
                let view = self.grid.view();
                let outcome = match trigger {
                    Trigger::Manual => self.navigator.manual_step(view, out),
                    Trigger::Autonomous => self.navigator.tick(view, out),
                };
                Some(outcome)
            }
            Command::Acknowledge => {
                self.navigator.acknowledge(out);
                None
            }
            Command::PlaceObstacle { cell } => {
                let _ = self.place_obstacle(cell, out);
                None
            }
        }
    }

    fn place_obstacle(&mut self, cell: Cell, out: &mut Vec<Event>) -> Result<(), ObstacleError> {
        let result = if cell == self.navigator.position() {
            Err(ObstacleError::AgentCell)
        } else {
            self.grid.place_obstacle(cell)
        };
        match result {
            Ok(()) => out.push(Event::ObstaclePlaced { cell }),
            Err(reason) => out.push(Event::ObstacleRejected { cell, reason }),
        }
        result
    }

    fn queue(&mut self, events: Vec<Event>) {
        for event in events {
            if self.pending.len() == MAX_PENDING_EVENTS {
                let _ = self.pending.pop_front();
                debug!("dropping oldest pending event");
            }
            self.pending.push_back(event);
        }
    }
}

/// Consistent read model of the agent for renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Edge length of the grid.
    pub size: u32,
    /// Cell the agent departed from.
    pub start: Cell,
    /// Cell the agent tries to reach.
    pub goal: Cell,
    /// Obstacle cells in row-major order.
    pub obstacles: Vec<Cell>,
    /// Current agent position.
    pub position: Cell,
    /// Navigating latch.
    pub navigating: bool,
    /// Route cell the next step consumes.
    pub next_cell: Option<Cell>,
    /// Remaining route cells in start to goal order.
    pub route: Vec<Cell>,
    /// Lifecycle phase of the movement state machine.
    pub phase: Phase,
}

impl AgentSnapshot {
    /// Whether the agent stands on the goal cell.
    #[must_use]
    pub fn at_goal(&self) -> bool {
        self.position == self.goal
    }

    /// Cell to highlight as the upcoming step, shown only while navigating.
    #[must_use]
    pub fn highlighted_cell(&self) -> Option<Cell> {
        self.next_cell.filter(|_| self.navigating)
    }
}

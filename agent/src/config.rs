//! Construction-time configuration for the navigation agent.

use serde::Deserialize;
use waypoint_core::{Cell, ConfigError};
use waypoint_world::{max_random_obstacles, validate_layout};

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Grid and obstacle parameters used to build a [`crate::NavigationAgent`].
///
/// Every field has a default so partial TOML tables are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Edge length of the square grid.
    pub grid_size: u32,
    /// Number of obstacles placed at random.
    pub obstacle_count: usize,
    /// Cell the agent departs from.
    pub start: Cell,
    /// Cell the agent tries to reach.
    pub goal: Cell,
    /// Seed for the obstacle placement generator.
    pub seed: u64,
}

impl AgentConfig {
    /// Checks the grid bounds, the endpoints and the obstacle budget.
    ///
    /// Random placement never terminates when the obstacle count leaves no
    /// free cell, so that case is refused here instead of at placement time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_layout(self.grid_size, self.start, self.goal)?;

        let available = max_random_obstacles(self.grid_size);
        if self.obstacle_count > available {
            return Err(ConfigError::TooManyObstacles {
                requested: self.obstacle_count,
                available,
            });
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            obstacle_count: 20,
            start: Cell::new(0, 0),
            goal: Cell::new(9, 9),
            seed: DEFAULT_SEED,
        }
    }
}

//! Settings file loading and command-line overrides.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use waypoint_agent::AgentConfig;

/// Contents of the optional TOML settings file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Grid and obstacle parameters.
    pub(crate) agent: AgentConfig,
    /// Pacing of the autonomous scheduler.
    pub(crate) autopilot: AutopilotSettings,
}

/// Pacing of the autonomous scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AutopilotSettings {
    /// Delay between two scheduler cycles, in milliseconds.
    pub(crate) interval_ms: u64,
    /// Upper bound on scheduler cycles before giving up.
    pub(crate) max_ticks: u64,
}

impl AutopilotSettings {
    pub(crate) fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AutopilotSettings {
    fn default() -> Self {
        Self {
            interval_ms: 250,
            max_ticks: 1_000,
        }
    }
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    /// Parses settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }
}

//! Interchangeable step trigger sources.
//!
//! Both triggers hold a shared handle to the same [`NavigationAgent`] and may
//! live on different threads; the agent serializes their steps.

use std::sync::Arc;

use crate::{NavigationAgent, StepOutcome};

/// Collaborator that drives the movement state machine.
pub trait StepTrigger {
    /// Performs one activation and reports what the agent did.
    fn fire(&self) -> StepOutcome;
}

/// One step per external activation, such as a button press.
#[derive(Clone, Debug)]
pub struct ManualTrigger {
    agent: Arc<NavigationAgent>,
}

impl ManualTrigger {
    /// Creates a manual trigger for the shared agent.
    #[must_use]
    pub fn new(agent: Arc<NavigationAgent>) -> Self {
        Self { agent }
    }
}

impl StepTrigger for ManualTrigger {
    fn fire(&self) -> StepOutcome {
        self.agent.manual_step()
    }
}

/// Repeating scheduler activation that only steps while the agent is idle.
///
/// Without acknowledgement the latch stays set after the first move and every
/// later tick is a no-op. With `acknowledge_each_cycle` the trigger accepts the
/// previous move at the start of each cycle, so one move happens per cycle.
#[derive(Clone, Debug)]
pub struct AutonomousTrigger {
    agent: Arc<NavigationAgent>,
    acknowledge_each_cycle: bool,
}

impl AutonomousTrigger {
    /// Creates an autonomous trigger that leaves the latch to other callers.
    #[must_use]
    pub fn new(agent: Arc<NavigationAgent>) -> Self {
        Self {
            agent,
            acknowledge_each_cycle: false,
        }
    }

    /// Accepts the previous move before every tick.
    #[must_use]
    pub fn acknowledging_each_cycle(mut self) -> Self {
        self.acknowledge_each_cycle = true;
        self
    }
}

impl StepTrigger for AutonomousTrigger {
    fn fire(&self) -> StepOutcome {
        if self.acknowledge_each_cycle {
            self.agent.acknowledge();
        }
        self.agent.tick()
    }
}

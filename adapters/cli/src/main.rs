#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Waypoint navigation agent.
//!
//! The binary plays both external trigger roles: `manual` steps once per line
//! read from stdin, `auto` runs a repeating scheduler that ticks the agent and
//! acknowledges each move after it has been drawn.

mod render;
mod settings;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use waypoint_agent::{
    AgentConfig, AutonomousTrigger, ManualTrigger, NavigationAgent, StepOutcome, StepTrigger,
};
use waypoint_core::{Cell, Event};

use crate::settings::{AutopilotSettings, Settings};

/// Walk an agent across a grid of random obstacles.
#[derive(Debug, Parser)]
#[command(name = "waypoint", version)]
struct Cli {
    /// TOML settings file with `[agent]` and `[autopilot]` tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Edge length of the square grid.
    #[arg(long, global = true)]
    size: Option<u32>,
    /// Number of random obstacles.
    #[arg(long, global = true)]
    obstacles: Option<usize>,
    /// Start cell written as `x,y`.
    #[arg(long, global = true, value_parser = parse_cell)]
    start: Option<Cell>,
    /// Goal cell written as `x,y`.
    #[arg(long, global = true, value_parser = parse_cell)]
    goal: Option<Cell>,
    /// Seed for obstacle placement.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Take one step per line read from stdin; `q` quits.
    Manual,
    /// Tick the agent on a fixed interval until the route is consumed.
    Auto {
        /// Delay between scheduler cycles in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Maximum number of scheduler cycles.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
}

impl Cli {
    fn resolve(&self) -> Result<(AgentConfig, AutopilotSettings)> {
        let settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let mut agent = settings.agent;
        if let Some(size) = self.size {
            agent.grid_size = size;
        }
        if let Some(obstacles) = self.obstacles {
            agent.obstacle_count = obstacles;
        }
        if let Some(start) = self.start {
            agent.start = start;
        }
        if let Some(goal) = self.goal {
            agent.goal = goal;
        }
        if let Some(seed) = self.seed {
            agent.seed = seed;
        }

        let mut autopilot = settings.autopilot;
        if let Mode::Auto {
            interval_ms,
            max_ticks,
        } = &self.mode
        {
            if let Some(interval_ms) = interval_ms {
                autopilot.interval_ms = *interval_ms;
            }
            if let Some(max_ticks) = max_ticks {
                autopilot.max_ticks = *max_ticks;
            }
        }

        Ok((agent, autopilot))
    }
}

/// Entry point for the Waypoint command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let (config, autopilot) = cli.resolve()?;
    debug!(?config, ?autopilot, "resolved configuration");

    let agent = NavigationAgent::new(&config).context("invalid navigation configuration")?;
    let agent = Arc::new(agent);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render::render(&agent.snapshot()))?;

    match cli.mode {
        Mode::Manual => run_manual(&agent, io::stdin().lock(), &mut out),
        Mode::Auto { .. } => run_autopilot(&agent, &autopilot, &mut out),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_manual(
    agent: &Arc<NavigationAgent>,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let trigger = ManualTrigger::new(Arc::clone(agent));

    for line in input.lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }

        let outcome = trigger.fire();
        report(agent, out)?;
        if outcome == StepOutcome::NoRoute {
            break;
        }
    }

    writeln!(out, "{}", render::status_line(&agent.snapshot()))?;
    Ok(())
}

fn run_autopilot(
    agent: &Arc<NavigationAgent>,
    autopilot: &AutopilotSettings,
    out: &mut impl Write,
) -> Result<()> {
    let trigger = AutonomousTrigger::new(Arc::clone(agent));
    let mut ticks = 0;

    while ticks < autopilot.max_ticks {
        ticks += 1;
        match trigger.fire() {
            StepOutcome::NoRoute => break,
            StepOutcome::Latched => {}
            _ => {
                report(agent, out)?;
                thread::sleep(autopilot.interval());
                agent.acknowledge();
            }
        }
    }

    info!(ticks, "autopilot stopped");
    writeln!(out, "{}", render::status_line(&agent.snapshot()))?;
    Ok(())
}

fn report(agent: &NavigationAgent, out: &mut impl Write) -> Result<()> {
    for event in agent.drain_events() {
        match event {
            Event::StepRejected {
                at,
                direction,
                discarded,
            } => writeln!(
                out,
                "move {direction:?} from {at} refused, dropped route cell {discarded}"
            )?,
            Event::RouteExhausted {
                reached_goal: false,
                position,
            } => writeln!(out, "route consumed away from the goal at {position}")?,
            _ => {}
        }
    }
    write!(out, "{}", render::render(&agent.snapshot()))?;
    out.flush()?;
    Ok(())
}

fn parse_cell(value: &str) -> Result<Cell, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(Cell::new(x, y))
}

//! Plain-text rendering of agent snapshots.

use std::fmt::Write as _;

use waypoint_agent::{AgentSnapshot, Phase};
use waypoint_core::Cell;

const OBSTACLE: char = '#';
const START: char = 'S';
const GOAL: char = 'G';
const AGENT: char = 'A';
const NEXT: char = '*';
const FREE: char = '.';

/// Draws the grid one row per line, followed by a status line.
pub(crate) fn render(snapshot: &AgentSnapshot) -> String {
    let mut out = String::new();
    let highlighted = snapshot.highlighted_cell();

    for y in 0..snapshot.size {
        for x in 0..snapshot.size {
            let cell = Cell::new(x, y);
            let glyph = if cell == snapshot.position {
                AGENT
            } else if snapshot.obstacles.contains(&cell) {
                OBSTACLE
            } else if Some(cell) == highlighted {
                NEXT
            } else if cell == snapshot.start {
                START
            } else if cell == snapshot.goal {
                GOAL
            } else {
                FREE
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", status_line(snapshot));
    out
}

/// One-line summary of where the agent stands.
pub(crate) fn status_line(snapshot: &AgentSnapshot) -> String {
    match snapshot.phase {
        Phase::Arrived if snapshot.at_goal() => {
            format!("agent reached the goal at {}", snapshot.position)
        }
        Phase::Arrived => format!(
            "agent has nowhere to go, stopped at {} (goal {})",
            snapshot.position, snapshot.goal
        ),
        Phase::Idle | Phase::Stepping => format!(
            "agent at {}, {} route cells left",
            snapshot.position,
            snapshot.route.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AgentSnapshot {
        AgentSnapshot {
            size: 3,
            start: Cell::new(0, 0),
            goal: Cell::new(2, 2),
            obstacles: vec![Cell::new(1, 1)],
            position: Cell::new(0, 1),
            navigating: true,
            next_cell: Some(Cell::new(0, 2)),
            route: vec![Cell::new(0, 2), Cell::new(1, 2), Cell::new(2, 2)],
            phase: Phase::Stepping,
        }
    }

    #[test]
    fn render_marks_every_kind_of_cell() {
        let text = render(&snapshot());

        assert_eq!(
            text,
            "S..\nA#.\n*.G\nagent at (0, 1), 3 route cells left\n"
        );
    }

    #[test]
    fn next_cell_is_hidden_when_idle() {
        let mut idle = snapshot();
        idle.navigating = false;
        idle.phase = Phase::Idle;

        assert!(render(&idle).starts_with("S..\nA#.\n..G\n"));
    }

    #[test]
    fn status_distinguishes_goal_from_dead_end() {
        let mut done = snapshot();
        done.phase = Phase::Arrived;
        done.route.clear();
        done.position = done.goal;
        assert_eq!(status_line(&done), "agent reached the goal at (2, 2)");

        done.position = Cell::new(0, 0);
        assert_eq!(
            status_line(&done),
            "agent has nowhere to go, stopped at (0, 0) (goal (2, 2))"
        );
    }
}

use std::{sync::Arc, thread};

use waypoint_agent::{
    AgentConfig, AutonomousTrigger, ManualTrigger, NavigationAgent, Phase, StepOutcome,
    StepTrigger,
};
use waypoint_core::{Cell, Command, ConfigError, Event, ObstacleError, Trigger};
use waypoint_world::Grid;

fn open_agent(size: u32, goal: Cell) -> NavigationAgent {
    let config = AgentConfig {
        grid_size: size,
        obstacle_count: 0,
        start: Cell::new(0, 0),
        goal,
        seed: 3,
    };
    NavigationAgent::new(&config).expect("valid config")
}

#[test]
fn invalid_configuration_aborts_setup() {
    let config = AgentConfig {
        start: Cell::new(10, 0),
        ..AgentConfig::default()
    };

    let error = NavigationAgent::new(&config).expect_err("start outside grid");

    assert_eq!(
        error,
        ConfigError::StartOutOfBounds {
            cell: Cell::new(10, 0),
            size: 10,
        }
    );
}

#[test]
fn default_configuration_places_twenty_obstacles() {
    let agent = NavigationAgent::new(&AgentConfig::default()).expect("default config");
    let snapshot = agent.snapshot();

    assert_eq!(snapshot.size, 10);
    assert_eq!(snapshot.obstacles.len(), 20);
    assert!(!snapshot.obstacles.contains(&snapshot.start));
    assert!(!snapshot.obstacles.contains(&snapshot.goal));
    assert_eq!(snapshot.position, snapshot.start);
    assert!(!snapshot.navigating);
}

#[test]
fn same_seed_builds_the_same_layout() {
    let config = AgentConfig {
        seed: 11,
        ..AgentConfig::default()
    };
    let first = NavigationAgent::new(&config).expect("valid config").snapshot();
    let second = NavigationAgent::new(&config).expect("valid config").snapshot();

    assert_eq!(first, second);
}

#[test]
fn manual_trigger_walks_to_the_goal() {
    let agent = Arc::new(open_agent(3, Cell::new(2, 2)));
    let trigger = ManualTrigger::new(Arc::clone(&agent));

    for _ in 0..5 {
        assert!(trigger.fire().consumed_route_cell());
    }
    assert_eq!(trigger.fire(), StepOutcome::NoRoute);

    let snapshot = agent.snapshot();
    assert!(snapshot.at_goal());
    assert_eq!(snapshot.phase, Phase::Arrived);
    assert!(snapshot.route.is_empty());
}

#[test]
fn autonomous_trigger_latches_until_acknowledged() {
    let agent = Arc::new(open_agent(4, Cell::new(3, 3)));
    let trigger = AutonomousTrigger::new(Arc::clone(&agent));
    let remaining = agent.snapshot().route.len();

    let first = trigger.fire();
    let second = trigger.fire();

    assert!(first.consumed_route_cell());
    assert_eq!(second, StepOutcome::Latched);
    assert_eq!(agent.snapshot().route.len(), remaining - 1);

    agent.acknowledge();
    assert!(trigger.fire().consumed_route_cell());
    assert_eq!(agent.snapshot().route.len(), remaining - 2);
}

#[test]
fn acknowledging_autonomous_trigger_reaches_the_goal() {
    let agent = Arc::new(open_agent(5, Cell::new(4, 2)));
    let trigger = AutonomousTrigger::new(Arc::clone(&agent)).acknowledging_each_cycle();

    for _ in 0..64 {
        let _ = trigger.fire();
    }

    assert!(agent.snapshot().at_goal());
}

#[test]
fn enclosed_start_is_reported_as_nothing_to_do() {
    let start = Cell::new(2, 2);
    let walls = [
        Cell::new(1, 2),
        Cell::new(3, 2),
        Cell::new(2, 1),
        Cell::new(2, 3),
    ];
    let grid = Grid::with_obstacles(5, start, Cell::new(0, 0), &walls).expect("valid grid");
    let agent = NavigationAgent::from_grid(grid);

    assert_eq!(agent.manual_step(), StepOutcome::NoRoute);
    assert_eq!(agent.tick(), StepOutcome::NoRoute);

    let snapshot = agent.snapshot();
    assert_eq!(snapshot.position, start);
    assert!(!snapshot.at_goal());
    assert_eq!(snapshot.phase, Phase::Arrived);
    assert!(agent.drain_events().is_empty());
}

#[test]
fn highlight_follows_the_navigating_latch() {
    let agent = open_agent(3, Cell::new(2, 2));
    assert_eq!(agent.snapshot().highlighted_cell(), None);

    let _ = agent.manual_step();
    let snapshot = agent.snapshot();
    assert_eq!(snapshot.highlighted_cell(), Some(Cell::new(0, 1)));

    agent.acknowledge();
    assert_eq!(agent.snapshot().highlighted_cell(), None);
}

#[test]
fn commands_and_obstacles_emit_notifications() {
    let agent = open_agent(3, Cell::new(2, 2));

    assert_eq!(
        agent.place_obstacle(Cell::new(2, 2)),
        Err(ObstacleError::Endpoint)
    );
    assert_eq!(agent.place_obstacle(Cell::new(1, 1)), Ok(()));
    assert_eq!(
        agent.apply(Command::Step {
            trigger: Trigger::Manual
        }),
        Some(StepOutcome::Held {
            at: Cell::new(0, 0)
        })
    );
    assert_eq!(agent.apply(Command::Acknowledge), None);

    assert_eq!(
        agent.drain_events(),
        vec![
            Event::ObstacleRejected {
                cell: Cell::new(2, 2),
                reason: ObstacleError::Endpoint,
            },
            Event::ObstaclePlaced {
                cell: Cell::new(1, 1)
            },
            Event::PositionChanged {
                from: Cell::new(0, 0),
                to: Cell::new(0, 0),
                trigger: Trigger::Manual,
            },
            Event::Acknowledged,
        ]
    );
    assert!(agent.drain_events().is_empty());
}

#[test]
fn obstacle_cannot_be_placed_under_the_agent() {
    let agent = open_agent(3, Cell::new(2, 2));
    let _ = agent.manual_step();
    let _ = agent.manual_step();
    let position = agent.snapshot().position;
    assert_eq!(position, Cell::new(0, 1));
    let _ = agent.drain_events();

    assert_eq!(
        agent.place_obstacle(position),
        Err(ObstacleError::AgentCell)
    );
    let _ = agent.apply(Command::PlaceObstacle { cell: position });

    let snapshot = agent.snapshot();
    assert!(!snapshot.obstacles.contains(&snapshot.position));
    assert_eq!(
        agent.drain_events(),
        vec![
            Event::ObstacleRejected {
                cell: position,
                reason: ObstacleError::AgentCell,
            },
            Event::ObstacleRejected {
                cell: position,
                reason: ObstacleError::AgentCell,
            },
        ]
    );
}

#[test]
fn concurrent_triggers_consume_each_route_cell_once() {
    let agent = Arc::new(open_agent(8, Cell::new(7, 7)));
    let original = agent.snapshot().route.len();
    assert!(original > 0);

    let mut handles = Vec::new();
    for _ in 0..3 {
        let trigger = ManualTrigger::new(Arc::clone(&agent));
        handles.push(thread::spawn(move || {
            (0..40)
                .filter(|_| trigger.fire().consumed_route_cell())
                .count()
        }));
    }
    let autonomous = AutonomousTrigger::new(Arc::clone(&agent)).acknowledging_each_cycle();
    handles.push(thread::spawn(move || {
        (0..40)
            .filter(|_| autonomous.fire().consumed_route_cell())
            .count()
    }));

    let consumed: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("trigger thread"))
        .sum();

    assert_eq!(consumed, original);
    let snapshot = agent.snapshot();
    assert!(snapshot.route.is_empty());
    assert!(snapshot.at_goal());

    let position_changes = agent
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::PositionChanged { .. }))
        .count();
    assert_eq!(position_changes, original);
}

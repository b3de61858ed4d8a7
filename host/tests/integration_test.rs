use maze_core::goal::distances_from;
use maze_core::{
    select_goal, shortest_cells, Control, Graph, Maze, MonoRandom, OutcomeKind, RngKind, SessionError, SimpleLCG,
    CELL_COUNT, GOAL_DISTANCE,
};
use maze_host::{HostError, MazeSession, SessionSeeds};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Rule seed used throughout; any value works
const RULE_SEED: i32 = 2918;

fn lattice() -> Arc<Graph> {
    Arc::new(Graph::lattice())
}

fn generate(seed: i32) -> Maze {
    Maze::generate(&Graph::lattice(), &mut MonoRandom::new(seed)).expect("Maze generation failed")
}

fn start(rule_seed: i32, placement_seed: u32, rng: RngKind) -> MazeSession {
    MazeSession::start(lattice(), SessionSeeds::new(rule_seed, placement_seed), rng, 7).expect("Session start failed")
}

fn command_for(control: Control) -> String {
    match control {
        Control::Slot(slot) => format!("move {}", slot + 1),
        Control::Bridge => "bridge".to_string(),
    }
}

#[test]
fn test_same_seed_same_maze() {
    let a = generate(RULE_SEED);
    let b = generate(RULE_SEED);
    assert_eq!(a, b, "Same rule seed should give the same maze");

    let other = generate(RULE_SEED + 1);
    assert_ne!(a.edges(), other.edges(), "Different rule seeds should carve different mazes");

    let lcg = Maze::generate(&Graph::lattice(), &mut SimpleLCG::new(RULE_SEED as u32)).unwrap();
    assert_ne!(a.edges(), lcg.edges(), "Generators should not coincide");
}

#[test]
fn test_spanning_tree_shape() {
    let graph = Graph::lattice();
    let maze = generate(RULE_SEED);
    assert_eq!(maze.len(), CELL_COUNT);
    assert_eq!(maze.edge_count(), CELL_COUNT - 1);

    for cell in 0..maze.len() {
        for other in maze.passages(cell) {
            assert!(maze.is_passable(other, cell), "Passage {}-{} is one-way", cell, other);
            assert!(graph.links(cell).contains(&other), "Passage {}-{} is not a graph link", cell, other);
        }
    }

    // Everything is reachable from cell 0
    let distances = distances_from(&maze, 0);
    assert!(distances.iter().all(Option::is_some));
}

#[test]
fn test_labels_are_a_permutation() {
    let maze = generate(RULE_SEED);
    let labels: BTreeSet<String> = maze.labels().iter().map(|l| l.to_string()).collect();
    assert_eq!(labels.len(), CELL_COUNT);
    assert!(labels.contains("AA") && labels.contains("ZZ"));

    for cell in [0, 100, CELL_COUNT - 1] {
        let label = maze.label(cell).unwrap();
        assert_eq!(maze.cell_by_label(label.as_str()), Some(cell));
        assert_eq!(maze.cell_by_label(&label.as_str().to_lowercase()), Some(cell));
    }
}

#[test]
fn test_goal_distance_for_every_start() {
    let maze = generate(RULE_SEED);
    for start in 0..CELL_COUNT {
        let goal = select_goal(&maze, start, &mut SimpleLCG::new(start as u32 + 1)).expect("No goal found");
        let distance = distances_from(&maze, start)[goal].unwrap();
        assert!(
            GOAL_DISTANCE.contains(&distance),
            "Goal {} is {} steps from start {}",
            goal,
            distance,
            start
        );
    }
}

#[test]
fn test_solution_walks_to_goal() {
    for placement_seed in [1, 2, 3, 99] {
        let mut session = start(RULE_SEED, placement_seed, RngKind::Mono);
        let inner = session.session();
        let cells = shortest_cells(inner.graph(), inner.maze(), inner.start(), inner.goal()).unwrap();
        let controls = session.solution();
        assert_eq!(controls.len(), cells.len() - 1);
        assert!(GOAL_DISTANCE.contains(&controls.len()));

        for (i, control) in controls.iter().enumerate() {
            let report = session.press(*control).unwrap();
            assert_eq!(report.current, cells[i + 1]);
            let expected = if i + 1 == controls.len() { OutcomeKind::Reached } else { OutcomeKind::Moved };
            assert_eq!(report.kind, expected);
        }
        assert!(session.is_solved());
        assert_eq!(session.strikes(), 0);
    }
}

#[test]
fn test_reset_is_idempotent() {
    let mut session = start(RULE_SEED, 5, RngKind::Mono);
    let first = session.solution()[0];
    session.press(first).unwrap();
    assert_ne!(session.session().current(), session.session().start());

    session.reset().unwrap();
    let once = session.session().state();
    session.reset().unwrap();
    assert_eq!(session.session().state(), once);
    assert_eq!(once.current, once.start);
    assert!(!once.showing_goal);
}

#[test]
fn test_solved_is_terminal() {
    let mut session = start(RULE_SEED, 6, RngKind::Lcg);
    session.auto_solve(Duration::ZERO).unwrap();
    let solved = session.session().state();
    assert!(solved.solved);
    assert_eq!(solved.current, solved.goal);

    assert!(matches!(session.press(Control::Slot(0)), Err(HostError::Session(SessionError::Solved))));
    assert!(matches!(session.reset(), Err(HostError::Session(SessionError::Solved))));
    assert!(session.run_command("move 1").is_err());
    assert_eq!(session.session().state(), solved);
}

#[test]
fn test_command_chain_follows_solution() {
    let mut session = start(RULE_SEED, 8, RngKind::Mono);
    let controls = session.solution();

    // One command per press, each digit read as an absolute arrow
    for control in controls {
        let reports = session.run_command(&command_for(control)).unwrap();
        assert_eq!(reports.len(), 1);
    }
    assert!(session.is_solved());
}

#[test]
fn test_command_failure_reports_prefix() {
    let mut session = start(RULE_SEED, 9, RngKind::Mono);
    let arrows = session.session().control_count();
    let first = command_for(session.solution()[0]);

    match session.run_command(&format!("{} dance", first)) {
        Err(HostError::Command(failure)) => {
            assert_eq!(failure.to_string(), "unrecognized command: dance");
            assert_eq!(failure.reports.len(), 1);
        }
        other => panic!("Expected command failure, got {:?}", other),
    }

    session.reset().unwrap();
    if arrows < 8 {
        let err = session.run_command("move 8").unwrap_err();
        assert_eq!(err.to_string(), "that first number is not a valid arrow");
    }
}

#[test]
fn test_auto_solve_from_midway() {
    let mut session = start(RULE_SEED, 10, RngKind::Mono);
    let total = session.solution().len();
    let first = session.solution()[0];
    session.press(first).unwrap();

    let reports = session.auto_solve(Duration::ZERO).unwrap();
    assert_eq!(reports.len(), total - 1);
    assert!(session.is_solved());
}

#[test]
fn test_generators_are_selectable() {
    let mono = start(RULE_SEED, 1, RngKind::Mono).export();
    let again = start(RULE_SEED, 1, RngKind::Mono).export();
    let lcg = start(RULE_SEED, 1, RngKind::Lcg).export();
    assert_eq!(mono, again);
    assert_eq!(mono.rng, RngKind::Mono);
    assert_eq!(lcg.rng, RngKind::Lcg);
    assert_ne!(mono.edges, lcg.edges);
}

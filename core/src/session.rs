//! Traversal session: the state machine driven by control presses
//!
//! States are `Active` (current != goal) and `Solved` (terminal). Every
//! press resolves the control against the raw graph first, then against the
//! generated passages:
//! - no target          -> `InvalidControl`, nothing changes
//! - target not passable -> `Blocked`, nothing changes (a strike for the host)
//! - target passable    -> move; the bridge also flips `showing_goal`;
//!                         `Reached` if the goal was entered, else `Moved`

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{GenerationFault, SessionError};
use crate::goal::select_goal;
use crate::graph::{Control, Graph};
use crate::maze_gen::{CellLabel, Maze};
use crate::rng::MazeRng;
use crate::solver::shortest_path;

/// What a single press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutcomeKind {
    Moved,
    Blocked,
    InvalidControl,
    Reached,
}

impl OutcomeKind {
    /// Whether the host should register a strike
    pub fn is_strike(self) -> bool {
        matches!(self, OutcomeKind::Blocked)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, OutcomeKind::Blocked | OutcomeKind::InvalidControl)
    }
}

/// Result of one press, emitted for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveReport {
    pub control: Control,
    pub from: usize,
    /// Where the control points in the raw graph, if anywhere
    pub target: Option<usize>,
    /// Cell after the press (equal to `from` unless the move succeeded)
    pub current: usize,
    pub kind: OutcomeKind,
}

/// Snapshot of the mutable session fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState {
    pub start: usize,
    pub goal: usize,
    pub current: usize,
    /// Flipped on every bridge crossing; decides which label is obscured
    pub showing_goal: bool,
    pub solved: bool,
}

/// One play-through of a generated maze
#[derive(Debug, Clone)]
pub struct Session {
    graph: Arc<Graph>,
    maze: Maze,
    state: SessionState,
}

impl Session {
    /// Start a session on an already generated maze
    pub fn new(graph: Arc<Graph>, maze: Maze, start: usize, goal: usize) -> Result<Self, GenerationFault> {
        let count = maze.len();
        if start >= count || start >= graph.len() {
            return Err(GenerationFault::StartOutOfRange { start, count });
        }
        if goal >= count || goal >= graph.len() {
            return Err(GenerationFault::GoalOutOfRange { goal, count });
        }

        Ok(Self {
            graph,
            maze,
            state: SessionState {
                start,
                goal,
                current: start,
                showing_goal: false,
                solved: start == goal,
            },
        })
    }

    /// Generate the maze, then place start and goal
    ///
    /// `maze_rng` carries the shared seed and fully determines the layout and
    /// labels. `placement_rng` draws the start cell and the goal.
    pub fn generate<M: MazeRng, P: MazeRng>(
        graph: Arc<Graph>,
        maze_rng: &mut M,
        placement_rng: &mut P,
    ) -> Result<Self, GenerationFault> {
        let maze = Maze::generate(&graph, maze_rng)?;
        let start = placement_rng.next_int(maze.len());
        let goal = select_goal(&maze, start, placement_rng)?;
        Self::new(graph, maze, start, goal)
    }

    /// Apply one control press
    ///
    /// # Returns
    /// * `Ok(MoveReport)` - the outcome, including failed attempts
    /// * `Err(SessionError::Solved)` - the session is over; nothing changes
    pub fn handle_move(&mut self, control: Control) -> Result<MoveReport, SessionError> {
        if self.state.solved {
            return Err(SessionError::Solved);
        }

        let from = self.state.current;
        let target = self.graph.target(from, control);
        let kind = match target {
            None => OutcomeKind::InvalidControl,
            Some(to) if !self.maze.is_passable(from, to) => OutcomeKind::Blocked,
            Some(to) => {
                if control == Control::Bridge {
                    self.state.showing_goal = !self.state.showing_goal;
                }
                self.state.current = to;
                if to == self.state.goal {
                    self.state.solved = true;
                    OutcomeKind::Reached
                } else {
                    OutcomeKind::Moved
                }
            }
        };

        Ok(MoveReport {
            control,
            from,
            target,
            current: self.state.current,
            kind,
        })
    }

    /// Return to the start cell and clear the bridge flag
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.state.solved {
            return Err(SessionError::Solved);
        }
        self.state.current = self.state.start;
        self.state.showing_goal = false;
        Ok(())
    }

    /// Controls leading from the current cell to the goal, shortest first
    pub fn solution(&self) -> Vec<Control> {
        shortest_path(&self.graph, &self.maze, self.state.current, self.state.goal).unwrap_or_default()
    }

    /// Slot of the current cell that leads back to `previous`, if any
    pub fn incoming_slot(&self, previous: usize) -> Option<usize> {
        self.graph.slot_to(self.state.current, previous)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current(&self) -> usize {
        self.state.current
    }

    pub fn start(&self) -> usize {
        self.state.start
    }

    pub fn goal(&self) -> usize {
        self.state.goal
    }

    pub fn is_solved(&self) -> bool {
        self.state.solved
    }

    pub fn showing_goal(&self) -> bool {
        self.state.showing_goal
    }

    /// Number of arrows shown in the current cell
    pub fn control_count(&self) -> usize {
        self.graph.control_count(self.state.current)
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn label(&self, cell: usize) -> Option<CellLabel> {
        self.maze.label(cell)
    }

    pub fn current_label(&self) -> Option<CellLabel> {
        self.maze.label(self.state.current)
    }

    pub fn goal_label(&self) -> Option<CellLabel> {
        self.maze.label(self.state.goal)
    }

    /// Goal label as displayed: only while the bridge flag is set
    pub fn revealed_goal(&self) -> Option<CellLabel> {
        self.state.showing_goal.then(|| self.goal_label()).flatten()
    }

    /// Current label as displayed: hidden while the goal is shown
    pub fn revealed_current(&self) -> Option<CellLabel> {
        (!self.state.showing_goal).then(|| self.current_label()).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CellLinks;
    use crate::mono_random::MonoRandom;
    use crate::rng::SimpleLCG;
    use crate::goal::{distances_from, GOAL_DISTANCE};
    use alloc::vec;

    fn star_session(goal: usize) -> Session {
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1), Some(2)], None),
            CellLinks::with_targets(&[Some(0)], None),
            CellLinks::with_targets(&[Some(0)], None),
        ])
        .unwrap();
        let maze = Maze::from_passages(3, &[(0, 1), (0, 2)]).unwrap();
        Session::new(Arc::new(graph), maze, 0, goal).unwrap()
    }

    /// 0 -slot0-> 1, 1 -bridge-> 2, 2 -slot0-> 3; raw link 0 -slot1-> 3 is walled
    fn bridge_session() -> Session {
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1), Some(3)], None),
            CellLinks::with_targets(&[Some(0)], Some(2)),
            CellLinks::with_targets(&[Some(3)], Some(1)),
            CellLinks::with_targets(&[Some(2), Some(0)], None),
        ])
        .unwrap();
        let maze = Maze::from_passages(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        Session::new(Arc::new(graph), maze, 0, 3).unwrap()
    }

    #[test]
    fn test_star_move_then_invalid_control() {
        let mut session = star_session(2);

        let report = session.handle_move(Control::Slot(0)).unwrap();
        assert_eq!(report.kind, OutcomeKind::Moved);
        assert_eq!(report.current, 1);
        assert_eq!(session.current(), 1);

        // Cell 1 only has slot 0
        let report = session.handle_move(Control::Slot(1)).unwrap();
        assert_eq!(report.kind, OutcomeKind::InvalidControl);
        assert_eq!(report.target, None);
        assert_eq!(session.current(), 1);
    }

    #[test]
    fn test_star_reach_goal() {
        let mut session = star_session(1);
        let report = session.handle_move(Control::Slot(0)).unwrap();
        assert_eq!(report.kind, OutcomeKind::Reached);
        assert!(session.is_solved());
    }

    #[test]
    fn test_blocked_keeps_state() {
        let mut session = bridge_session();
        let before = session.state();

        let report = session.handle_move(Control::Slot(1)).unwrap();
        assert_eq!(report.kind, OutcomeKind::Blocked);
        assert_eq!(report.target, Some(3));
        assert!(report.kind.is_strike());
        assert_eq!(session.state(), before);
    }

    #[test]
    fn test_missing_bridge_is_invalid() {
        let mut session = bridge_session();
        let report = session.handle_move(Control::Bridge).unwrap();
        assert_eq!(report.kind, OutcomeKind::InvalidControl);
        assert!(!report.kind.is_strike());
        assert!(report.kind.is_failure());
    }

    #[test]
    fn test_bridge_flips_flag() {
        let mut session = bridge_session();
        session.handle_move(Control::Slot(0)).unwrap();
        assert_eq!(session.revealed_goal(), None);
        assert!(session.revealed_current().is_some());

        let report = session.handle_move(Control::Bridge).unwrap();
        assert_eq!(report.kind, OutcomeKind::Moved);
        assert_eq!(session.current(), 2);
        assert!(session.showing_goal());
        assert_eq!(session.revealed_goal(), session.goal_label());
        assert_eq!(session.revealed_current(), None);

        session.handle_move(Control::Bridge).unwrap();
        assert_eq!(session.current(), 1);
        assert!(!session.showing_goal());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = bridge_session();
        session.handle_move(Control::Slot(0)).unwrap();
        session.handle_move(Control::Bridge).unwrap();

        session.reset().unwrap();
        assert_eq!(session.current(), session.start());
        assert!(!session.showing_goal());

        session.reset().unwrap();
        assert_eq!(session.current(), session.start());
        assert!(!session.showing_goal());
    }

    #[test]
    fn test_solved_is_terminal() {
        let mut session = bridge_session();
        for control in [Control::Slot(0), Control::Bridge, Control::Slot(0)] {
            session.handle_move(control).unwrap();
        }
        assert!(session.is_solved());
        assert_eq!(session.current(), 3);

        assert_eq!(session.handle_move(Control::Slot(0)), Err(SessionError::Solved));
        assert_eq!(session.handle_move(Control::Bridge), Err(SessionError::Solved));
        assert_eq!(session.reset(), Err(SessionError::Solved));
        assert_eq!(session.current(), 3);
    }

    #[test]
    fn test_solution_from_current() {
        let mut session = bridge_session();
        assert_eq!(
            session.solution(),
            vec![Control::Slot(0), Control::Bridge, Control::Slot(0)]
        );
        session.handle_move(Control::Slot(0)).unwrap();
        assert_eq!(session.solution(), vec![Control::Bridge, Control::Slot(0)]);
    }

    #[test]
    fn test_incoming_slot() {
        let mut session = bridge_session();
        session.handle_move(Control::Slot(0)).unwrap();
        assert_eq!(session.incoming_slot(0), Some(0));
        assert_eq!(session.incoming_slot(2), None);
    }

    #[test]
    fn test_new_validates_cells() {
        let graph = Arc::new(Graph::lattice());
        let maze = Maze::from_passages(3, &[(0, 1), (1, 2)]).unwrap();
        assert!(matches!(
            Session::new(graph.clone(), maze.clone(), 5, 0),
            Err(GenerationFault::StartOutOfRange { start: 5, .. })
        ));
        assert!(matches!(
            Session::new(graph, maze, 0, 9),
            Err(GenerationFault::GoalOutOfRange { goal: 9, .. })
        ));
    }

    #[test]
    fn test_generate_places_goal_in_range() {
        let graph = Arc::new(Graph::lattice());
        let session = Session::generate(graph, &mut MonoRandom::new(1), &mut SimpleLCG::new(2)).unwrap();
        let dist = distances_from(session.maze(), session.start())[session.goal()].unwrap();
        assert!(GOAL_DISTANCE.contains(&dist));
        assert!(!session.is_solved());
        assert_eq!(session.current(), session.start());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let graph = Arc::new(Graph::lattice());
        let a = Session::generate(graph.clone(), &mut MonoRandom::new(9), &mut SimpleLCG::new(9)).unwrap();
        let b = Session::generate(graph, &mut MonoRandom::new(9), &mut SimpleLCG::new(9)).unwrap();
        assert_eq!(a.state(), b.state());
        assert_eq!(a.maze(), b.maze());
    }
}

//! Host-side wrapper around the maze core
//!
//! A [`MazeSession`] owns one play-through: it seeds the generators, logs
//! every transition with `tracing`, counts strikes, runs text commands and
//! drives the automated solve. The numeric `module_id` used in log lines is
//! handed in by whoever creates the session.

pub mod config;
pub mod error;
pub mod persist;

use std::sync::Arc;
use std::time::Duration;

use maze_core::{
    run_command_observed, shortest_path, CommandStep, Control, Graph, MonoRandom, MoveReport, OutcomeKind, RngKind,
    Session,
};
use serde::{Deserialize, Serialize};

pub use config::HostConfig;
pub use error::{HostError, HostResult};
pub use persist::{load_export, load_graph, save_export, save_graph, MazeExport};

/// Seeds for one session
///
/// `rule_seed` fixes the maze layout and labels and is meant to be shared.
/// `placement_seed` picks the start and goal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSeeds {
    pub rule_seed: i32,
    pub placement_seed: u32,
}

impl SessionSeeds {
    pub fn new(rule_seed: i32, placement_seed: u32) -> Self {
        Self { rule_seed, placement_seed }
    }

    /// Generator that draws the start cell, then the goal
    pub fn placement_rng(&self) -> MonoRandom {
        MonoRandom::new(self.placement_seed as i32)
    }
}

/// What a player is allowed to see of a session
///
/// Cell indices are left out; on a known graph they would give the goal away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub module_id: u64,
    pub showing_goal: bool,
    pub solved: bool,
    /// Current label, hidden ("??") while the goal is shown
    pub current_label: String,
    /// Goal label, hidden ("??") until the bridge flag is set
    pub goal_label: String,
    pub arrows: usize,
    pub has_bridge: bool,
    pub strikes: u32,
}

/// One logged, strike-counting play-through
#[derive(Debug, Clone)]
pub struct MazeSession {
    module_id: u64,
    seeds: SessionSeeds,
    rng: RngKind,
    session: Session,
    strikes: u32,
}

impl MazeSession {
    /// Generate the maze for `seeds` and place start and goal
    pub fn start(graph: Arc<Graph>, seeds: SessionSeeds, rng: RngKind, module_id: u64) -> HostResult<Self> {
        tracing::info!(module_id, "Using rule seed: {} ({} generator).", seeds.rule_seed, rng);

        let session = rng.with_rng(seeds.rule_seed, |mut maze_rng| {
            let mut placement_rng = seeds.placement_rng();
            Session::generate(graph, &mut maze_rng, &mut placement_rng)
        });
        let session = match session {
            Ok(session) => session,
            Err(fault) => {
                tracing::error!(module_id, "Maze generation failed: {}", fault);
                return Err(fault.into());
            }
        };

        let maze_session = Self {
            module_id,
            seeds,
            rng,
            session,
            strikes: 0,
        };
        tracing::info!(module_id, "Start cell: {}", maze_session.name(maze_session.session.start()));
        tracing::info!(module_id, "Goal cell: {}", maze_session.name(maze_session.session.goal()));
        Ok(maze_session)
    }

    /// Press one control
    pub fn press(&mut self, control: Control) -> HostResult<MoveReport> {
        let report = match self.session.handle_move(control) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(module_id = self.module_id, "Ignoring {} press: {}", control, err);
                return Err(err.into());
            }
        };
        self.record(&report);
        Ok(report)
    }

    /// Return to the start cell
    pub fn reset(&mut self) -> HostResult<()> {
        self.session.reset()?;
        tracing::info!(module_id = self.module_id, "Reset to {}.", self.name(self.session.start()));
        Ok(())
    }

    /// Run a text command such as `move 123 bridge`
    pub fn run_command(&mut self, command: &str) -> HostResult<Vec<MoveReport>> {
        tracing::debug!(module_id = self.module_id, "Command: {}", command);
        let mut steps = Vec::new();
        let result = run_command_observed(&mut self.session, command, |step| steps.push(step));

        for step in steps {
            match step {
                CommandStep::Press(report) => self.record(&report),
                CommandStep::Reset { to } => {
                    tracing::info!(module_id = self.module_id, "Reset to {}.", self.name(to));
                }
            }
        }

        result.map_err(|failure| {
            tracing::warn!(module_id = self.module_id, "Command '{}' stopped: {}", command, failure);
            failure.into()
        })
    }

    /// Controls that walk from the current cell to the goal
    pub fn solution(&self) -> Vec<Control> {
        self.session.solution()
    }

    /// Shortest control sequence between two labelled cells
    pub fn path_between(&self, from: &str, to: &str) -> HostResult<Vec<Control>> {
        let maze = self.session.maze();
        let from_cell = maze.cell_by_label(from).ok_or_else(|| HostError::UnknownLabel(from.to_string()))?;
        let to_cell = maze.cell_by_label(to).ok_or_else(|| HostError::UnknownLabel(to.to_string()))?;
        Ok(shortest_path(self.session.graph(), maze, from_cell, to_cell).unwrap_or_default())
    }

    /// Replay the solver's path, pausing `delay` after each press
    ///
    /// The path is computed once from the current cell. Stops as soon as the
    /// goal is reached; does nothing on a solved session.
    pub fn auto_solve(&mut self, delay: Duration) -> HostResult<Vec<MoveReport>> {
        if self.session.is_solved() {
            return Ok(Vec::new());
        }

        let controls = self.solution();
        tracing::info!(module_id = self.module_id, "Auto-solving in {} moves.", controls.len());

        let mut reports = Vec::with_capacity(controls.len());
        for control in controls {
            let report = self.press(control)?;
            reports.push(report);
            if report.kind != OutcomeKind::Moved {
                break;
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        Ok(reports)
    }

    /// Player-visible snapshot
    pub fn view(&self) -> SessionView {
        let hidden = || "??".to_string();
        SessionView {
            module_id: self.module_id,
            showing_goal: self.session.showing_goal(),
            solved: self.session.is_solved(),
            current_label: self.session.revealed_current().map_or_else(hidden, |l| l.to_string()),
            goal_label: self.session.revealed_goal().map_or_else(hidden, |l| l.to_string()),
            arrows: self.session.control_count(),
            has_bridge: self.session.graph().bridge(self.session.current()).is_some(),
            strikes: self.strikes,
        }
    }

    /// Shareable description of the generated maze
    pub fn export(&self) -> MazeExport {
        let maze = self.session.maze();
        // Session::new only accepts start and goal inside the maze
        let labels = maze.labels();
        MazeExport {
            rule_seed: self.seeds.rule_seed,
            placement_seed: self.seeds.placement_seed,
            rng: self.rng,
            start: labels[self.session.start()],
            goal: labels[self.session.goal()],
            labels: labels.to_vec(),
            edges: maze.edges(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn module_id(&self) -> u64 {
        self.module_id
    }

    pub fn seeds(&self) -> SessionSeeds {
        self.seeds
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn is_solved(&self) -> bool {
        self.session.is_solved()
    }

    /// Label of `cell`, for log lines
    pub fn name(&self, cell: usize) -> String {
        self.session
            .label(cell)
            .map_or_else(|| format!("#{}", cell), |label| label.to_string())
    }

    fn record(&mut self, report: &MoveReport) {
        let id = self.module_id;
        let from = self.name(report.from);
        let bridge = report.control == Control::Bridge;

        match (report.kind, report.target) {
            (OutcomeKind::Moved | OutcomeKind::Reached, Some(to)) => {
                let verb = if bridge { "Traversing bridge" } else { "Going" };
                tracing::info!(module_id = id, "{} from {} to {}.", verb, from, self.name(to));
                if report.kind == OutcomeKind::Reached {
                    tracing::info!(module_id = id, "Maze solved.");
                }
            }
            (OutcomeKind::Blocked, Some(to)) => {
                self.strikes += 1;
                let verb = if bridge { "traverse bridge" } else { "go" };
                tracing::warn!(module_id = id, "Attempt to {} from {} to {}. Strike.", verb, from, self.name(to));
            }
            _ if bridge => {
                tracing::warn!(module_id = id, "Attempt to cross a non-existent bridge from {}.", from);
            }
            _ => {
                tracing::warn!(module_id = id, "There is no {} in {}.", report.control, from);
            }
        }
    }
}

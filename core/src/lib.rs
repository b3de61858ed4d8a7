//! Shared types, constants, and logic for the crazy maze
//!
//! This crate provides the maze graph model, the reproducible random
//! sources, the spanning-tree generator, goal selection, the traversal
//! session state machine, the breadth-first solver and the text command
//! front end. Everything the host and the API server do is built on these
//! pieces.
//!
//! The crate is no_std compatible (it only needs `alloc`), with an optional
//! `serde` feature for host-side persistence.

#![no_std]

extern crate alloc;

pub mod command;
pub mod error;
pub mod goal;
pub mod graph;
pub mod maze_gen;
pub mod mono_random;
pub mod rng;
pub mod session;
pub mod solver;

// Re-export commonly used types for convenience
pub use command::{run_command, run_command_observed, CommandError, CommandFailure, CommandStep};
pub use error::{GenerationFault, GraphError, SessionError};
pub use goal::{select_goal, select_goal_within, GOAL_DISTANCE};
pub use graph::{CellLinks, Control, Graph, Neighbor};
pub use maze_gen::{CellLabel, Maze};
pub use mono_random::MonoRandom;
pub use rng::{MazeRng, RngKind, SimpleLCG};
pub use session::{MoveReport, OutcomeKind, Session, SessionState};
pub use solver::{shortest_cells, shortest_path};

/// Letters available for cell labels
pub const ALPHABET_LEN: usize = 26;

/// Number of cells in a full maze; one per two-letter label
pub const CELL_COUNT: usize = ALPHABET_LEN * ALPHABET_LEN; // 676

/// Maximum number of directional slots (arrows) per cell
pub const MAX_SLOTS: usize = 8;

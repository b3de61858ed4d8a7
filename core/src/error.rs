//! Error types shared by the generator, the goal selector and the session

use thiserror::Error;

/// A graph table that cannot be used to build a maze
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no cells")]
    Empty,

    #[error("graph has {count} cells but at most {max} can be labelled")]
    TooManyCells { count: usize, max: usize },

    #[error("cell {cell} has {slots} slots, at most {max} are allowed")]
    TooManySlots { cell: usize, slots: usize, max: usize },

    #[error("cell {cell} links to {target}, outside the {count} cell graph")]
    TargetOutOfRange { cell: usize, target: usize, count: usize },

    #[error("cell {cell} links to itself")]
    SelfLink { cell: usize },
}

/// Fatal faults raised while building a session; no maze is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFault {
    /// The frontier ran dry with cells still unvisited
    #[error("graph is disconnected: {unreached} cells cannot be reached")]
    Disconnected { unreached: usize },

    /// No cell lies within the goal distance range of the start
    #[error("no goal candidate within range of start cell {start}")]
    NoGoalCandidates { start: usize },

    #[error("start cell {start} is outside the {count} cell maze")]
    StartOutOfRange { start: usize, count: usize },

    #[error("goal cell {goal} is outside the {count} cell maze")]
    GoalOutOfRange { goal: usize, count: usize },
}

/// Rejections raised by the session state machine itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the maze is already solved")]
    Solved,
}

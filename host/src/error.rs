use maze_core::{CommandFailure, GenerationFault, GraphError, SessionError};
use thiserror::Error;

/// Everything that can go wrong on the host side
#[derive(Debug, Error)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),

    #[error("maze generation failed: {0}")]
    Generation(#[from] GenerationFault),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Command(#[from] CommandFailure),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown cell label: '{0}'")]
    UnknownLabel(String),
}

pub type HostResult<T> = Result<T, HostError>;

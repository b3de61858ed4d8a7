//! JSON files: cell graphs in, generated mazes out

use std::fs;
use std::path::Path;

use maze_core::{CellLabel, Graph, RngKind};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};

/// Largest graph file we are willing to read
const MAX_GRAPH_FILE_BYTES: u64 = 10_000_000;

/// A generated maze in shareable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeExport {
    pub rule_seed: i32,
    pub placement_seed: u32,
    pub rng: RngKind,
    pub start: CellLabel,
    pub goal: CellLabel,
    /// Label of every cell, by cell index
    pub labels: Vec<CellLabel>,
    /// Passable pairs `(low, high)` by cell index
    pub edges: Vec<(usize, usize)>,
}

/// Load and validate a cell graph from a JSON file
pub fn load_graph(path: impl AsRef<Path>) -> HostResult<Graph> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if size > MAX_GRAPH_FILE_BYTES {
        return Err(HostError::Config(format!(
            "graph file {} is too large ({} bytes, max {})",
            path.display(),
            size,
            MAX_GRAPH_FILE_BYTES
        )));
    }
    let json = fs::read_to_string(path)?;
    let graph: Graph = serde_json::from_str(&json)?;
    Ok(graph)
}

pub fn save_graph(graph: &Graph, path: impl AsRef<Path>) -> HostResult<()> {
    let json = serde_json::to_string(graph)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn save_export(export: &MazeExport, path: impl AsRef<Path>) -> HostResult<()> {
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_export(path: impl AsRef<Path>) -> HostResult<MazeExport> {
    let json = fs::read_to_string(path)?;
    let export: MazeExport = serde_json::from_str(&json)?;
    Ok(export)
}

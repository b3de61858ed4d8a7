//! Breadth-first shortest path over the generated passages
//!
//! A cell's links are expanded in slot order, then the bridge. A link is
//! followed only when the raw control exists from the cell being expanded
//! and the passage is open, so every step of the result can be pressed.
//! Parents are fixed at first discovery.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::graph::{Control, Graph};
use crate::maze_gen::Maze;

/// Cells visited walking from `from` to `to`, both ends included
pub fn shortest_cells(graph: &Graph, maze: &Maze, from: usize, to: usize) -> Option<Vec<usize>> {
    let count = graph.len().min(maze.len());
    if from >= count || to >= count {
        return None;
    }

    let mut parents: Vec<Option<usize>> = alloc::vec![None; count];
    parents[from] = Some(from);
    let mut queue = VecDeque::from([from]);

    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        for (_, next) in graph.controls(cell) {
            if next < count && parents[next].is_none() && maze.is_passable(cell, next) {
                parents[next] = Some(cell);
                queue.push_back(next);
            }
        }
    }

    parents[to]?;
    let mut path = alloc::vec![to];
    let mut cell = to;
    while cell != from {
        cell = parents[cell]?;
        path.push(cell);
    }
    path.reverse();
    Some(path)
}

/// Controls that walk from `from` to `to` without a single failed press
///
/// Empty when `from == to`; `None` when `to` cannot be reached.
pub fn shortest_path(graph: &Graph, maze: &Maze, from: usize, to: usize) -> Option<Vec<Control>> {
    let cells = shortest_cells(graph, maze, from, to)?;
    cells
        .windows(2)
        .map(|step| graph.control_to(step[0], step[1]))
        .collect()
}

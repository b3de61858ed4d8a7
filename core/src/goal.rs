//! Goal selection by breadth-first layers over the passages

use alloc::collections::BTreeSet;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ops::RangeInclusive;

use crate::error::GenerationFault;
use crate::maze_gen::Maze;
use crate::rng::MazeRng;

/// Passage distance allowed between start and goal
pub const GOAL_DISTANCE: RangeInclusive<usize> = 12..=20;

/// Hop count from `start` to every cell, `None` where unreachable
pub fn distances_from(maze: &Maze, start: usize) -> Vec<Option<usize>> {
    let mut dist = alloc::vec![None; maze.len()];
    if start >= maze.len() {
        return dist;
    }

    let mut queue = VecDeque::new();
    dist[start] = Some(0);
    queue.push_back(start);
    while let Some(cell) = queue.pop_front() {
        let next_dist = dist[cell].map(|d| d + 1);
        for next in maze.passages(cell) {
            if dist[next].is_none() {
                dist[next] = next_dist;
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Pick a goal at a passage distance within [`GOAL_DISTANCE`] of `start`
pub fn select_goal<R: MazeRng>(maze: &Maze, start: usize, rng: &mut R) -> Result<usize, GenerationFault> {
    select_goal_within(maze, start, GOAL_DISTANCE, rng)
}

/// Pick a goal whose passage distance from `start` lies in `range`
///
/// Expands one layer per distance, pooling the layers inside the range and
/// stopping after the range's upper end. The pool is ordered by cell index
/// and one entry is drawn with `next_int(pool.len())`.
pub fn select_goal_within<R: MazeRng>(
    maze: &Maze,
    start: usize,
    range: RangeInclusive<usize>,
    rng: &mut R,
) -> Result<usize, GenerationFault> {
    if start >= maze.len() {
        return Err(GenerationFault::StartOutOfRange { start, count: maze.len() });
    }

    let mut visited = BTreeSet::from([start]);
    let mut layer = alloc::vec![start];
    let mut pool = BTreeSet::new();
    if range.contains(&0) {
        pool.insert(start);
    }

    let mut distance = 0;
    while distance < *range.end() && !layer.is_empty() {
        distance += 1;
        let mut next_layer = Vec::new();
        for &cell in &layer {
            for next in maze.passages(cell) {
                if visited.insert(next) {
                    next_layer.push(next);
                }
            }
        }
        if range.contains(&distance) {
            pool.extend(next_layer.iter().copied());
        }
        layer = next_layer;
    }

    if pool.is_empty() {
        return Err(GenerationFault::NoGoalCandidates { start });
    }
    let pool: Vec<usize> = pool.into_iter().collect();
    Ok(pool[rng.next_int(pool.len())])
}

//! Maze generation: randomized spanning tree over the cell graph
//!
//! Algorithm (visit-then-extend, Prim style):
//! 1. Draw a start cell uniformly from all cells and put it on the frontier
//! 2. While cells remain unvisited:
//!    - Draw a frontier cell uniformly
//!    - Collect its distinct link targets that are still unvisited, ascending
//!    - If there are none, drop the cell from the frontier (order preserved)
//!    - Else pick one (no draw when it is the only one), open the passage
//!      both ways, mark it visited and append it to the frontier
//! 3. Shuffle the 676 two-letter labels with the same generator
//!
//! The number and order of draws is part of the seed contract: changing it
//! changes every maze for every seed.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{GenerationFault, GraphError};
use crate::graph::Graph;
use crate::rng::MazeRng;
use crate::{ALPHABET_LEN, CELL_COUNT};

/// Two-letter cell name, `AA` through `ZZ`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellLabel([u8; 2]);

impl CellLabel {
    /// Label at `index` in the unshuffled table (outer letter first)
    fn nth(index: usize) -> Self {
        let outer = (index / ALPHABET_LEN) as u8;
        let inner = (index % ALPHABET_LEN) as u8;
        Self([b'A' + outer, b'A' + inner])
    }

    /// Parse a two-letter label, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Some(Self([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        // Always two ASCII capitals
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellLabel({})", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CellLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CellLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <alloc::string::String as serde::Deserialize>::deserialize(deserializer)?;
        CellLabel::parse(&s).ok_or_else(|| serde::de::Error::custom("expected a two-letter label"))
    }
}

/// A generated maze: the passable passages and the cell labels
///
/// Passages are stored per cell in both directions, so the relation is
/// symmetric by construction. Nothing mutates a maze after generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    passages: Vec<BTreeSet<usize>>,
    labels: Vec<CellLabel>,
}

impl Maze {
    /// Generate a maze over `graph` driven by `rng`
    ///
    /// # Returns
    /// A spanning tree over every cell, or `GenerationFault::Disconnected`
    /// if some cells cannot be reached from the drawn start cell.
    pub fn generate<R: MazeRng>(graph: &Graph, rng: &mut R) -> Result<Self, GenerationFault> {
        let count = graph.len();
        let mut passages = alloc::vec![BTreeSet::new(); count];

        let mut unvisited = alloc::vec![true; count];
        let mut remaining = count;

        let start = rng.next_int(count);
        unvisited[start] = false;
        remaining -= 1;
        let mut frontier = alloc::vec![start];

        while remaining > 0 {
            if frontier.is_empty() {
                return Err(GenerationFault::Disconnected { unreached: remaining });
            }

            let ix = rng.next_int(frontier.len());
            let cell = frontier[ix];

            let candidates: Vec<usize> = graph
                .links(cell)
                .into_iter()
                .filter(|&other| unvisited[other])
                .collect();

            match candidates.len() {
                0 => {
                    // Exhausted; keep the order of the rest for later draws
                    frontier.remove(ix);
                }
                n => {
                    let other = if n == 1 { candidates[0] } else { candidates[rng.next_int(n)] };
                    passages[cell].insert(other);
                    passages[other].insert(cell);
                    unvisited[other] = false;
                    remaining -= 1;
                    frontier.push(other);
                }
            }
        }

        let mut table: Vec<CellLabel> = (0..CELL_COUNT).map(CellLabel::nth).collect();
        rng.shuffle(&mut table);
        table.truncate(count);

        Ok(Self { passages, labels: table })
    }

    /// Build a maze from explicit passages, for fixtures and imports
    ///
    /// Every pair is opened in both directions. Labels are the unshuffled
    /// table, `AA`, `AB`, ...
    pub fn from_passages(count: usize, pairs: &[(usize, usize)]) -> Result<Self, GraphError> {
        if count > CELL_COUNT {
            return Err(GraphError::TooManyCells { count, max: CELL_COUNT });
        }

        let mut passages = alloc::vec![BTreeSet::new(); count];
        for &(a, b) in pairs {
            if a == b {
                return Err(GraphError::SelfLink { cell: a });
            }
            if a >= count || b >= count {
                let (cell, target) = if a >= count { (b, a) } else { (a, b) };
                return Err(GraphError::TargetOutOfRange { cell, target, count });
            }
            passages[a].insert(b);
            passages[b].insert(a);
        }
        let labels = (0..count).map(CellLabel::nth).collect();
        Ok(Self { passages, labels })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn is_passable(&self, a: usize, b: usize) -> bool {
        self.passages.get(a).is_some_and(|p| p.contains(&b))
    }

    /// Cells reachable in one step from `cell`, ascending
    pub fn passages(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.passages.get(cell).into_iter().flatten().copied()
    }

    /// Number of undirected passages
    pub fn edge_count(&self) -> usize {
        self.passages.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Undirected passages as `(low, high)` pairs, ascending
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.passages
            .iter()
            .enumerate()
            .flat_map(|(a, set)| set.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect()
    }

    pub fn label(&self, cell: usize) -> Option<CellLabel> {
        self.labels.get(cell).copied()
    }

    pub fn labels(&self) -> &[CellLabel] {
        &self.labels
    }

    /// Cell carrying `label`, case-insensitive
    pub fn cell_by_label(&self, label: &str) -> Option<usize> {
        let wanted = CellLabel::parse(label)?;
        self.labels.iter().position(|&l| l == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CellLinks;
    use crate::mono_random::MonoRandom;
    use crate::rng::SimpleLCG;
    use alloc::vec;

    /// Pops scripted answers and records every bound it was asked for
    struct Scripted {
        answers: Vec<usize>,
        bounds: Vec<usize>,
    }

    impl Scripted {
        fn new(answers: &[usize]) -> Self {
            Self { answers: answers.to_vec(), bounds: Vec::new() }
        }
    }

    impl MazeRng for Scripted {
        fn next_int(&mut self, bound: usize) -> usize {
            self.bounds.push(bound);
            if self.answers.is_empty() {
                0
            } else {
                self.answers.remove(0)
            }
        }
    }

    fn reachable(maze: &Maze, from: usize) -> usize {
        let mut seen = vec![false; maze.len()];
        let mut stack = vec![from];
        seen[from] = true;
        let mut count = 1;
        while let Some(cell) = stack.pop() {
            for next in maze.passages(cell) {
                if !seen[next] {
                    seen[next] = true;
                    count += 1;
                    stack.push(next);
                }
            }
        }
        count
    }

    #[test]
    fn test_star_graph() {
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1), Some(2)], None),
            CellLinks::with_targets(&[Some(0)], None),
            CellLinks::with_targets(&[Some(0)], None),
        ])
        .unwrap();

        // start=0, frontier draw, candidate draw picks 2, frontier draw, single candidate
        let mut rng = Scripted::new(&[0, 0, 1, 0]);
        let maze = Maze::generate(&graph, &mut rng).unwrap();

        assert_eq!(maze.edges(), vec![(0, 1), (0, 2)]);
        assert!(maze.is_passable(1, 0));
        assert!(!maze.is_passable(1, 2));
        // start(3), frontier(1), candidates(2), frontier(2), then 675 shuffle draws
        assert_eq!(&rng.bounds[..4], &[3, 1, 2, 2]);
        assert_eq!(rng.bounds.len(), 4 + CELL_COUNT - 1);
    }

    #[test]
    fn test_single_candidate_skips_draw() {
        // Path 0 - 1 - 2: every extension has exactly one candidate
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1)], None),
            CellLinks::with_targets(&[Some(0), Some(2)], None),
            CellLinks::with_targets(&[Some(1)], None),
        ])
        .unwrap();

        let mut rng = Scripted::new(&[0, 0, 1]);
        let maze = Maze::generate(&graph, &mut rng).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1), (1, 2)]);
        // start(3), frontier [0] -> 1, frontier [0, 1] picks 1 -> 2
        assert_eq!(&rng.bounds[..3], &[3, 1, 2]);
        assert_eq!(rng.bounds[3], CELL_COUNT);
    }

    #[test]
    fn test_exhausted_cell_leaves_frontier_in_order() {
        // 0 - 1, 0 - 2, 2 - 3: after 0 takes 1 and 2, it is exhausted
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1), Some(2)], None),
            CellLinks::with_targets(&[Some(0)], None),
            CellLinks::with_targets(&[Some(0), Some(3)], None),
            CellLinks::with_targets(&[Some(2)], None),
        ])
        .unwrap();

        // start 0; take 1; frontier [0,1] draw 0, single 2; frontier [0,1,2]
        // draw 0 -> exhausted, frontier [1,2]; draw 1 -> cell 2 takes 3
        let mut rng = Scripted::new(&[0, 0, 0, 0, 0, 1]);
        let maze = Maze::generate(&graph, &mut rng).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1), (0, 2), (2, 3)]);
        assert_eq!(&rng.bounds[..6], &[4, 1, 2, 2, 3, 2]);
    }

    #[test]
    fn test_disconnected_graph_is_a_fault() {
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[Some(1)], None),
            CellLinks::with_targets(&[Some(0)], None),
            CellLinks::with_targets(&[], None),
        ])
        .unwrap();

        let mut rng = Scripted::new(&[0]);
        assert_eq!(
            Maze::generate(&graph, &mut rng),
            Err(GenerationFault::Disconnected { unreached: 1 })
        );
    }

    #[test]
    fn test_bridge_links_are_candidates() {
        let graph = Graph::new(vec![
            CellLinks::with_targets(&[], Some(1)),
            CellLinks::with_targets(&[], Some(0)),
        ])
        .unwrap();

        let maze = Maze::generate(&graph, &mut SimpleLCG::new(5)).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_lattice_spanning_tree() {
        let graph = Graph::lattice();
        for seed in [1, 2, 42, 2018] {
            let maze = Maze::generate(&graph, &mut MonoRandom::new(seed)).unwrap();
            assert_eq!(maze.len(), CELL_COUNT);
            assert_eq!(maze.edge_count(), CELL_COUNT - 1);
            assert_eq!(reachable(&maze, 0), CELL_COUNT);

            for (a, b) in maze.edges() {
                assert!(maze.is_passable(b, a));
                assert!(graph.links(a).contains(&b) || graph.links(b).contains(&a));
            }
        }
    }

    #[test]
    fn test_determinism() {
        let graph = Graph::lattice();
        let maze1 = Maze::generate(&graph, &mut SimpleLCG::new(99999)).unwrap();
        let maze2 = Maze::generate(&graph, &mut SimpleLCG::new(99999)).unwrap();
        assert_eq!(maze1, maze2);
    }

    #[test]
    fn test_different_seeds() {
        let graph = Graph::lattice();
        let maze1 = Maze::generate(&graph, &mut MonoRandom::new(11111)).unwrap();
        let maze2 = Maze::generate(&graph, &mut MonoRandom::new(22222)).unwrap();
        // Different seeds should (almost certainly) produce different mazes
        assert_ne!(maze1.edges(), maze2.edges());
        assert_ne!(maze1.labels(), maze2.labels());
    }

    #[test]
    fn test_labels_are_a_bijection() {
        let maze = Maze::generate(&Graph::lattice(), &mut MonoRandom::new(7)).unwrap();
        let mut labels = maze.labels().to_vec();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), CELL_COUNT);
        assert_eq!(labels[0].as_str(), "AA");
        assert_eq!(labels[CELL_COUNT - 1].as_str(), "ZZ");

        let cell = 123;
        let label = maze.label(cell).unwrap();
        assert_eq!(maze.cell_by_label(label.as_str()), Some(cell));
        let lower = label.as_str().to_ascii_lowercase();
        assert_eq!(maze.cell_by_label(&lower), Some(cell));
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(CellLabel::parse("xs").unwrap().as_str(), "XS");
        assert_eq!(CellLabel::parse("X"), None);
        assert_eq!(CellLabel::parse("X1"), None);
        assert_eq!(CellLabel::parse("ABC"), None);
        assert_eq!(CellLabel::nth(27).as_str(), "BB");
    }

    #[test]
    fn test_from_passages() {
        let maze = Maze::from_passages(3, &[(0, 1), (2, 1)]).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1), (1, 2)]);
        assert_eq!(maze.passages(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(maze.label(2).unwrap().as_str(), "AC");
    }

    #[test]
    fn test_from_passages_rejects_bad_pairs() {
        assert_eq!(
            Maze::from_passages(3, &[(0, 1), (1, 3)]),
            Err(GraphError::TargetOutOfRange { cell: 1, target: 3, count: 3 })
        );
        assert_eq!(Maze::from_passages(3, &[(2, 2)]), Err(GraphError::SelfLink { cell: 2 }));
        assert_eq!(
            Maze::from_passages(700, &[]),
            Err(GraphError::TooManyCells { count: 700, max: CELL_COUNT })
        );
    }

    /// 0 - 1 - 2
    /// |   |   |
    /// 3 - 4 - 5
    fn grid_2x3() -> Graph {
        Graph::new(vec![
            CellLinks::with_targets(&[Some(1), Some(3)], None),
            CellLinks::with_targets(&[Some(0), Some(2), Some(4)], None),
            CellLinks::with_targets(&[Some(1), Some(5)], None),
            CellLinks::with_targets(&[Some(0), Some(4)], None),
            CellLinks::with_targets(&[Some(1), Some(3), Some(5)], None),
            CellLinks::with_targets(&[Some(2), Some(4)], None),
        ])
        .unwrap()
    }

    fn label_strs(maze: &Maze) -> Vec<&str> {
        maze.labels().iter().map(CellLabel::as_str).collect()
    }

    #[test]
    fn test_known_layout_for_rule_seeds() {
        // Shared rule seeds must carve the same passages and labels everywhere
        let graph = grid_2x3();

        let maze = Maze::generate(&graph, &mut MonoRandom::new(1)).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1), (0, 3), (1, 2), (1, 4), (4, 5)]);
        assert_eq!(label_strs(&maze), vec!["SI", "GK", "GD", "AS", "LW", "LV"]);

        let maze = Maze::generate(&graph, &mut MonoRandom::new(2918)).unwrap();
        assert_eq!(maze.edges(), vec![(0, 1), (0, 3), (1, 2), (1, 4), (2, 5)]);
        assert_eq!(label_strs(&maze), vec!["AL", "DY", "NM", "YB", "LU", "AH"]);
    }
}

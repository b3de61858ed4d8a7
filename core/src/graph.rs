//! Static cell adjacency: directional slots plus an optional bridge
//!
//! The graph only describes geometric adjacency. Which links are actually
//! walkable is decided per session by the generator (see [`crate::Maze`]).
//! Links are directed: a slot from A to B does not imply a slot from B to A.

use alloc::vec::Vec;

use crate::error::GraphError;
use crate::{CELL_COUNT, MAX_SLOTS};

/// A user-actuable input: one of the numbered arrows, or the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Control {
    Slot(usize),
    Bridge,
}

impl core::fmt::Display for Control {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // Arrows are numbered from 1 for players
            Control::Slot(slot) => write!(f, "arrow {}", slot + 1),
            Control::Bridge => write!(f, "bridge"),
        }
    }
}

/// One directional slot of a cell
///
/// The arrow placement is presentation data; the maze logic only reads
/// `to_cell`. A slot without a target is shown but leads nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbor {
    pub to_cell: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arrow_x: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arrow_y: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub arrow_angle: f32,
}

impl Neighbor {
    pub fn to(cell: usize) -> Self {
        Self {
            to_cell: Some(cell),
            ..Self::default()
        }
    }
}

/// Outgoing links of a single cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellLinks {
    pub neighbors: Vec<Neighbor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bridge: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sprite: u16,
}

impl CellLinks {
    /// Links with bare slot targets and no placement data
    pub fn with_targets(targets: &[Option<usize>], bridge: Option<usize>) -> Self {
        Self {
            neighbors: targets
                .iter()
                .map(|&to_cell| Neighbor { to_cell, ..Neighbor::default() })
                .collect(),
            bridge,
            sprite: targets.len() as u16,
        }
    }
}

/// The fixed cell graph a maze is carved from
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<CellLinks>", into = "Vec<CellLinks>"))]
pub struct Graph {
    cells: Vec<CellLinks>,
}

impl TryFrom<Vec<CellLinks>> for Graph {
    type Error = GraphError;

    fn try_from(cells: Vec<CellLinks>) -> Result<Self, Self::Error> {
        Graph::new(cells)
    }
}

impl From<Graph> for Vec<CellLinks> {
    fn from(graph: Graph) -> Self {
        graph.cells
    }
}

impl Graph {
    /// Validate and wrap a cell table
    pub fn new(cells: Vec<CellLinks>) -> Result<Self, GraphError> {
        let count = cells.len();
        if count == 0 {
            return Err(GraphError::Empty);
        }
        if count > CELL_COUNT {
            return Err(GraphError::TooManyCells { count, max: CELL_COUNT });
        }

        for (cell, links) in cells.iter().enumerate() {
            if links.neighbors.len() > MAX_SLOTS {
                return Err(GraphError::TooManySlots {
                    cell,
                    slots: links.neighbors.len(),
                    max: MAX_SLOTS,
                });
            }
            let targets = links
                .neighbors
                .iter()
                .filter_map(|n| n.to_cell)
                .chain(links.bridge);
            for target in targets {
                if target >= count {
                    return Err(GraphError::TargetOutOfRange { cell, target, count });
                }
                if target == cell {
                    return Err(GraphError::SelfLink { cell });
                }
            }
        }

        Ok(Self { cells })
    }

    /// Built-in 676 cell graph: 13 rows by 52 columns of king moves
    ///
    /// Slots run clockwise from north and skip directions that leave the
    /// board. Cells on rows `1 mod 4` at columns `2 mod 6` have a bridge to
    /// the cell two columns east, which bridges back.
    pub fn lattice() -> Self {
        const ROWS: usize = 13;
        const COLS: usize = 52;
        // Clockwise from north: (row delta, col delta, angle)
        const DIRECTIONS: [(isize, isize, f32); 8] = [
            (-1, 0, 0.0),
            (-1, 1, 45.0),
            (0, 1, 90.0),
            (1, 1, 135.0),
            (1, 0, 180.0),
            (1, -1, 225.0),
            (0, -1, 270.0),
            (-1, -1, 315.0),
        ];
        const ARROW_RADIUS: f32 = 0.03;

        let cells = (0..ROWS * COLS)
            .map(|ix| {
                let (row, col) = (ix / COLS, ix % COLS);
                let neighbors: Vec<Neighbor> = DIRECTIONS
                    .iter()
                    .filter_map(|&(dr, dc, angle)| {
                        let r = row.checked_add_signed(dr).filter(|&r| r < ROWS)?;
                        let c = col.checked_add_signed(dc).filter(|&c| c < COLS)?;
                        Some(Neighbor {
                            to_cell: Some(r * COLS + c),
                            arrow_x: dc as f32 * ARROW_RADIUS,
                            arrow_y: dr as f32 * ARROW_RADIUS,
                            arrow_angle: angle,
                        })
                    })
                    .collect();

                let bridge = if row % 4 != 1 {
                    None
                } else if col % 6 == 2 && col + 2 < COLS {
                    Some(ix + 2)
                } else if col % 6 == 4 {
                    Some(ix - 2)
                } else {
                    None
                };

                CellLinks {
                    sprite: neighbors.len() as u16,
                    neighbors,
                    bridge,
                }
            })
            .collect();

        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, cell: usize) -> Option<&CellLinks> {
        self.cells.get(cell)
    }

    pub fn cells(&self) -> &[CellLinks] {
        &self.cells
    }

    /// Number of directional slots shown for a cell, including empty ones
    pub fn control_count(&self, cell: usize) -> usize {
        self.cells.get(cell).map_or(0, |c| c.neighbors.len())
    }

    pub fn bridge(&self, cell: usize) -> Option<usize> {
        self.cells.get(cell).and_then(|c| c.bridge)
    }

    /// Where a control leads from `cell`, if anywhere
    pub fn target(&self, cell: usize, control: Control) -> Option<usize> {
        let links = self.cells.get(cell)?;
        match control {
            Control::Slot(slot) => links.neighbors.get(slot)?.to_cell,
            Control::Bridge => links.bridge,
        }
    }

    /// Distinct slot and bridge targets of `cell`, ascending
    pub fn links(&self, cell: usize) -> Vec<usize> {
        let Some(links) = self.cells.get(cell) else {
            return Vec::new();
        };
        let mut targets: Vec<usize> = links
            .neighbors
            .iter()
            .filter_map(|n| n.to_cell)
            .chain(links.bridge)
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Controls of `cell` in expansion order: slots first, then the bridge
    pub fn controls(&self, cell: usize) -> impl Iterator<Item = (Control, usize)> + '_ {
        let links = self.cells.get(cell);
        let slots = links
            .into_iter()
            .flat_map(|l| l.neighbors.iter().enumerate())
            .filter_map(|(slot, n)| n.to_cell.map(|to| (Control::Slot(slot), to)));
        let bridge = links
            .and_then(|l| l.bridge)
            .map(|to| (Control::Bridge, to));
        slots.chain(bridge)
    }

    /// First slot of `from` whose target is `to`
    pub fn slot_to(&self, from: usize, to: usize) -> Option<usize> {
        self.cells
            .get(from)?
            .neighbors
            .iter()
            .position(|n| n.to_cell == Some(to))
    }

    /// The control that walks from `from` to `to`, preferring a slot
    pub fn control_to(&self, from: usize, to: usize) -> Option<Control> {
        match self.slot_to(from, to) {
            Some(slot) => Some(Control::Slot(slot)),
            None if self.bridge(from) == Some(to) => Some(Control::Bridge),
            None => None,
        }
    }
}

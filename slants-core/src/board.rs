//! Board state for one puzzle instance.
//!
//! Besides the cell assignments themselves, the board maintains four pieces
//! of derived state that the deduction rules share:
//!
//! * a union-find over corners tracking connectivity of the stroke graph,
//!   so that closing a loop is detectable in near-constant time;
//! * per connectivity class, an `exits` counter (upper bound on further
//!   strokes the class can still accept) and a `border` flag (does the
//!   class reach the grid perimeter);
//! * a union-find over cells whose classes are forced to hold one common
//!   stroke, with the stroke value recorded per class once known;
//! * a per-cell 4-bit mask of which adjacent-pair V shapes are still
//!   feasible.  Bits only clear, never set, except across a restore.
//!
//! All of it is captured by [`snapshot`] and brought back by [`restore`],
//! which is what makes speculative search cheap to implement.
//!
//! [`snapshot`]: Board::snapshot
//! [`restore`]: Board::restore

use thiserror::Error;

use crate::{
    error::Error as PuzzleError,
    geometry::{Grid, Slant},
    union_find::UnionFind,
};

/// With the right neighbor, `\/`: point at the bottom of the shared edge.
pub const V_RIGHT_DOWN: u8 = 0x1;
/// With the right neighbor, `/\`: point at the top of the shared edge.
pub const V_RIGHT_UP: u8 = 0x2;
/// With the below neighbor, `\` over `/`: point at the right of the shared edge.
pub const V_BELOW_RIGHT: u8 = 0x4;
/// With the below neighbor, `/` over `\`: point at the left of the shared edge.
pub const V_BELOW_LEFT: u8 = 0x8;

/// Both pair shapes with the right neighbor.
pub const V_RIGHT_MASK: u8 = V_RIGHT_DOWN | V_RIGHT_UP;
/// Both pair shapes with the below neighbor.
pub const V_BELOW_MASK: u8 = V_BELOW_RIGHT | V_BELOW_LEFT;

/// A deduction that cannot be applied without violating a board invariant.
///
/// Never surfaced to callers: the engine folds it into a "contradiction"
/// verdict, and speculative rules fold it into "that branch is impossible".
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Contradiction {
    #[error("a {} at cell ({x}, {y}) would close a loop", .slant.as_char())]
    ClosesLoop { x: usize, y: usize, slant: Slant },

    #[error("cell ({x}, {y}) cannot take a {} against its forced group", .slant.as_char())]
    SplitGroup { x: usize, y: usize, slant: Slant },

    #[error("deduced a {} at cell ({x}, {y}) against the known solution", .slant.as_char())]
    KnownSolutionMismatch { x: usize, y: usize, slant: Slant },
}

/// A full copy of the board's mutable state.
///
/// Restoring after any sequence of operations yields an observationally
/// identical board.  O(cells) space; the search keeps one per live depth.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    cells: Vec<Option<Slant>>,
    conn: UnionFind,
    exits: Vec<i32>,
    border: Vec<bool>,
    equiv: UnionFind,
    stroke: Vec<Option<Slant>>,
    vbits: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    clues: Vec<Option<u8>>,

    cells: Vec<Option<Slant>>,

    /// Connectivity over corners.
    conn: UnionFind,
    /// Valid at connectivity class roots.
    exits: Vec<i32>,
    border: Vec<bool>,

    /// Forced-equivalence over cells.
    equiv: UnionFind,
    /// Valid at equivalence class roots.
    stroke: Vec<Option<Slant>>,

    vbits: Vec<u8>,

    /// Debug oracle: deductions contradicting it fail.  Dropped before any
    /// speculative branching.
    known: Option<Vec<Option<Slant>>>,
}

impl Board {
    /// Build a board from dimensions and a decoded clue vector.
    ///
    /// The vector must hold one entry per corner in row-major order, and no
    /// clue may exceed the corner's incident cell count.
    pub fn new(width: usize, height: usize, clues: Vec<Option<u8>>) -> Result<Board, PuzzleError> {
        if width == 0 || height == 0 {
            return Err(PuzzleError::EmptyGrid { width, height });
        }

        let grid = Grid::new(width, height);
        if clues.len() != grid.corner_count() {
            return Err(PuzzleError::ClueCount {
                width,
                height,
                expected: grid.corner_count(),
                got: clues.len(),
            });
        }

        for (corner, &clue) in clues.iter().enumerate() {
            if let Some(clue) = clue {
                let max = grid.corner_degree(corner);
                if clue > max {
                    let (cx, cy) = grid.corner_pos(corner);
                    return Err(PuzzleError::ClueTooLarge { cx, cy, clue, max });
                }
            }
        }

        let exits = clues
            .iter()
            .map(|clue| clue.map_or(4, i32::from))
            .collect();
        let border = (0..grid.corner_count())
            .map(|corner| grid.on_perimeter(corner))
            .collect();

        // Pair bits toward a neighbor that does not exist start cleared.
        let vbits = (0..grid.cell_count())
            .map(|cell| {
                let (x, y) = grid.cell_pos(cell);
                let mut bits = V_RIGHT_MASK | V_BELOW_MASK;
                if x + 1 == grid.width {
                    bits &= !V_RIGHT_MASK;
                }
                if y + 1 == grid.height {
                    bits &= !V_BELOW_MASK;
                }
                bits
            })
            .collect();

        Ok(Board {
            grid,
            cells: vec![None; grid.cell_count()],
            conn: UnionFind::new(grid.corner_count()),
            exits,
            border,
            equiv: UnionFind::new(grid.cell_count()),
            stroke: vec![None; grid.cell_count()],
            vbits,
            known: None,
            clues,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn value(&self, cell: usize) -> Option<Slant> {
        self.cells[cell]
    }

    pub fn clue(&self, corner: usize) -> Option<u8> {
        self.clues[corner]
    }

    /// Attach a known solution; later assignments contradicting it fail
    /// with [`Contradiction::KnownSolutionMismatch`].
    pub fn set_known_solution(&mut self, solution: &str) {
        let mut known = vec![None; self.grid.cell_count()];
        for (slot, c) in known.iter_mut().zip(solution.chars()) {
            *slot = Slant::from_char(c);
        }
        self.known = Some(known);
    }

    pub fn clear_known_solution(&mut self) {
        self.known = None;
    }

    pub(crate) fn take_known_solution(&mut self) -> Option<Vec<Option<Slant>>> {
        self.known.take()
    }

    pub(crate) fn put_known_solution(&mut self, known: Option<Vec<Option<Slant>>>) {
        self.known = known;
    }

    /// True iff the two corners a stroke would join are already connected,
    /// so placing it would close a loop.
    pub fn would_form_loop(&mut self, cell: usize, slant: Slant) -> bool {
        let (a, b) = self.grid.endpoints(cell, slant);
        self.conn.find(a) == self.conn.find(b)
    }

    /// Assign a stroke to an unknown cell, maintaining every derived
    /// structure.
    ///
    /// Fails without mutating anything when the stroke would close a loop,
    /// split the cell's forced group, or contradict the known solution.
    pub fn place(&mut self, cell: usize, slant: Slant) -> Result<(), Contradiction> {
        debug_assert!(self.cells[cell].is_none());
        let (x, y) = self.grid.cell_pos(cell);

        if let Some(known) = &self.known {
            if let Some(expected) = known[cell] {
                if expected != slant {
                    return Err(Contradiction::KnownSolutionMismatch { x, y, slant });
                }
            }
        }

        let (a, b) = self.grid.endpoints(cell, slant);
        let ra = self.conn.find(a);
        let rb = self.conn.find(b);
        if ra == rb {
            return Err(Contradiction::ClosesLoop { x, y, slant });
        }

        let eq_root = self.equiv.find(cell);
        if let Some(forced) = self.stroke[eq_root] {
            if forced != slant {
                return Err(Contradiction::SplitGroup { x, y, slant });
            }
        }

        // Join the endpoint classes.  Each loses the potential edge just
        // consumed, hence the -2.
        let exits = self.exits[ra] + self.exits[rb] - 2;
        let border = self.border[ra] || self.border[rb];
        let (kept, _) = self.conn.union(a, b).expect("roots verified distinct");
        self.exits[kept] = exits;
        self.border[kept] = border;

        // The two bypassed corners each lose one potential stroke.  A clued
        // corner's exits are already bounded by the clue, so only unclued
        // corners decrement.
        let (c, d) = self.grid.bypassed(cell, slant);
        for corner in [c, d] {
            if self.clues[corner].is_none() {
                let root = self.conn.find(corner);
                self.exits[root] -= 1;
            }
        }

        self.cells[cell] = Some(slant);
        self.stroke[eq_root] = Some(slant);

        Ok(())
    }

    /// Force two cells to carry the same stroke.
    ///
    /// Returns whether a new merge happened.  A merge that would join two
    /// groups already forced to opposite strokes is refused (no mutation,
    /// no progress); the conflict then surfaces through [`place`].
    ///
    /// [`place`]: Board::place
    pub fn mark_equivalent(&mut self, a: usize, b: usize) -> bool {
        let ra = self.equiv.find(a);
        let rb = self.equiv.find(b);
        if ra == rb {
            return false;
        }

        let merged = match (self.stroke[ra], self.stroke[rb]) {
            (Some(x), Some(y)) if x != y => return false,
            (x, y) => x.or(y),
        };

        let (kept, _) = self.equiv.union(a, b).expect("roots verified distinct");
        self.stroke[kept] = merged;
        true
    }

    /// The stroke this cell's forced group is committed to, if any.
    pub fn equiv_value(&mut self, cell: usize) -> Option<Slant> {
        let root = self.equiv.find(cell);
        self.stroke[root]
    }

    /// Root of the cell's forced group.  Only comparable against other
    /// cell roots.
    pub fn equiv_root(&mut self, cell: usize) -> usize {
        self.equiv.find(cell)
    }

    pub fn vbits(&self, cell: usize) -> u8 {
        self.vbits[cell]
    }

    /// Clear pair-shape bits; reports whether anything actually changed.
    pub fn clear_vbits(&mut self, cell: usize, bits: u8) -> bool {
        let old = self.vbits[cell];
        self.vbits[cell] = old & !bits;
        self.vbits[cell] != old
    }

    /// Remaining potential strokes of the corner's connectivity class.
    pub fn group_exits(&mut self, corner: usize) -> i32 {
        let root = self.conn.find(corner);
        self.exits[root]
    }

    /// Whether the corner's connectivity class reaches the perimeter.
    pub fn group_border(&mut self, corner: usize) -> bool {
        let root = self.conn.find(corner);
        self.border[root]
    }

    /// Current and still-possible touches at a corner: `(placed strokes
    /// touching it, incident cells still unknown)`.
    pub fn touches(&self, corner: usize) -> (u8, u8) {
        let mut current = 0;
        let mut unknown = 0;

        for (cell, touch) in self.grid.corner_cells(corner) {
            match self.cells[cell] {
                None => unknown += 1,
                Some(slant) if slant == touch => current += 1,
                Some(_) => {}
            }
        }

        (current, unknown)
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Indices of the cells still unassigned, in row-major order.
    pub fn unknown_cells(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&cell| self.cells[cell].is_none())
            .collect()
    }

    /// Whether some clued corner is now impossible: more touches than the
    /// clue, or too few cells left to ever reach it.
    pub fn has_clue_violation(&self) -> bool {
        self.clues.iter().enumerate().any(|(corner, &clue)| {
            clue.is_some_and(|clue| {
                let (current, unknown) = self.touches(corner);
                current > clue || current + unknown < clue
            })
        })
    }

    /// For a complete board: does every clued corner meet its clue exactly?
    pub fn clues_satisfied(&self) -> bool {
        self.clues.iter().enumerate().all(|(corner, &clue)| {
            clue.is_none_or(|clue| self.touches(corner).0 == clue)
        })
    }

    /// The board as one character per cell: `/`, `\`, or `.`.
    pub fn solution_string(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.map_or('.', Slant::as_char))
            .collect()
    }

    /// Multi-line rendering interleaving clue rows and cell rows.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for cy in 0..=self.grid.height {
            for cx in 0..=self.grid.width {
                let clue = self.clues[self.grid.corner_index(cx, cy)];
                out.push(clue.map_or('.', |c| (b'0' + c) as char));
                if cx < self.grid.width {
                    out.push('-');
                }
            }
            out.push('\n');

            if cy < self.grid.height {
                out.push('|');
                for x in 0..self.grid.width {
                    let cell = self.cells[self.grid.cell_index(x, cy)];
                    out.push(cell.map_or('.', Slant::as_char));
                    out.push('|');
                }
                out.push('\n');
            }
        }

        out
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: self.cells.clone(),
            conn: self.conn.clone(),
            exits: self.exits.clone(),
            border: self.border.clone(),
            equiv: self.equiv.clone(),
            stroke: self.stroke.clone(),
            vbits: self.vbits.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.cells.clone_from(&snapshot.cells);
        self.conn.clone_from(&snapshot.conn);
        self.exits.clone_from(&snapshot.exits);
        self.border.clone_from(&snapshot.border);
        self.equiv.clone_from(&snapshot.equiv);
        self.stroke.clone_from(&snapshot.stroke);
        self.vbits.clone_from(&snapshot.vbits);
    }
}

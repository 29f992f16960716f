//! Puzzle generation.
//!
//! A random acyclic full assignment is sampled first, its corner clues are
//! all computed, and clues are then greedily dropped for as long as the
//! paper-rules solver still finishes the board.  Since that solver commits
//! only forced deductions, "it finishes" doubles as a uniqueness proof for
//! the reduced clue set.

use fastrand::Rng;
use log::debug;

use crate::{
    error::Error,
    geometry::{Grid, Slant},
    solver::{solve, SolveOptions, Status},
    union_find::UnionFind,
};

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Independent shuffled reduction passes; the fewest-clue result wins.
    pub reduction_passes: u32,
    /// Drop clues in point-reflected pairs.
    pub symmetry: bool,
}

impl Default for GenerateOptions {
    fn default() -> GenerateOptions {
        GenerateOptions {
            reduction_passes: 3,
            symmetry: false,
        }
    }
}

/// A finished puzzle: reduced clues plus the assignment they came from.
#[derive(Clone, Debug)]
pub struct GeneratedPuzzle {
    pub clues: Vec<Option<u8>>,
    pub solution: String,
    /// Work score of solving the reduced puzzle with paper rules.
    pub work: u64,
    pub clue_count: usize,
    pub max_tier: u8,
}

/// Fresh random assignments tried before giving up on a seed.
const MAX_ATTEMPTS: u32 = 100;

/// Generate one puzzle.  Deterministic for a given seed.
pub fn generate(
    width: usize,
    height: usize,
    seed: u64,
    options: &GenerateOptions,
) -> Result<GeneratedPuzzle, Error> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyGrid { width, height });
    }

    let grid = Grid::new(width, height);
    let mut rng = Rng::with_seed(seed);

    for attempt in 0..MAX_ATTEMPTS {
        let assignment = random_acyclic_assignment(grid, &mut rng);
        let solution: String = assignment.iter().map(|&slant| slant.as_char()).collect();
        let full_clues: Vec<Option<u8>> = corner_clues(grid, &assignment)
            .into_iter()
            .map(Some)
            .collect();

        let check = SolveOptions {
            known_solution: Some(solution.clone()),
            for_generation: true,
            ..SolveOptions::default()
        };

        let report = solve(&full_clues, width, height, &check)?;
        if report.status != Status::Solved || report.board != solution {
            debug!("attempt {attempt}: full-clue board not solvable with paper rules");
            continue;
        }

        let mut best = full_clues.clone();
        let mut best_count = clue_count(&best);

        for pass in 0..options.reduction_passes {
            let mut clues = full_clues.clone();
            let count = reduce(grid, &mut clues, &solution, options.symmetry, &mut rng)?;
            debug!("reduction pass {pass}: {count} clues");

            if count < best_count {
                best = clues;
                best_count = count;
            }
        }

        let report = solve(&best, width, height, &check)?;
        if report.status != Status::Solved || report.board != solution {
            debug!("attempt {attempt}: reduced board failed verification");
            continue;
        }

        return Ok(GeneratedPuzzle {
            clues: best,
            solution,
            work: report.work,
            clue_count: best_count,
            max_tier: report.max_tier,
        });
    }

    Err(Error::Synthesis {
        attempts: MAX_ATTEMPTS,
    })
}

/// Every cell filled, no loops.  Visits cells row-major, trying the two
/// strokes in random order; on the rare dead end it backs up and flips an
/// earlier cell.
fn random_acyclic_assignment(grid: Grid, rng: &mut Rng) -> Vec<Slant> {
    let mut values = vec![None; grid.cell_count()];
    let mut conn = UnionFind::new(grid.corner_count());

    let filled = fill_from(grid, &mut conn, &mut values, 0, rng);
    debug_assert!(filled, "a rectangular grid always admits an acyclic tiling");

    values.into_iter().map(|v| v.expect("grid filled")).collect()
}

fn fill_from(
    grid: Grid,
    conn: &mut UnionFind,
    values: &mut [Option<Slant>],
    cell: usize,
    rng: &mut Rng,
) -> bool {
    if cell == values.len() {
        return true;
    }

    let mut order = Slant::BOTH;
    if rng.bool() {
        order.swap(0, 1);
    }

    for slant in order {
        let (a, b) = grid.endpoints(cell, slant);
        if conn.find(a) == conn.find(b) {
            continue;
        }

        let saved = conn.clone();
        conn.union(a, b);
        values[cell] = Some(slant);

        if fill_from(grid, conn, values, cell + 1, rng) {
            return true;
        }

        *conn = saved;
        values[cell] = None;
    }

    false
}

/// The clue every corner would carry under a full assignment.
pub fn corner_clues(grid: Grid, assignment: &[Slant]) -> Vec<u8> {
    (0..grid.corner_count())
        .map(|corner| {
            grid.corner_cells(corner)
                .iter()
                .filter(|&&(cell, touch)| assignment[cell] == touch)
                .count() as u8
        })
        .collect()
}

/// One shuffled greedy pass: drop each clue (and its point-reflection in
/// symmetric mode) whenever the paper-rules solver still reaches exactly
/// the known solution.
fn reduce(
    grid: Grid,
    clues: &mut [Option<u8>],
    solution: &str,
    symmetry: bool,
    rng: &mut Rng,
) -> Result<usize, Error> {
    let mut indices: Vec<usize> = (0..clues.len()).collect();
    rng.shuffle(&mut indices);

    let check = SolveOptions {
        known_solution: Some(solution.to_string()),
        for_generation: true,
        ..SolveOptions::default()
    };

    for idx in indices {
        if clues[idx].is_none() {
            continue;
        }

        let partner = symmetry
            .then(|| {
                let (cx, cy) = grid.corner_pos(idx);
                grid.corner_index(grid.width - cx, grid.height - cy)
            })
            .filter(|&p| p != idx);

        let saved = clues[idx];
        let saved_partner = partner.map(|p| clues[p]);

        clues[idx] = None;
        if let Some(p) = partner {
            clues[p] = None;
        }

        let report = solve(clues, grid.width, grid.height, &check)?;
        if report.status == Status::Solved && report.board == solution {
            continue;
        }

        clues[idx] = saved;
        if let (Some(p), Some(v)) = (partner, saved_partner) {
            clues[p] = v;
        }
    }

    Ok(clue_count(clues))
}

fn clue_count(clues: &[Option<u8>]) -> usize {
    clues.iter().filter(|clue| clue.is_some()).count()
}

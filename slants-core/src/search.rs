//! Branching backtracker and uniqueness detection on top of propagation.
//!
//! When propagation sticks, the search branches on the most constrained
//! cell, runs each speculation against a snapshot, and keeps going until it
//! has either exhausted the tree or found a second solution.  One snapshot
//! is live per search depth, so peak memory stays linear in board size
//! times depth.

use log::trace;
use smallvec::SmallVec;

use crate::{
    board::Board,
    engine::{propagate, Propagation, Stats},
    geometry::Slant,
    rules::Rule,
};

/// Exhaustive backtracking for up to two solutions.
pub fn search(
    board: &mut Board,
    rules: &[&'static Rule],
    stats: &mut Stats,
    max_work: Option<u64>,
) -> Vec<String> {
    // Speculative branches would trip the oracle on every wrong guess.
    board.clear_known_solution();

    let mut solutions = Vec::new();
    explore(board, rules, stats, max_work, &mut solutions);
    solutions
}

fn explore(
    board: &mut Board,
    rules: &[&'static Rule],
    stats: &mut Stats,
    max_work: Option<u64>,
    solutions: &mut Vec<String>,
) {
    match propagate(board, rules, stats) {
        Propagation::Complete => {
            solutions.push(board.solution_string());
            return;
        }
        Propagation::Contradiction => return,
        Propagation::Stuck => {}
    }

    if max_work.is_some_and(|cap| stats.work >= cap) {
        return;
    }

    let Some(cell) = branch_cell(board) else {
        return;
    };

    for slant in candidate_strokes(board, cell) {
        if solutions.len() >= 2 {
            return;
        }

        stats.work += 2;
        stats.max_tier = stats.max_tier.max(3);
        trace!("branching on cell {cell} with {}", slant.as_char());

        let snapshot = board.snapshot();
        if board.place(cell, slant).is_ok() {
            explore(board, rules, stats, max_work, solutions);
        }
        board.restore(&snapshot);
    }
}

/// The most constrained unknown cell: its corners score high when exactly
/// saturated or exactly needing every remaining cell, lower the more slack
/// they have.  Ties fall to row-major order.
fn branch_cell(board: &mut Board) -> Option<usize> {
    let grid = board.grid();
    let mut best: Option<(u32, usize)> = None;

    for cell in board.unknown_cells() {
        let mut score = 0u32;

        for corner in grid.cell_corners(cell) {
            let Some(clue) = board.clue(corner) else {
                continue;
            };
            let (current, unknown) = board.touches(corner);
            let needed = i32::from(clue) - i32::from(current);

            if needed == i32::from(unknown) || needed == 0 {
                score += 100;
            } else if unknown > 0 {
                score += 50 / u32::from(unknown);
            }
        }

        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, cell));
        }
    }

    best.map(|(_, cell)| cell)
}

/// The strokes worth trying in a cell, most immediately useful first.
/// Strokes that close a loop or overshoot a clue are dropped outright.
fn candidate_strokes(board: &mut Board, cell: usize) -> SmallVec<[Slant; 2]> {
    let grid = board.grid();
    let mut ranked: SmallVec<[(i32, Slant); 2]> = SmallVec::new();

    for slant in Slant::BOTH {
        if board.would_form_loop(cell, slant) {
            continue;
        }

        let (t1, t2) = grid.endpoints(cell, slant);
        let mut priority = 0;
        let mut ok = true;
        for corner in [t1, t2] {
            if let Some(clue) = board.clue(corner) {
                if board.touches(corner).0 >= clue {
                    ok = false;
                    break;
                }
                priority += 10;
            }
        }
        if ok {
            ranked.push((priority, slant));
        }
    }

    ranked.sort_by_key(|&(priority, _)| std::cmp::Reverse(priority));
    ranked.into_iter().map(|(_, slant)| slant).collect()
}

#[cfg(test)]
mod tests {
    use super::{branch_cell, candidate_strokes, search};
    use crate::{board::Board, engine::Stats, geometry::Slant, rules::rule_set};

    fn board_with_clues(width: usize, height: usize, clues: &[(usize, usize, u8)]) -> Board {
        let corners = (width + 1) * (height + 1);
        let mut vec = vec![None; corners];
        for &(cx, cy, clue) in clues {
            vec[cy * (width + 1) + cx] = Some(clue);
        }
        Board::new(width, height, vec).unwrap()
    }

    #[test]
    fn branching_prefers_the_most_constrained_cell() {
        // Every cell incident to the 4 clue scores the saturation bonus;
        // the first of them in row-major order wins.
        let mut board = board_with_clues(3, 3, &[(1, 1, 4)]);
        let grid = board.grid();

        assert_eq!(branch_cell(&mut board), Some(grid.cell_index(0, 0)));
    }

    #[test]
    fn saturated_clues_filter_candidate_strokes() {
        let mut board = board_with_clues(2, 2, &[(1, 1, 1)]);
        let grid = board.grid();
        board.place(grid.cell_index(0, 0), Slant::Backslash).unwrap();

        // The center clue is full, so the touching stroke is off the table.
        let strokes = candidate_strokes(&mut board, grid.cell_index(1, 1));
        assert_eq!(&strokes[..], &[Slant::Slash][..]);
    }

    #[test]
    fn needed_touches_rank_first() {
        let mut board = board_with_clues(2, 2, &[(1, 1, 4)]);
        let grid = board.grid();

        // The backslash feeds the hungry center clue; try it first.
        let strokes = candidate_strokes(&mut board, grid.cell_index(0, 0));
        assert_eq!(&strokes[..], &[Slant::Backslash, Slant::Slash][..]);
    }

    #[test]
    fn open_board_yields_two_solutions_and_stops() {
        let mut board = board_with_clues(2, 2, &[]);
        let mut stats = Stats::default();

        let solutions = search(&mut board, &rule_set(3), &mut stats, None);
        assert_eq!(solutions.len(), 2);
        assert_ne!(solutions[0], solutions[1]);
        assert_eq!(stats.max_tier, 3);
    }
}

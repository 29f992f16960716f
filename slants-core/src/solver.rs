//! The public solve entry point.
//!
//! Propagation commits only forced deductions, so a board it completes is
//! automatically the unique solution.  When propagation sticks and tier 3
//! is allowed, the branching search takes over and classifies the puzzle
//! as uniquely solvable, multiply solvable, or unsolvable.

use crate::{
    board::Board,
    engine::{propagate, Propagation, Stats},
    error::Error,
    rules::rule_set,
    search::search,
};

/// Verdict of a solve.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    /// Exactly one solution, reported in full.
    Solved,
    /// At least two solutions exist.
    Multiple,
    /// No solution, or the permitted rules could not finish the board.
    Unsolved,
}

#[derive(Clone, Debug)]
pub struct SolveOptions {
    /// Known correct board string; deductions contradicting it abort the
    /// solve with a diagnostic.  Debug aid only.  The search drops it,
    /// since it must probe wrong branches on purpose.
    pub known_solution: Option<String>,
    /// Restrict to deductions a person can make on paper (caps the tier at
    /// 2 and disables the search).  Generation relies on this: a full
    /// propagation solve is a uniqueness proof.
    pub for_generation: bool,
    /// Highest rule tier allowed to fire.
    pub max_tier: u8,
    /// Stop searching once the work score passes this; the solve reports
    /// `Unsolved`.  Guards against pathological instances.
    pub max_work: Option<u64>,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions {
        SolveOptions {
            known_solution: None,
            for_generation: false,
            max_tier: 3,
            max_work: None,
        }
    }
}

/// What a solve produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolveReport {
    pub status: Status,
    /// The unique solution when `Solved`; otherwise the partial board at
    /// quiescence, `.` for undecided cells.
    pub board: String,
    /// Difficulty metric: summed cost of every fired rule plus search
    /// bookkeeping.
    pub work: u64,
    /// Highest tier that fired; 3 whenever the search branched.
    pub max_tier: u8,
}

/// Solve one puzzle from its decoded clue vector.
///
/// `clues` holds one entry per corner in row-major order and must match the
/// dimensions.
pub fn solve(
    clues: &[Option<u8>],
    width: usize,
    height: usize,
    options: &SolveOptions,
) -> Result<SolveReport, Error> {
    let mut board = Board::new(width, height, clues.to_vec())?;
    if let Some(known) = &options.known_solution {
        board.set_known_solution(known);
    }

    let max_tier = if options.for_generation {
        options.max_tier.min(2)
    } else {
        options.max_tier
    };
    let rules = rule_set(max_tier);
    let mut stats = Stats::default();

    let (status, board_string) = match propagate(&mut board, &rules, &mut stats) {
        Propagation::Complete => (Status::Solved, board.solution_string()),
        Propagation::Contradiction => (Status::Unsolved, board.solution_string()),
        Propagation::Stuck if max_tier >= 3 => {
            let mut solutions = search(&mut board, &rules, &mut stats, options.max_work);
            match solutions.len() {
                0 => (Status::Unsolved, board.solution_string()),
                1 => (Status::Solved, solutions.pop().expect("one solution")),
                _ => (Status::Multiple, board.solution_string()),
            }
        }
        Propagation::Stuck => (Status::Unsolved, board.solution_string()),
    };

    Ok(SolveReport {
        status,
        board: board_string,
        work: stats.work,
        max_tier: stats.max_tier,
    })
}

#[cfg(test)]
mod tests {
    use super::{solve, SolveOptions, Status};
    use crate::{codec::decode_clues, union_find::UnionFind};

    fn n() -> Option<u8> {
        None
    }

    /// Independent check of every quantified solution invariant: complete,
    /// acyclic by a fresh union-find, and exact on each clue.
    fn assert_valid_solution(clues: &[Option<u8>], width: usize, height: usize, board: &str) {
        assert_eq!(board.len(), width * height);
        assert!(!board.contains('.'));

        let corner = |cx: usize, cy: usize| cy * (width + 1) + cx;
        let mut uf = UnionFind::new((width + 1) * (height + 1));
        let cells: Vec<char> = board.chars().collect();

        for y in 0..height {
            for x in 0..width {
                let (a, b) = match cells[y * width + x] {
                    '/' => (corner(x, y + 1), corner(x + 1, y)),
                    '\\' => (corner(x, y), corner(x + 1, y + 1)),
                    other => panic!("unexpected cell {other:?}"),
                };
                assert!(uf.union(a, b).is_some(), "solution contains a loop");
            }
        }

        for cy in 0..=height {
            for cx in 0..=width {
                let Some(clue) = clues[corner(cx, cy)] else {
                    continue;
                };
                let mut touches = 0;
                if cx > 0 && cy > 0 && cells[(cy - 1) * width + cx - 1] == '\\' {
                    touches += 1;
                }
                if cx < width && cy > 0 && cells[(cy - 1) * width + cx] == '/' {
                    touches += 1;
                }
                if cx > 0 && cy < height && cells[cy * width + cx - 1] == '/' {
                    touches += 1;
                }
                if cx < width && cy < height && cells[cy * width + cx] == '\\' {
                    touches += 1;
                }
                assert_eq!(touches, clue, "clue at ({cx}, {cy}) missed");
            }
        }
    }

    #[test]
    fn open_two_by_two_has_many_solutions() {
        let report = solve(&[None; 9], 2, 2, &SolveOptions::default()).unwrap();
        assert_eq!(report.status, Status::Multiple);
    }

    #[test]
    fn surrounded_four_is_unsolvable() {
        let clues = [
            Some(0), n(), Some(0),
            n(), Some(4), n(),
            Some(0), n(), Some(0),
        ];
        let report = solve(&clues, 2, 2, &SolveOptions::default()).unwrap();
        assert_eq!(report.status, Status::Unsolved);
    }

    #[test]
    fn lone_center_four_solves_to_the_star() {
        let clues = [n(), n(), n(), n(), Some(4), n(), n(), n(), n()];
        let report = solve(&clues, 2, 2, &SolveOptions::default()).unwrap();

        assert_eq!(report.status, Status::Solved);
        assert_eq!(report.board, "\\//\\");
        assert_eq!(report.max_tier, 1);
        assert_valid_solution(&clues, 2, 2, &report.board);
    }

    #[test]
    fn reference_eight_by_eight_solves_uniquely() {
        let clues =
            decode_clues("c120a0b21h3a2114f3a2b2a4b2110a1a1b1c2132d1b1a33a1a1c0b", 8, 8).unwrap();
        let report = solve(&clues, 8, 8, &SolveOptions::default()).unwrap();

        assert_eq!(report.status, Status::Solved);
        assert!(report.work > 0);
        assert_valid_solution(&clues, 8, 8, &report.board);
    }

    #[test]
    fn generation_mode_does_not_search() {
        // Nothing deducible without branching, so paper-rules mode gives up
        // where the full solver reports Multiple.
        let report = solve(
            &[None; 9],
            2,
            2,
            &SolveOptions {
                for_generation: true,
                ..SolveOptions::default()
            },
        )
        .unwrap();

        assert_eq!(report.status, Status::Unsolved);
        assert_eq!(report.board, "....");
    }

    #[test]
    fn wrong_known_solution_aborts() {
        let clues = [n(), n(), n(), n(), Some(4), n(), n(), n(), n()];
        let report = solve(
            &clues,
            2,
            2,
            &SolveOptions {
                known_solution: Some("////".into()),
                for_generation: true,
                ..SolveOptions::default()
            },
        )
        .unwrap();

        assert_eq!(report.status, Status::Unsolved);
    }

    #[test]
    fn work_budget_caps_the_search() {
        let report = solve(
            &[None; 9],
            2,
            2,
            &SolveOptions {
                max_work: Some(0),
                ..SolveOptions::default()
            },
        )
        .unwrap();

        // The budget is exhausted before a second solution can be found.
        assert_ne!(report.status, Status::Multiple);
    }
}

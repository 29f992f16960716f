//! Fixed-point propagation driver.
//!
//! Runs the rule table in order and restarts from the top whenever any rule
//! makes progress, so the cheapest sufficient deduction always fires first.
//! The accumulated cost of fired rules is the puzzle's work score; the
//! highest tier that fired is its difficulty class.

use log::debug;

use crate::{
    board::{Board, Contradiction},
    rules::Rule,
};

/// Safety net against a rule that oscillates: each rule firing strictly
/// shrinks (unknown cells + set V bits + equivalence classes), so this is
/// never reached by a correct rule set.
const MAX_PASSES: u32 = 1000;

/// Work accounting across one solve, including any search on top.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub work: u64,
    pub max_tier: u8,
}

/// Outcome of running propagation to quiescence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Propagation {
    /// Every cell assigned and every clue met.
    Complete,
    /// The state admits no solution (or the known-solution oracle fired).
    Contradiction,
    /// No rule in the set can make further progress.
    Stuck,
}

/// Apply rules until the board is complete, contradictory, or quiescent.
pub fn propagate(board: &mut Board, rules: &[&'static Rule], stats: &mut Stats) -> Propagation {
    for _ in 0..MAX_PASSES {
        if board.is_complete() {
            return if board.clues_satisfied() {
                Propagation::Complete
            } else {
                Propagation::Contradiction
            };
        }

        if board.has_clue_violation() {
            return Propagation::Contradiction;
        }

        let mut fired = false;
        for rule in rules {
            match (rule.apply)(board) {
                Ok(false) => {}
                Ok(true) => {
                    stats.work += u64::from(rule.cost);
                    stats.max_tier = stats.max_tier.max(rule.tier);
                    debug!("rule {} fired (tier {})", rule.name, rule.tier);
                    fired = true;
                    break;
                }
                Err(contradiction) => {
                    match contradiction {
                        Contradiction::KnownSolutionMismatch { .. } => {
                            log::error!("{contradiction}");
                        }
                        _ => debug!("rule {} hit a contradiction: {contradiction}", rule.name),
                    }
                    return Propagation::Contradiction;
                }
            }
        }

        if !fired {
            return Propagation::Stuck;
        }
    }

    debug!("propagation pass budget exhausted");
    Propagation::Stuck
}

#[cfg(test)]
mod tests {
    use super::{propagate, Propagation, Stats};
    use crate::{board::Board, rules::rule_set};

    fn board(width: usize, height: usize, clues: &[Option<u8>]) -> Board {
        Board::new(width, height, clues.to_vec()).unwrap()
    }

    fn n() -> Option<u8> {
        None
    }

    #[test]
    fn lone_center_four_completes() {
        let clues = [n(), n(), n(), n(), Some(4), n(), n(), n(), n()];
        let mut board = board(2, 2, &clues);
        let mut stats = Stats::default();

        assert_eq!(
            propagate(&mut board, &rule_set(2), &mut stats),
            Propagation::Complete
        );
        assert_eq!(board.solution_string(), "\\//\\");
        assert_eq!(stats.max_tier, 1);
        assert!(stats.work > 0);
    }

    #[test]
    fn surrounded_four_contradicts() {
        // Zeros in every grid corner forbid all four touches the center
        // demands.
        let clues = [
            Some(0), n(), Some(0),
            n(), Some(4), n(),
            Some(0), n(), Some(0),
        ];
        let mut board = board(2, 2, &clues);
        let mut stats = Stats::default();

        assert_eq!(
            propagate(&mut board, &rule_set(3), &mut stats),
            Propagation::Contradiction
        );
    }

    #[test]
    fn open_board_sticks() {
        let mut board = board(2, 2, &[None; 9]);
        let mut stats = Stats::default();

        assert_eq!(
            propagate(&mut board, &rule_set(3), &mut stats),
            Propagation::Stuck
        );
        assert_eq!(stats.work, 0);
    }

    #[test]
    fn propagation_is_idempotent() {
        let clues = [n(), Some(1), n(), Some(2), n(), n(), n(), n(), n()];
        let mut board = board(2, 2, &clues);
        let mut stats = Stats::default();

        let first = propagate(&mut board, &rule_set(2), &mut stats);
        let settled = board.snapshot();
        let work_after_first = stats.work;

        assert_eq!(propagate(&mut board, &rule_set(2), &mut stats), first);
        assert_eq!(board.snapshot(), settled);
        assert_eq!(stats.work, work_after_first);
    }
}

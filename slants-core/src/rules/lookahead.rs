//! Tier 3: bounded lookahead.
//!
//! Puzzles needing these are harder than a person is expected to solve on
//! paper, which is why the generator refuses to rely on them.

use super::place_if_safe;
use crate::{
    board::{Board, Contradiction},
    geometry::Slant,
};

/// Whether a stroke can go into a cell without closing a loop, overshooting
/// a touched clue, or starving a bypassed clue of its last suppliers.
fn orientation_viable(board: &mut Board, cell: usize, slant: Slant) -> bool {
    if board.would_form_loop(cell, slant) {
        return false;
    }

    let grid = board.grid();

    let (t1, t2) = grid.endpoints(cell, slant);
    for corner in [t1, t2] {
        if let Some(clue) = board.clue(corner) {
            if board.touches(corner).0 + 1 > clue {
                return false;
            }
        }
    }

    let (a1, a2) = grid.bypassed(cell, slant);
    for corner in [a1, a2] {
        if let Some(clue) = board.clue(corner) {
            let (current, unknown) = board.touches(corner);
            if current + unknown - 1 < clue {
                return false;
            }
        }
    }

    true
}

/// Try each stroke of each unknown cell against its four clues; when only
/// one stroke survives, place it.
pub(super) fn trial_clue_violation(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for cell in board.unknown_cells() {
        let slash_ok = orientation_viable(board, cell, Slant::Slash);
        let backslash_ok = orientation_viable(board, cell, Slant::Backslash);

        if slash_ok && !backslash_ok {
            progress |= place_if_safe(board, cell, Slant::Slash)?;
        } else if backslash_ok && !slash_ok {
            progress |= place_if_safe(board, cell, Slant::Backslash)?;
        }
    }

    Ok(progress)
}

/// Speculatively place one stroke and check whether some other cell is left
/// with no viable stroke at all; if so the speculation was impossible.
///
/// The known-solution oracle is suspended around the speculation: probing a
/// wrong stroke on purpose is the whole point here.
pub(super) fn one_step_lookahead(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for cell in board.unknown_cells() {
        if board.value(cell).is_some() {
            continue;
        }

        let mut contradicts = [false; 2];

        for (i, &slant) in Slant::BOTH.iter().enumerate() {
            if board.would_form_loop(cell, slant) {
                contradicts[i] = true;
                continue;
            }

            let known = board.take_known_solution();
            let snapshot = board.snapshot();

            contradicts[i] = match board.place(cell, slant) {
                Err(_) => true,
                Ok(()) => {
                    let mut stranded = false;
                    for other in board.unknown_cells() {
                        if other == cell {
                            continue;
                        }
                        if !orientation_viable(board, other, Slant::Slash)
                            && !orientation_viable(board, other, Slant::Backslash)
                        {
                            stranded = true;
                            break;
                        }
                    }
                    stranded
                }
            };

            board.restore(&snapshot);
            board.put_known_solution(known);
        }

        let [slash_contradicts, backslash_contradicts] = contradicts;
        if slash_contradicts && !backslash_contradicts {
            progress |= place_if_safe(board, cell, Slant::Backslash)?;
        } else if backslash_contradicts && !slash_contradicts {
            progress |= place_if_safe(board, cell, Slant::Slash)?;
        }
    }

    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Slant;

    fn board_with_clues(width: usize, height: usize, clues: &[(usize, usize, u8)]) -> Board {
        let corners = (width + 1) * (height + 1);
        let mut vec = vec![None; corners];
        for &(cx, cy, clue) in clues {
            vec[cy * (width + 1) + cx] = Some(clue);
        }
        Board::new(width, height, vec).unwrap()
    }

    #[test]
    fn trial_rejects_the_stroke_that_starves_a_clue() {
        // The top-left corner clue of 1 has a single incident cell, so the
        // stroke bypassing it can never be played there.
        let mut board = board_with_clues(2, 1, &[(0, 0, 1)]);

        assert!(trial_clue_violation(&mut board).unwrap());
        assert_eq!(board.value(0), Some(Slant::Backslash));
    }

    #[test]
    fn lookahead_finds_nothing_on_an_open_board() {
        let mut board = board_with_clues(2, 2, &[]);

        assert!(!one_step_lookahead(&mut board).unwrap());
        assert!(board.unknown_cells().len() == 4);
    }

    #[test]
    fn lookahead_preserves_the_board_while_probing() {
        // Nothing is deducible here, so after probing every speculation the
        // board must be byte-for-byte what it was.
        let mut board = board_with_clues(2, 2, &[(1, 1, 2)]);
        let before = board.snapshot();

        assert!(!one_step_lookahead(&mut board).unwrap());
        assert_eq!(board.snapshot(), before);
    }
}

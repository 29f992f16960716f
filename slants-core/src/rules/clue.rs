//! Tier 1: local clue closure.
//!
//! Each of these looks at one clued corner (or one cell) at a time and
//! commits whatever is forced outright.

use super::{place_if_safe, scan_corner};
use crate::{
    board::{Board, Contradiction},
    geometry::Slant,
};

/// A 0 clue: every incident cell must avoid the corner.
pub(super) fn corner_zero(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        if board.clue(corner) != Some(0) {
            continue;
        }
        for (cell, touch) in scan_corner(board, corner).unknown {
            progress |= place_if_safe(board, cell, touch.flipped())?;
        }
    }

    Ok(progress)
}

/// A 4 clue: every incident cell must touch the corner.
pub(super) fn corner_four(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        if board.clue(corner) != Some(4) {
            continue;
        }
        for (cell, touch) in scan_corner(board, corner).unknown {
            progress |= place_if_safe(board, cell, touch)?;
        }
    }

    Ok(progress)
}

/// A clue that already has all its touches: the remaining unknown cells
/// must all avoid.
pub(super) fn clue_saturated(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        let Some(clue) = board.clue(corner) else {
            continue;
        };

        let scan = scan_corner(board, corner);
        if scan.current == clue {
            for (cell, touch) in scan.unknown {
                progress |= place_if_safe(board, cell, touch.flipped())?;
            }
        }
    }

    Ok(progress)
}

/// A clue that needs every remaining unknown cell to reach its count: they
/// must all touch.
pub(super) fn clue_needs_all(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        let Some(clue) = board.clue(corner) else {
            continue;
        };

        let scan = scan_corner(board, corner);
        let needed = i32::from(clue) - i32::from(scan.current);
        if needed > 0 && needed == scan.unknown.len() as i32 {
            for (cell, touch) in scan.unknown {
                progress |= place_if_safe(board, cell, touch)?;
            }
        }
    }

    Ok(progress)
}

/// When one stroke of an unknown cell would close a loop, the other stroke
/// is forced.
pub(super) fn no_loops(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for cell in board.unknown_cells() {
        let slash_loops = board.would_form_loop(cell, Slant::Slash);
        let backslash_loops = board.would_form_loop(cell, Slant::Backslash);

        if slash_loops && !backslash_loops {
            progress |= place_if_safe(board, cell, Slant::Backslash)?;
        } else if backslash_loops && !slash_loops {
            progress |= place_if_safe(board, cell, Slant::Slash)?;
        }
    }

    Ok(progress)
}

/// A clue equal to the corner's incident cell count: all of them touch.
/// Mostly bites on edges and in grid corners, where the count is 2 or 1.
pub(super) fn edge_saturation(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        let Some(clue) = board.clue(corner) else {
            continue;
        };
        if clue != board.grid().corner_degree(corner) {
            continue;
        }

        for (cell, touch) in scan_corner(board, corner).unknown {
            progress |= place_if_safe(board, cell, touch)?;
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
    fn corner_four_fills_the_center_star() {
        let mut board = board_with_clues(2, 2, &[(1, 1, 4)]);

        assert!(corner_four(&mut board).unwrap());
        assert_eq!(board.solution_string(), "\\//\\");
        assert!(!corner_four(&mut board).unwrap());
    }

    #[test]
    fn corner_zero_stops_short_of_closing_a_loop() {
        // All four cells avoiding the center would draw a diamond around
        // it; the rule places the first three and refuses the fourth.
        let mut board = board_with_clues(2, 2, &[(1, 1, 0)]);

        assert!(corner_zero(&mut board).unwrap());
        assert_eq!(board.solution_string(), "/\\\\.");
    }

    #[test]
    fn saturated_clue_forces_avoiders() {
        let mut board = board_with_clues(2, 2, &[(1, 1, 1)]);
        let grid = board.grid();
        board.place(grid.cell_index(0, 0), Slant::Backslash).unwrap();

        assert!(clue_saturated(&mut board).unwrap());
        assert_eq!(board.solution_string(), "\\\\\\/");
    }

    #[test]
    fn needy_clue_forces_touches() {
        let mut board = board_with_clues(2, 2, &[(1, 1, 3)]);
        let grid = board.grid();
        // One avoider placed: the remaining three must all touch.
        board.place(grid.cell_index(0, 0), Slant::Slash).unwrap();

        assert!(clue_needs_all(&mut board).unwrap());
        assert_eq!(board.solution_string(), "///\\");
    }

    #[test]
    fn no_loops_closes_three_quarters_of_a_square() {
        let mut board = board_with_clues(2, 2, &[]);
        let grid = board.grid();
        board.place(grid.cell_index(0, 0), Slant::Backslash).unwrap();
        board.place(grid.cell_index(1, 0), Slant::Slash).unwrap();
        board.place(grid.cell_index(0, 1), Slant::Slash).unwrap();

        assert!(no_loops(&mut board).unwrap());
        assert_eq!(board.value(grid.cell_index(1, 1)), Some(Slant::Slash));
    }

    #[test]
    fn edge_saturation_handles_a_border_two() {
        let mut board = board_with_clues(2, 2, &[(1, 0, 2)]);

        assert!(edge_saturation(&mut board).unwrap());
        let grid = board.grid();
        assert_eq!(board.value(grid.cell_index(0, 0)), Some(Slant::Slash));
        assert_eq!(board.value(grid.cell_index(1, 0)), Some(Slant::Backslash));
    }
}

//! Tier 2: pattern deductions.
//!
//! These look at the interaction of two clues, at the connectivity
//! counters, at forced-equivalence groups, or at the per-cell V-shape
//! feasibility bits.

use super::{place_if_safe, scan_corner};
use crate::{
    board::{
        Board, Contradiction, V_BELOW_LEFT, V_BELOW_MASK, V_BELOW_RIGHT, V_RIGHT_DOWN,
        V_RIGHT_MASK, V_RIGHT_UP,
    },
    geometry::{Grid, Slant},
};

/// A 2 clue on an edge has exactly two incident cells; both must touch,
/// drawing a V against the border.
pub(super) fn border_two_v(board: &mut Board) -> Result<bool, Contradiction> {
    let mut progress = false;

    for corner in 0..board.grid().corner_count() {
        if board.clue(corner) != Some(2) || board.grid().corner_degree(corner) != 2 {
            continue;
        }

        let scan = scan_corner(board, corner);
        if scan.current + scan.unknown.len() as u8 == 2 {
            for (cell, touch) in scan.unknown {
                progress |= place_if_safe(board, cell, touch)?;
            }
        }
    }

    Ok(progress)
}

/// Constrain two cells to hold the same stroke: merge them while both are
/// open, copy the stroke across once one is decided.
fn force_equal_pair(board: &mut Board, a: usize, b: usize) -> Result<bool, Contradiction> {
    match (board.value(a), board.value(b)) {
        (None, None) => Ok(board.mark_equivalent(a, b)),
        (Some(v), None) => place_if_safe(board, b, v),
        (None, Some(v)) => place_if_safe(board, a, v),
        (Some(_), Some(_)) => Ok(false),
    }
}

/// A realized V whose point sits on a 3 clue: the point already delivers
/// two touches, so of the two cells on the far side of the point exactly
/// one must provide the third.  Those two cells touch the corner with
/// opposite strokes, which pins them equal.
pub(super) fn v_pattern_three(board: &mut Board) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let (w, h) = (grid.width, grid.height);
    let mut progress = false;

    for y in 0..h {
        for x in 0..w.saturating_sub(1) {
            let left = grid.cell_index(x, y);
            let right = grid.cell_index(x + 1, y);

            match (board.value(left), board.value(right)) {
                // `\/`: point down at (x+1, y+1)
                (Some(Slant::Backslash), Some(Slant::Slash)) => {
                    let point = grid.corner_index(x + 1, y + 1);
                    if board.clue(point) == Some(3) && y + 1 < h {
                        let below_left = grid.cell_index(x, y + 1);
                        let below_right = grid.cell_index(x + 1, y + 1);
                        progress |= force_equal_pair(board, below_left, below_right)?;
                    }
                }
                // `/\`: point up at (x+1, y)
                (Some(Slant::Slash), Some(Slant::Backslash)) => {
                    let point = grid.corner_index(x + 1, y);
                    if board.clue(point) == Some(3) && y > 0 {
                        let above_left = grid.cell_index(x, y - 1);
                        let above_right = grid.cell_index(x + 1, y - 1);
                        progress |= force_equal_pair(board, above_left, above_right)?;
                    }
                }
                _ => {}
            }
        }
    }

    for y in 0..h.saturating_sub(1) {
        for x in 0..w {
            let top = grid.cell_index(x, y);
            let bottom = grid.cell_index(x, y + 1);

            match (board.value(top), board.value(bottom)) {
                // point right at (x+1, y+1)
                (Some(Slant::Backslash), Some(Slant::Slash)) => {
                    let point = grid.corner_index(x + 1, y + 1);
                    if board.clue(point) == Some(3) && x + 1 < w {
                        let right_top = grid.cell_index(x + 1, y);
                        let right_bottom = grid.cell_index(x + 1, y + 1);
                        progress |= force_equal_pair(board, right_top, right_bottom)?;
                    }
                }
                // point left at (x, y+1)
                (Some(Slant::Slash), Some(Slant::Backslash)) => {
                    let point = grid.corner_index(x, y + 1);
                    if board.clue(point) == Some(3) && x > 0 {
                        let left_top = grid.cell_index(x - 1, y);
                        let left_bottom = grid.cell_index(x - 1, y + 1);
                        progress |= force_equal_pair(board, left_top, left_bottom)?;
                    }
                }
                _ => {}
            }
        }
    }

    Ok(progress)
}

/// The two cells flanking the edge between two orthogonally adjacent
/// corners, when cells exist on both sides of it.
fn edge_flanks(grid: Grid, cx: usize, cy: usize, horizontal: bool) -> Option<(usize, usize)> {
    if horizontal {
        (cy > 0 && cy < grid.height)
            .then(|| (grid.cell_index(cx, cy - 1), grid.cell_index(cx, cy)))
    } else {
        (cx > 0 && cx < grid.width)
            .then(|| (grid.cell_index(cx - 1, cy), grid.cell_index(cx, cy)))
    }
}

/// Two orthogonally adjacent 1 clues: each flanking cell of their shared
/// edge touches exactly one of the pair whichever way it falls, so the two
/// flanks exhaust both clues between them.  The flanks come out equal and
/// every other incident cell must avoid.
pub(super) fn adjacent_ones(board: &mut Board) -> Result<bool, Contradiction> {
    paired_clue_budget(board, 1, false)
}

/// Two orthogonally adjacent 3 clues: six touches are needed and six are
/// the most the incident cells can deliver, so every non-flank cell must
/// touch and the flanks split one touch each, coming out equal.
pub(super) fn adjacent_threes(board: &mut Board) -> Result<bool, Contradiction> {
    paired_clue_budget(board, 3, true)
}

fn paired_clue_budget(
    board: &mut Board,
    clue: u8,
    others_touch: bool,
) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let mut progress = false;

    for cy in 0..=grid.height {
        for cx in 0..=grid.width {
            let corner = grid.corner_index(cx, cy);
            if board.clue(corner) != Some(clue) {
                continue;
            }

            for (dx, dy, horizontal) in [(1, 0, true), (0, 1, false)] {
                let (nx, ny) = (cx + dx, cy + dy);
                if nx > grid.width || ny > grid.height {
                    continue;
                }
                let neighbor = grid.corner_index(nx, ny);
                if board.clue(neighbor) != Some(clue) {
                    continue;
                }
                let Some((flank_a, flank_b)) = edge_flanks(grid, cx, cy, horizontal) else {
                    continue;
                };

                progress |= board.mark_equivalent(flank_a, flank_b);

                for vertex in [corner, neighbor] {
                    for (cell, touch) in scan_corner(board, vertex).unknown {
                        if cell == flank_a || cell == flank_b {
                            continue;
                        }
                        let stroke = if others_touch { touch } else { touch.flipped() };
                        progress |= place_if_safe(board, cell, stroke)?;
                    }
                }
            }
        }
    }

    Ok(progress)
}

/// Two diagonally adjacent 1 clues share one cell, and that cell touches
/// both of them or neither.  If either clue has no other open cell, the
/// shared cell must touch (and satisfies both at once).
pub(super) fn diagonal_ones(board: &mut Board) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let mut progress = false;

    for cy in 0..=grid.height {
        for cx in 0..=grid.width {
            let corner = grid.corner_index(cx, cy);
            if board.clue(corner) != Some(1) || board.touches(corner).0 >= 1 {
                continue;
            }

            for (dx, dy) in [(1i64, 1i64), (1, -1), (-1, 1), (-1, -1)] {
                let nx = cx as i64 + dx;
                let ny = cy as i64 + dy;
                if nx < 0 || ny < 0 || nx > grid.width as i64 || ny > grid.height as i64 {
                    continue;
                }
                let neighbor = grid.corner_index(nx as usize, ny as usize);
                if board.clue(neighbor) != Some(1) || board.touches(neighbor).0 >= 1 {
                    continue;
                }

                // The one cell between the two corners.
                let sx = if dx > 0 { cx } else { cx - 1 };
                let sy = if dy > 0 { cy } else { cy - 1 };
                let shared = grid.cell_index(sx, sy);
                if board.value(shared).is_some() {
                    continue;
                }

                let scan = scan_corner(board, corner);
                let my_options = scan.unknown.iter().filter(|&&(c, _)| c != shared).count();
                let neighbor_options = scan_corner(board, neighbor)
                    .unknown
                    .iter()
                    .filter(|&&(c, _)| c != shared)
                    .count();

                if my_options == 0 || neighbor_options == 0 {
                    let touch = scan
                        .unknown
                        .iter()
                        .find(|&&(c, _)| c == shared)
                        .map(|&(_, t)| t)
                        .expect("shared cell is unknown and incident");
                    progress |= place_if_safe(board, shared, touch)?;
                }
            }
        }
    }

    Ok(progress)
}

fn dead_pair(board: &mut Board, a: usize, b: usize) -> bool {
    !board.group_border(a)
        && !board.group_border(b)
        && board.group_exits(a) <= 1
        && board.group_exits(b) <= 1
}

/// A stroke joining two exhausted interior groups would strand a component
/// that can never reach the perimeter nor grow without closing a loop.
/// Reject that stroke; when only one stroke survives, place it.
pub(super) fn dead_end_avoidance(board: &mut Board) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let mut progress = false;

    for cell in board.unknown_cells() {
        let (ba, bb) = grid.endpoints(cell, Slant::Backslash);
        let backslash_dead = dead_pair(board, ba, bb);

        let (sa, sb) = grid.endpoints(cell, Slant::Slash);
        let slash_dead = dead_pair(board, sa, sb);

        if backslash_dead && !slash_dead {
            progress |= place_if_safe(board, cell, Slant::Slash)?;
        } else if slash_dead && !backslash_dead {
            progress |= place_if_safe(board, cell, Slant::Backslash)?;
        }
    }

    Ok(progress)
}

/// Forced-equivalence bookkeeping.
///
/// Discovers new groups (a clue one touch short with exactly two open,
/// edge-adjacent incident cells pins them equal), assigns any cell whose
/// group is already committed, and forbids strokes that would force a loop
/// elsewhere in the cell's group.
pub(super) fn equivalence_classes(board: &mut Board) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let mut progress = false;

    for corner in 0..grid.corner_count() {
        let Some(clue) = board.clue(corner) else {
            continue;
        };

        let scan = scan_corner(board, corner);
        let needed = i32::from(clue) - i32::from(scan.current);
        if needed == 1 && scan.unknown.len() == 2 {
            let (a, _) = scan.unknown[0];
            let (b, _) = scan.unknown[1];
            let (ax, ay) = grid.cell_pos(a);
            let (bx, by) = grid.cell_pos(b);

            if ax.abs_diff(bx) + ay.abs_diff(by) == 1 {
                progress |= board.mark_equivalent(a, b);
            }
        }
    }

    for cell in board.unknown_cells() {
        let Some(value) = board.equiv_value(cell) else {
            continue;
        };

        if !board.would_form_loop(cell, value) {
            board.place(cell, value)?;
            progress = true;
        } else {
            // The group's stroke is impossible here; committing the other
            // stroke surfaces the conflict.
            let other = value.flipped();
            if !board.would_form_loop(cell, other) {
                board.place(cell, other)?;
                progress = true;
            }
        }
    }

    for cell in board.unknown_cells() {
        if board.value(cell).is_some() {
            continue;
        }
        let root = board.equiv_root(cell);

        let mut slash_blocked = false;
        let mut backslash_blocked = false;
        for peer in 0..grid.cell_count() {
            if peer == cell || board.value(peer).is_some() || board.equiv_root(peer) != root {
                continue;
            }
            slash_blocked |= board.would_form_loop(peer, Slant::Slash);
            backslash_blocked |= board.would_form_loop(peer, Slant::Backslash);
        }

        if slash_blocked && !backslash_blocked {
            progress |= place_if_safe(board, cell, Slant::Backslash)?;
        } else if backslash_blocked && !slash_blocked {
            progress |= place_if_safe(board, cell, Slant::Slash)?;
        }
    }

    Ok(progress)
}

/// Drive the V-shape feasibility bits to a fixed point.
///
/// Assigned cells rule out the pair shapes needing their other stroke; a
/// 1 clue rules out pairs pointing at it, a 3 clue pairs pointing away,
/// and a 2 clue keeps the pairs on its opposite sides in lockstep.  A pair
/// with no V shape left pins its two cells equal.
pub(super) fn vbitmap_propagation(board: &mut Board) -> Result<bool, Contradiction> {
    let grid = board.grid();
    let (w, h) = (grid.width, grid.height);
    let mut progress = false;

    loop {
        let mut changed = false;

        for cell in 0..grid.cell_count() {
            let Some(slant) = board.value(cell) else {
                continue;
            };
            let (x, y) = grid.cell_pos(cell);

            let own = match slant {
                Slant::Slash => V_RIGHT_DOWN | V_BELOW_RIGHT,
                Slant::Backslash => V_RIGHT_UP | V_BELOW_LEFT,
            };
            changed |= board.clear_vbits(cell, own);

            if x > 0 {
                let bits = match slant {
                    Slant::Backslash => V_RIGHT_DOWN,
                    Slant::Slash => V_RIGHT_UP,
                };
                changed |= board.clear_vbits(cell - 1, bits);
            }
            if y > 0 {
                let bits = match slant {
                    Slant::Backslash => V_BELOW_RIGHT,
                    Slant::Slash => V_BELOW_LEFT,
                };
                changed |= board.clear_vbits(cell - w, bits);
            }
        }

        for cy in 1..h {
            for cx in 1..w {
                let Some(clue) = board.clue(grid.corner_index(cx, cy)) else {
                    continue;
                };
                let top_left = grid.cell_index(cx - 1, cy - 1);
                let bottom_left = grid.cell_index(cx - 1, cy);
                let top_right = grid.cell_index(cx, cy - 1);

                match clue {
                    1 => {
                        changed |= board.clear_vbits(top_left, V_RIGHT_DOWN | V_BELOW_RIGHT);
                        changed |= board.clear_vbits(bottom_left, V_RIGHT_UP);
                        changed |= board.clear_vbits(top_right, V_BELOW_LEFT);
                    }
                    3 => {
                        changed |= board.clear_vbits(top_left, V_RIGHT_UP | V_BELOW_LEFT);
                        changed |= board.clear_vbits(bottom_left, V_RIGHT_DOWN);
                        changed |= board.clear_vbits(top_right, V_BELOW_RIGHT);
                    }
                    2 => {
                        let above = board.vbits(top_left) & V_RIGHT_MASK;
                        let below = board.vbits(bottom_left) & V_RIGHT_MASK;
                        changed |= board.clear_vbits(top_left, V_RIGHT_MASK ^ below);
                        changed |= board.clear_vbits(bottom_left, V_RIGHT_MASK ^ above);

                        let left = board.vbits(top_left) & V_BELOW_MASK;
                        let right = board.vbits(top_right) & V_BELOW_MASK;
                        changed |= board.clear_vbits(top_left, V_BELOW_MASK ^ right);
                        changed |= board.clear_vbits(top_right, V_BELOW_MASK ^ left);
                    }
                    _ => {}
                }
            }
        }

        for cell in 0..grid.cell_count() {
            let (x, y) = grid.cell_pos(cell);
            if x + 1 < w && board.vbits(cell) & V_RIGHT_MASK == 0 {
                changed |= board.mark_equivalent(cell, cell + 1);
            }
            if y + 1 < h && board.vbits(cell) & V_BELOW_MASK == 0 {
                changed |= board.mark_equivalent(cell, cell + w);
            }
        }

        progress |= changed;
        if !changed {
            break;
        }
    }

    Ok(progress)
}

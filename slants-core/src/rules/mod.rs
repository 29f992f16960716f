//! Deduction rules.
//!
//! Every rule is one entry in [`RULES`]: a name, a work cost, a difficulty
//! tier, and an `apply` function that inspects the board and commits any
//! placements or merges it can justify.  `apply` reports whether it made
//! progress; a [`Contradiction`] bubbles out when the board state admits no
//! solution at all.
//!
//! Tier 1 and 2 are deductions a person makes locally on paper; tier 3 is
//! bounded lookahead.  The engine runs the table in order, so the table is
//! kept sorted by ascending (cost, tier).

use smallvec::SmallVec;

use crate::{
    board::{Board, Contradiction},
    geometry::Slant,
};

mod clue;
mod lookahead;
mod pattern;

/// A single deduction rule.
pub struct Rule {
    pub name: &'static str,
    /// Added to the solve's work score each time the rule makes progress.
    pub cost: u32,
    /// 1–2: human-style local deduction.  3: bounded lookahead.
    pub tier: u8,
    pub apply: fn(&mut Board) -> Result<bool, Contradiction>,
}

/// The canonical rule table, sorted by ascending (cost, tier).
pub static RULES: [Rule; 16] = [
    Rule { name: "corner_zero", cost: 1, tier: 1, apply: clue::corner_zero },
    Rule { name: "corner_four", cost: 1, tier: 1, apply: clue::corner_four },
    Rule { name: "clue_saturated", cost: 1, tier: 1, apply: clue::clue_saturated },
    Rule { name: "clue_needs_all", cost: 2, tier: 1, apply: clue::clue_needs_all },
    Rule { name: "no_loops", cost: 2, tier: 1, apply: clue::no_loops },
    Rule { name: "edge_saturation", cost: 2, tier: 1, apply: clue::edge_saturation },
    Rule { name: "border_two_v", cost: 3, tier: 2, apply: pattern::border_two_v },
    Rule { name: "v_pattern_three", cost: 6, tier: 2, apply: pattern::v_pattern_three },
    Rule { name: "adjacent_ones", cost: 8, tier: 2, apply: pattern::adjacent_ones },
    Rule { name: "adjacent_threes", cost: 8, tier: 2, apply: pattern::adjacent_threes },
    Rule { name: "diagonal_ones", cost: 8, tier: 2, apply: pattern::diagonal_ones },
    Rule { name: "dead_end_avoidance", cost: 9, tier: 2, apply: pattern::dead_end_avoidance },
    Rule { name: "equivalence_classes", cost: 9, tier: 2, apply: pattern::equivalence_classes },
    Rule { name: "vbitmap_propagation", cost: 9, tier: 2, apply: pattern::vbitmap_propagation },
    Rule { name: "trial_clue_violation", cost: 10, tier: 3, apply: lookahead::trial_clue_violation },
    Rule { name: "one_step_lookahead", cost: 15, tier: 3, apply: lookahead::one_step_lookahead },
];

/// The rules available up to (and including) a tier, in table order.
pub fn rule_set(max_tier: u8) -> Vec<&'static Rule> {
    RULES.iter().filter(|rule| rule.tier <= max_tier).collect()
}

/// Survey of one corner: placed touches plus the unknown incident cells,
/// each tagged with the stroke that would touch the corner.
pub(crate) struct CornerScan {
    pub current: u8,
    pub unknown: SmallVec<[(usize, Slant); 4]>,
}

pub(crate) fn scan_corner(board: &Board, corner: usize) -> CornerScan {
    let mut scan = CornerScan {
        current: 0,
        unknown: SmallVec::new(),
    };

    for (cell, touch) in board.grid().corner_cells(corner) {
        match board.value(cell) {
            None => scan.unknown.push((cell, touch)),
            Some(slant) if slant == touch => scan.current += 1,
            Some(_) => {}
        }
    }

    scan
}

/// Place a stroke unless the cell is already decided or the stroke would
/// close a loop.  Other invariant violations still bubble out as
/// contradictions.
pub(crate) fn place_if_safe(
    board: &mut Board,
    cell: usize,
    slant: Slant,
) -> Result<bool, Contradiction> {
    if board.value(cell).is_some() || board.would_form_loop(cell, slant) {
        return Ok(false);
    }
    board.place(cell, slant)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{rule_set, RULES};

    #[test]
    fn table_is_sorted_by_cost_then_tier() {
        for pair in RULES.windows(2) {
            assert!(
                (pair[0].cost, pair[0].tier) <= (pair[1].cost, pair[1].tier),
                "{} is out of order",
                pair[1].name
            );
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in RULES.iter().enumerate() {
            for b in &RULES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn tier_filtering() {
        assert_eq!(rule_set(3).len(), RULES.len());
        assert_eq!(rule_set(2).len(), RULES.len() - 2);
        assert!(rule_set(1).iter().all(|rule| rule.tier == 1));
    }
}

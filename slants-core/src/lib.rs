//! Deductive solver and generator for Slants (Gokigen Naname) puzzles.
//!
//! Every cell of a rectangular grid takes one of two diagonal strokes;
//! numeric clues at lattice corners fix exactly how many strokes touch
//! them, and the strokes may never close a loop.  [`solve`] decides whether
//! a clue set has zero, one, or several solutions by propagating deduction
//! rules to a fixed point and then branching; [`generate`] samples a random
//! acyclic board and strips clues for as long as the puzzle stays uniquely
//! solvable with paper-level rules.

pub mod board;
pub mod codec;
pub mod engine;
mod error;
pub mod generate;
pub mod geometry;
pub mod rules;
pub mod search;
pub mod solver;
mod union_find;

pub use board::{Board, Snapshot};
pub use error::Error;
pub use generate::{generate, GenerateOptions, GeneratedPuzzle};
pub use geometry::{Grid, Slant};
pub use solver::{solve, SolveOptions, SolveReport, Status};

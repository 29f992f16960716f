use thiserror::Error;

/// Errors surfaced to callers of the library.
///
/// Internal solver contradictions are not errors; they are folded into the
/// solve status. Everything here is a malformed input or a generator that
/// ran out of attempts.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("invalid character {0:?} in clue string")]
    BadClueChar(char),

    #[error("expected {expected} clues for a {width}x{height} grid, got {got}")]
    ClueCount {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },

    #[error("clue {clue} at corner ({cx}, {cy}) exceeds its {max} incident cells")]
    ClueTooLarge { cx: usize, cy: usize, clue: u8, max: u8 },

    #[error("grid dimensions must be nonzero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("malformed puzzle line: {0}")]
    BadPuzzleLine(String),

    #[error("could not synthesize a puzzle after {attempts} attempts")]
    Synthesis { attempts: u32 },

    #[error("io error reading puzzles: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e.to_string())
    }
}

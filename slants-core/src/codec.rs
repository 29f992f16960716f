//! Boundary text formats: the run-length clue encoding and the
//! tab-separated puzzle file format.
//!
//! A clue string is one character per item: a digit `0`–`4` places a clue
//! at the next corner (row-major), a lowercase letter skips a run of
//! corners (`a` = 1 … `z` = 26).  Decoding is lenient about length: a short
//! string leaves the remaining corners unclued, a long one is truncated.

use std::io::BufRead;

use crate::error::Error;

/// Decode a clue string against the given dimensions.
pub fn decode_clues(encoded: &str, width: usize, height: usize) -> Result<Vec<Option<u8>>, Error> {
    let expected = (width + 1) * (height + 1);
    let mut clues = Vec::with_capacity(expected);

    for c in encoded.chars() {
        match c {
            '0'..='4' => clues.push(Some(c as u8 - b'0')),
            'a'..='z' => {
                let run = c as usize - 'a' as usize + 1;
                clues.extend(std::iter::repeat(None).take(run));
            }
            other => return Err(Error::BadClueChar(other)),
        }
    }

    clues.resize(expected, None);
    Ok(clues)
}

/// Encode a clue vector, emitting unclued runs as letters.
pub fn encode_clues(clues: &[Option<u8>]) -> String {
    let mut out = String::new();
    let mut run = 0usize;

    for &clue in clues {
        match clue {
            None => run += 1,
            Some(c) => {
                flush_run(&mut out, &mut run);
                out.push((b'0' + c) as char);
            }
        }
    }
    flush_run(&mut out, &mut run);

    out
}

fn flush_run(out: &mut String, run: &mut usize) {
    while *run > 0 {
        let chunk = (*run).min(26);
        out.push((b'a' + chunk as u8 - 1) as char);
        *run -= chunk;
    }
}

/// One puzzle record from a testsuite file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PuzzleLine {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub clues: String,
    pub solution: Option<String>,
    pub comment: Option<String>,
}

/// Parse one tab-separated line: `name W H clues [solution [#comment]]`.
///
/// Comment lines (`#` or `;`) and lines with fewer than four fields yield
/// `Ok(None)`.  Non-numeric size fields are an error.
pub fn parse_puzzle_line(line: &str) -> Result<Option<PuzzleLine>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 4 {
        return Ok(None);
    }

    let size = |field: &str| {
        field
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::BadPuzzleLine(line.to_string()))
    };

    let solution = parts
        .get(4)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let comment = parts
        .get(5)
        .map(|s| s.trim_start_matches('#').trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Some(PuzzleLine {
        name: parts[0].to_string(),
        width: size(parts[1])?,
        height: size(parts[2])?,
        clues: parts[3].to_string(),
        solution,
        comment,
    }))
}

/// Read every puzzle record from a testsuite stream.
pub fn read_puzzles(reader: impl BufRead) -> Result<Vec<PuzzleLine>, Error> {
    let mut puzzles = Vec::new();

    for line in reader.lines() {
        if let Some(puzzle) = parse_puzzle_line(&line?)? {
            puzzles.push(puzzle);
        }
    }

    Ok(puzzles)
}

#[cfg(test)]
mod tests {
    use super::{decode_clues, encode_clues, parse_puzzle_line, read_puzzles};
    use crate::error::Error;

    #[test]
    fn single_letter_covers_a_three_by_three() {
        let clues = decode_clues("p", 3, 3).unwrap();
        assert_eq!(clues.len(), 16);
        assert!(clues.iter().all(|c| c.is_none()));
        assert_eq!(encode_clues(&clues), "p");
    }

    #[test]
    fn round_trips() {
        let cases: &[&[Option<u8>]] = &[
            &[Some(0), Some(4), Some(2), Some(1)],
            &[None, Some(3), None, None, Some(0), None],
        ];
        for &case in cases {
            assert_eq!(decode_clues(&encode_clues(case), case.len() - 1, 0).unwrap(), case);
        }

        // Runs longer than one letter split into z-chunks.
        let long = vec![None; 40];
        assert_eq!(encode_clues(&long), "zn");
        assert_eq!(decode_clues("zn", 39, 0).unwrap(), long);
    }

    #[test]
    fn random_vectors_round_trip() {
        let mut rng = fastrand::Rng::with_seed(5);

        for _ in 0..20 {
            let clues: Vec<Option<u8>> = (0..45)
                .map(|_| rng.bool().then(|| rng.u8(0..=4)))
                .collect();
            assert_eq!(decode_clues(&encode_clues(&clues), 44, 0).unwrap(), clues);
        }
    }

    #[test]
    fn short_pads_and_long_truncates() {
        let padded = decode_clues("12", 2, 2).unwrap();
        assert_eq!(padded.len(), 9);
        assert_eq!(padded[0], Some(1));
        assert_eq!(padded[1], Some(2));
        assert!(padded[2..].iter().all(|c| c.is_none()));

        let truncated = decode_clues("000000000000", 1, 1).unwrap();
        assert_eq!(truncated, vec![Some(0); 4]);
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(decode_clues("5", 2, 2), Err(Error::BadClueChar('5')));
        assert_eq!(decode_clues("a B", 2, 2), Err(Error::BadClueChar(' ')));
    }

    #[test]
    fn puzzle_lines() {
        let line = parse_puzzle_line("p1\t6\t5\tc120a\t//\\\\/\t# nice one")
            .unwrap()
            .unwrap();
        assert_eq!(line.name, "p1");
        assert_eq!((line.width, line.height), (6, 5));
        assert_eq!(line.clues, "c120a");
        assert_eq!(line.solution.as_deref(), Some("//\\\\/"));
        assert_eq!(line.comment.as_deref(), Some("nice one"));

        // Empty solution column stays empty.
        let bare = parse_puzzle_line("p2\t2\t2\ti\t\t#x").unwrap().unwrap();
        assert_eq!(bare.solution, None);

        assert_eq!(parse_puzzle_line("# header").unwrap(), None);
        assert_eq!(parse_puzzle_line("; note").unwrap(), None);
        assert_eq!(parse_puzzle_line("short\tline").unwrap(), None);
        assert!(parse_puzzle_line("p3\tsix\t5\tc120a").is_err());
    }

    #[test]
    fn reads_a_whole_file() {
        let file = "# generated\np1\t2\t2\ti\t\np2\t3\t3\tp\t\n";
        let puzzles = read_puzzles(file.as_bytes()).unwrap();

        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[0].name, "p1");
        assert_eq!(puzzles[1].clues, "p");
    }
}

//! Command-line driver: run a testsuite file through the solver, or
//! generate fresh puzzles as testsuite lines.

use std::{
    fs::File,
    io::{BufReader, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use log::warn;

use slants_core::{codec, generate, solve, GenerateOptions, SolveOptions, Status};

#[derive(Parser)]
#[command(name = "slants", about = "Solve and generate Slants (Gokigen Naname) puzzles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve every puzzle in a testsuite file and print a summary.
    Solve {
        /// Tab-separated puzzle file: name, width, height, clues,
        /// optional solution, optional comment.
        file: PathBuf,
        /// Highest rule tier allowed (3 enables search).
        #[arg(long, default_value_t = 3)]
        max_tier: u8,
        /// Only solve puzzles whose name contains this string.
        #[arg(long)]
        filter: Option<String>,
        /// Stop after this many puzzles.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print a testsuite-compatible result line per puzzle.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate puzzles and emit them as testsuite lines.
    Generate {
        #[arg(short, long, default_value_t = 6)]
        width: usize,
        #[arg(short = 'H', long, default_value_t = 5)]
        height: usize,
        /// How many puzzles to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 3)]
        reduction_passes: u32,
        /// Drop clues in point-reflected pairs.
        #[arg(long)]
        symmetry: bool,
        /// Write to this file (sorted by work score) instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Solve {
            file,
            max_tier,
            filter,
            limit,
            verbose,
        } => run_solve(&file, max_tier, filter.as_deref(), limit, verbose),
        Command::Generate {
            width,
            height,
            count,
            seed,
            reduction_passes,
            symmetry,
            output,
        } => run_generate(
            width,
            height,
            count,
            seed,
            &GenerateOptions {
                reduction_passes,
                symmetry,
            },
            output.as_deref(),
        ),
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run_solve(
    file: &std::path::Path,
    max_tier: u8,
    filter: Option<&str>,
    limit: Option<usize>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut puzzles = codec::read_puzzles(BufReader::new(File::open(file)?))?;

    if let Some(filter) = filter {
        puzzles.retain(|p| p.name.contains(filter));
    }
    if let Some(limit) = limit {
        puzzles.truncate(limit);
    }

    let total = puzzles.len();
    let mut solved = 0usize;
    let mut multiple = 0usize;
    let mut unsolved = 0usize;
    let mut total_work = 0u64;

    for puzzle in &puzzles {
        let options = SolveOptions {
            known_solution: puzzle.solution.clone(),
            max_tier,
            ..SolveOptions::default()
        };

        let report = match codec::decode_clues(&puzzle.clues, puzzle.width, puzzle.height)
            .and_then(|clues| solve(&clues, puzzle.width, puzzle.height, &options))
        {
            Ok(report) => report,
            Err(error) => {
                warn!("{}: {error}", puzzle.name);
                unsolved += 1;
                continue;
            }
        };

        match report.status {
            Status::Solved => {
                solved += 1;
                total_work += report.work;
                if let Some(answer) = &puzzle.solution {
                    if *answer != report.board {
                        warn!("{}: solution differs from the recorded answer", puzzle.name);
                    }
                }
            }
            Status::Multiple => multiple += 1,
            Status::Unsolved => unsolved += 1,
        }

        if verbose {
            let status = match report.status {
                Status::Solved => "solved",
                Status::Multiple => "mult",
                Status::Unsolved => "unsolved",
            };
            println!(
                "{}\t{}\t{}\t{}\t{}\t# status={status} work_score={} tier={}",
                puzzle.name,
                puzzle.width,
                puzzle.height,
                puzzle.clues,
                if report.status == Status::Solved {
                    report.board.as_str()
                } else {
                    ""
                },
                report.work,
                report.max_tier,
            );
        }
    }

    println!("puzzles tested: {total}");
    println!("solved: {solved}");
    if multiple > 0 {
        println!("multiple solutions: {multiple}");
    }
    println!("unsolved: {unsolved}");
    println!("total work score: {total_work}");
    if solved > 0 {
        println!(
            "average work score per solved puzzle: {:.1}",
            total_work as f64 / solved as f64
        );
    }

    Ok(())
}

fn run_generate(
    width: usize,
    height: usize,
    count: u64,
    seed: u64,
    options: &GenerateOptions,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = Vec::new();

    for i in 0..count {
        let puzzle = generate(width, height, seed.wrapping_add(i), options)?;
        let line = format!(
            "gen_{width}x{height}_{}\t{width}\t{height}\t{}\t{}\t# givens={} work_score={} tier={}",
            i + 1,
            codec::encode_clues(&puzzle.clues),
            puzzle.solution,
            puzzle.clue_count,
            puzzle.work,
            puzzle.max_tier,
        );

        if output.is_none() {
            println!("{line}");
        }
        lines.push((puzzle.work, line));
    }

    if let Some(path) = output {
        lines.sort_by_key(|&(work, _)| work);

        let mut file = File::create(path)?;
        writeln!(file, "# generated {count} puzzles, {width}x{height}, seed {seed}")?;
        for (_, line) in &lines {
            writeln!(file, "{line}")?;
        }
    }

    Ok(())
}

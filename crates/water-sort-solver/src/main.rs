//! CLI entry point for the Water Sort solver.
//!
//! Usage:
//!   water-sort-solver solve <puzzle.json> [options]
//!   water-sort-solver solve --stdin [options]
//!   water-sort-solver verify <puzzle.json> --moves "0>2,1>0"
//!
//! Options:
//!   --max-nodes <n>         Give up after visiting n states
//!   --timeout <seconds>     Give up after this many seconds
//!   --fallback              Retry with an extra tube if unsolvable
//!   --format <json|text>    Output format (default: json)
//!   -v, -vv                 Debug / trace logging (RUST_LOG also works)
//!
//! Puzzle files look like `{"tubes": [[0, 5], [5, 0], [], []], "extraTube": false}`,
//! with each tube listed top-first as color codes 0-11.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use serde::Serialize;

use water_sort_solver::{
    parse_moves, solve_with, solve_with_extra_tube_fallback, verify_solution, Move, Outcome,
    PuzzleDefinition, SolverConfig, SolverResult, Tube,
};

#[derive(Parser)]
#[command(name = "water-sort-solver")]
#[command(about = "Depth-first backtracking solver for Water Sort puzzles")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a move sequence that solves a puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Maximum number of states to visit
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Maximum search time in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Retry with an empty extra tube if the puzzle is unsolvable
        #[arg(long)]
        fallback: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Check that a move sequence solves a puzzle
    Verify {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Moves as SOURCE>DESTINATION pairs, e.g. "0>2,1>0"
        #[arg(long)]
        moves: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Output format for a solve result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<Move>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    nodes_explored: usize,
    time_elapsed_ms: u64,
    used_extra_tube: bool,
}

/// Output format for a verify result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    solves: bool,
    moves_replayed: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Run a command, returning whether the puzzle ended up solved
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Solve {
            file,
            stdin,
            max_nodes,
            timeout,
            fallback,
            format,
        } => {
            let definition = read_definition(file, stdin)?;
            let tubes = definition.build().context("invalid puzzle definition")?;
            info!("loaded {} tubes", tubes.len());

            let config = SolverConfig {
                max_nodes,
                timeout: timeout.map(Duration::from_secs),
            };
            let result = if fallback {
                solve_with_extra_tube_fallback(&tubes, &config)
            } else {
                solve_with(&tubes, &config)
            };

            match format {
                OutputFormat::Json => {
                    let output = format_result(&result);
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => print_text(&tubes, &result),
            }
            Ok(result.is_solved())
        }
        Commands::Verify { file, stdin, moves } => {
            let definition = read_definition(file, stdin)?;
            let tubes = definition.build().context("invalid puzzle definition")?;
            let moves = parse_moves(&moves).context("invalid --moves")?;

            let solves = verify_solution(&tubes, &moves).context("move sequence cannot be played")?;
            let output = VerifyOutput {
                solves,
                moves_replayed: moves.len(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(solves)
        }
    }
}

fn read_definition(file: Option<PathBuf>, stdin: bool) -> Result<PuzzleDefinition> {
    let json_content = if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        buffer
    } else if let Some(path) = file {
        fs::read_to_string(&path).with_context(|| format!("failed to read file {:?}", path))?
    } else {
        bail!("must provide either a file path or --stdin");
    };

    serde_json::from_str(&json_content).context("failed to parse puzzle JSON")
}

fn format_result(result: &SolverResult) -> SolveOutput {
    SolveOutput {
        solved: result.is_solved(),
        moves: result.moves().map(<[Move]>::to_vec),
        reason: match result.outcome {
            Outcome::Solved(_) => None,
            ref outcome => Some(outcome.describe().to_string()),
        },
        nodes_explored: result.nodes_explored,
        time_elapsed_ms: result.time_elapsed_ms,
        used_extra_tube: result.used_extra_tube,
    }
}

fn print_text(tubes: &[Tube], result: &SolverResult) {
    match &result.outcome {
        Outcome::Solved(moves) if moves.is_empty() => println!("Already solved."),
        Outcome::Solved(moves) => {
            if result.used_extra_tube {
                println!("Solved with an extra tube (tube {}).", tubes.len());
            }
            for (i, mv) in moves.iter().enumerate() {
                println!("{:>3}. pour tube {} into tube {}", i + 1, mv.source, mv.destination);
            }
        }
        Outcome::NoSolution => println!("No solution found."),
        Outcome::Aborted => println!("Search aborted before a solution was found."),
    }
}

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use hoop_stack_solver::engine::Puzzle;
use hoop_stack_solver::levels::{find_level, LEVELS};
use hoop_stack_solver::solver::{Solver, SolverConfig, DEFAULT_ITERATION_BUDGET};
use hoop_stack_solver::utils::puzzle_from_text;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Maximum number of search iterations
    #[clap(short, long, default_value_t = DEFAULT_ITERATION_BUDGET)]
    budget: usize,

    /// Stack capacity; inferred from the token counts when omitted
    #[clap(short, long)]
    max_size: Option<usize>,

    /// Print the raw search trace instead of the compressed solution
    #[clap(long)]
    no_compress: bool,

    /// Solve a built-in level, e.g. "Level 4"
    #[clap(short, long, conflicts_with = "puzzle_file")]
    level: Option<String>,

    /// List the built-in levels and exit
    #[clap(long)]
    list_levels: bool,

    /// Path to a puzzle file: one stack per line, top token first
    puzzle_file: Option<PathBuf>,
}

fn read_puzzle_file(path: &PathBuf, max_size: Option<usize>) -> anyhow::Result<Puzzle> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let puzzle = puzzle_from_text(max_size, &content)
        .with_context(|| format!("invalid puzzle in {}", path.display()))?;
    Ok(puzzle.with_name(path.display().to_string()))
}

fn load_puzzle(args: &Args) -> anyhow::Result<Puzzle> {
    if let Some(name) = &args.level {
        let level = find_level(name).ok_or_else(|| anyhow!("unknown level \"{}\"", name))?;
        return Ok(level.to_puzzle()?);
    }
    match &args.puzzle_file {
        Some(path) => read_puzzle_file(path, args.max_size),
        None => bail!("give either --level or a puzzle file (see --help)"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_levels {
        for level in LEVELS {
            println!("{:<14} capacity {}, {} stacks", level.name, level.max_size, level.rows.len());
        }
        return Ok(());
    }

    let puzzle = load_puzzle(&args)?;
    println!("Initial puzzle state:\n{}\n", puzzle);
    println!("Searching for a solution with a budget of {} iterations...\n", args.budget);

    let solver = Solver::new(SolverConfig {
        iteration_budget: args.budget,
        compress: !args.no_compress,
    });
    let solution = solver.solve(&puzzle).context("no solution")?;

    println!(
        "Solution found after {} iterations ({} backtracks):\n",
        solution.iterations, solution.backtracks
    );
    println!("Moves ({}, {} before compression):", solution.len(), solution.raw_moves.len());
    if solution.is_empty() {
        println!("  No moves needed.");
    } else {
        for (i, mv) in solution.moves.iter().enumerate() {
            println!("  Move {}: {}", i + 1, mv);
        }
    }

    let final_state = solution
        .replay(&puzzle)
        .context("the solution does not replay")?;
    println!("\nFinal puzzle state:\n{}\n", final_state);
    Ok(())
}

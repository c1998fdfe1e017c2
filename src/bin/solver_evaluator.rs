use clap::Parser;
use hoop_stack_solver::engine::Puzzle;
use hoop_stack_solver::error::SolveFailure;
use hoop_stack_solver::solver::{Solver, SolverConfig, DEFAULT_ITERATION_BUDGET};
use log::warn;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of random puzzles to solve
    #[clap(short = 'n', long, default_value_t = 20)]
    count: usize,

    /// Seed of the first puzzle; the others use the following seeds
    #[clap(short, long, default_value_t = 0)]
    start_seed: u64,

    /// Number of colors per puzzle
    #[clap(short, long, default_value_t = 4)]
    colors: usize,

    /// Stack capacity
    #[clap(short, long, default_value_t = 4)]
    max_size: usize,

    /// Number of empty stacks
    #[clap(short, long, default_value_t = 2)]
    empty: usize,

    /// Maximum number of search iterations per puzzle
    #[clap(short, long, default_value_t = DEFAULT_ITERATION_BUDGET)]
    budget: usize,
}

#[derive(Default)]
struct Totals {
    solved: usize,
    exhausted: usize,
    broken: usize,
    iterations: usize,
    backtracks: usize,
    raw_moves: usize,
    moves: usize,
}

fn average(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let solver = Solver::new(SolverConfig {
        iteration_budget: args.budget,
        compress: true,
    });
    let mut totals = Totals::default();

    println!(
        "Starting solver evaluation for {} puzzles ({} colors, capacity {}, {} empty)...",
        args.count, args.colors, args.max_size, args.empty
    );

    for idx in 0..args.count {
        let seed = args.start_seed + idx as u64;
        let puzzle = Puzzle::new_random_with_seed(args.colors, args.max_size, args.empty, seed)?;

        match solver.solve(&puzzle) {
            Ok(solution) => {
                let replayed = solution.replay(&puzzle);
                if !matches!(&replayed, Ok(end) if end.is_solved()) {
                    warn!("seed {}: solution does not solve the puzzle ({:?})", seed, replayed.err());
                    totals.broken += 1;
                    continue;
                }
                println!(
                    "  Seed {:<6} solved: {:>3} moves ({:>3} raw), {:>5} iterations, {:>4} backtracks",
                    seed,
                    solution.len(),
                    solution.raw_moves.len(),
                    solution.iterations,
                    solution.backtracks
                );
                totals.solved += 1;
                totals.iterations += solution.iterations;
                totals.backtracks += solution.backtracks;
                totals.raw_moves += solution.raw_moves.len();
                totals.moves += solution.len();
            }
            Err(SolveFailure::ExhaustedBudget { iterations }) => {
                println!("  Seed {:<6} gave up after {} iterations", seed, iterations);
                totals.exhausted += 1;
            }
            Err(err) => {
                warn!("seed {}: {}", seed, err);
                totals.broken += 1;
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Puzzles evaluated: {}", args.count);
    println!(
        "Solved: {} ({:.1}%), gave up: {}, errors: {}",
        totals.solved,
        100.0 * average(totals.solved, args.count),
        totals.exhausted,
        totals.broken
    );
    println!("\n--- Averages over solved puzzles ---");
    println!("Iterations: {:.2}", average(totals.iterations, totals.solved));
    println!("Backtracks: {:.2}", average(totals.backtracks, totals.solved));
    println!("Raw moves: {:.2}", average(totals.raw_moves, totals.solved));
    println!("Compressed moves: {:.2}", average(totals.moves, totals.solved));
    Ok(())
}

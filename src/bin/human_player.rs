use anyhow::anyhow;
use clap::Parser;
use hoop_stack_solver::engine::{Game, Move, Puzzle};
use hoop_stack_solver::levels::find_level;
use hoop_stack_solver::solver::Solver;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Play a built-in level instead of a random puzzle
    #[clap(short, long)]
    level: Option<String>,

    /// Seed for the random puzzle
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of colors in the random puzzle
    #[clap(short, long, default_value_t = 4)]
    colors: usize,

    /// Stack capacity of the random puzzle
    #[clap(short, long, default_value_t = 4)]
    max_size: usize,

    /// Number of empty stacks in the random puzzle
    #[clap(short, long, default_value_t = 2)]
    empty: usize,
}

fn load_puzzle(args: &Args) -> anyhow::Result<Puzzle> {
    match &args.level {
        Some(name) => {
            let level = find_level(name).ok_or_else(|| anyhow!("unknown level \"{}\"", name))?;
            Ok(level.to_puzzle()?)
        }
        None => Ok(Puzzle::new_random_with_seed(
            args.colors,
            args.max_size,
            args.empty,
            args.seed,
        )?),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut game = Game::new(load_puzzle(&args)?);
    println!("Welcome to Hoop Stack!");

    loop {
        println!("---------------------");
        println!("Steps: {}", game.steps());
        println!("{}", game.puzzle());

        if game.is_solved() {
            println!();
            println!("---------------------");
            println!("🎉 SOLVED! 🎉");
            println!("Total Steps: {}", game.steps());
            println!("---------------------");
            break;
        }

        print!("Enter your move (source dest), 'u' to undo, 'h' for a hint, 'r' to reset, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                if game.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Cannot undo further (no moves made).");
                }
            }
            "r" => {
                game.reset();
                println!("Puzzle reset.");
            }
            "h" => match Solver::default().solve(game.puzzle()) {
                Ok(solution) => match solution.moves.first() {
                    Some(mv) => println!("Hint: try {} ({} moves to go).", mv, solution.len()),
                    None => println!("Nothing left to do."),
                },
                Err(err) => println!("No hint available: {}", err),
            },
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                if parts.len() != 2 {
                    println!("Invalid input format. Use 'source dest', 'u', 'h', 'r' or 'q'.");
                    continue;
                }
                match (parts[0].parse::<usize>(), parts[1].parse::<usize>()) {
                    (Ok(source), Ok(dest)) => match game.process_move(Move::new(source, dest)) {
                        Ok(()) => println!("Move processed."),
                        Err(err) => println!("Invalid move: {}", err),
                    },
                    _ => println!("Invalid input: Please enter two stack numbers (e.g., '0 2')."),
                }
            }
        }
    }
    Ok(())
}

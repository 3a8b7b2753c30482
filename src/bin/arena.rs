//! Arena CLI: run seeded random playouts from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 100
//!   cargo run --release --bin arena -- --games 20 --config cathedral.toml --seed 7 --dump-worst worst.json

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cathedral_engine::engine::arena::run_arena;
use cathedral_engine::games::cathedral::config::{load_config, load_default_config};
use cathedral_engine::games::cathedral::types::Seat;

#[derive(Parser)]
#[command(name = "arena", about = "Run random Cathedral playouts to stress the rules engine")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed of the first game; game i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Path to a match config TOML (default: auto-discover, then classic)
    #[arg(long, env = "CATHEDRAL_CONFIG")]
    config: Option<PathBuf>,

    /// Write the move list of the game with the largest total penalty as JSON
    #[arg(long)]
    dump_worst: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let match_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };
    let session_config = match_config.session_config()?;
    let catalog = match_config.catalog();

    eprintln!(
        "Arena: {} games, seed={}, board={}x{}",
        cli.games, cli.seed, session_config.board_size.width, session_config.board_size.height
    );

    let result = run_arena(&session_config, &catalog, cli.games, cli.seed)?;
    println!("{}", result.summary());

    if let Some(path) = &cli.dump_worst {
        let worst = result
            .games
            .iter()
            .max_by_key(|g| g.scores[Seat::First] + g.scores[Seat::Second]);
        if let Some(game) = worst {
            std::fs::write(path, serde_json::to_string_pretty(&game.moves)?)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            eprintln!("wrote moves of seed {} to {}", game.seed, path.display());
        }
    }

    Ok(())
}

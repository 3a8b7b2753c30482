use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cathedral_engine::engine::models::{MoveRecord, MoveReport};
use cathedral_engine::engine::simulator::replay;
use cathedral_engine::games::cathedral::config::{load_config, load_default_config};
use cathedral_engine::games::cathedral::session::{GameSession, SessionSnapshot};

#[derive(Parser)]
#[command(name = "cathedral-engine", about = "Replay a scripted Cathedral match")]
struct Cli {
    /// Match config TOML (default: auto-discover, then classic)
    #[arg(long, env = "CATHEDRAL_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of move records to apply
    #[arg(long)]
    moves: PathBuf,

    /// Snapshot JSON to restore before replaying
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the final snapshot here instead of printing it
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the board after the last move
    #[arg(long)]
    show_board: bool,
}

#[derive(Serialize)]
struct Transcript<'a> {
    reports: &'a [MoveReport],
    snapshot: Option<&'a SessionSnapshot>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let match_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };
    let catalog = match_config.catalog();
    let mut session = GameSession::new(match_config.session_config()?)?;

    if let Some(path) = &cli.resume {
        let snapshot: SessionSnapshot = read_json(path)?;
        session.load_snapshot(&snapshot);
        tracing::info!(path = %path.display(), round = snapshot.round, "resumed from snapshot");
    }

    let moves: Vec<MoveRecord> = read_json(&cli.moves)?;
    let reports = replay(&mut session, &catalog, &moves);
    let applied = reports.iter().filter(|r| r.result.is_applied()).count();
    tracing::info!(
        moves = moves.len(),
        applied,
        game_over = session.is_game_over(),
        "replay finished"
    );

    let snapshot = session.build_snapshot();
    let transcript = match &cli.output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            Transcript {
                reports: &reports,
                snapshot: None,
            }
        }
        None => Transcript {
            reports: &reports,
            snapshot: Some(&snapshot),
        },
    };
    println!("{}", serde_json::to_string_pretty(&transcript)?);

    if cli.show_board {
        eprint!("{}", session.board().render());
    }

    Ok(())
}

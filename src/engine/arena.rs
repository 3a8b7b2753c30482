//! Random playout runner.
//!
//! Plays complete matches where every move is drawn uniformly from the
//! legal placements (or a round finish when none exist). This is a stress
//! harness for the rules, not a player: it has no notion of good moves.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::models::*;
use crate::engine::simulator::apply_move;
use crate::games::cathedral::pieces::{PieceCatalog, Rotation};
use crate::games::cathedral::session::{GameSession, SessionConfig, SessionError};
use crate::games::cathedral::types::{PerSeat, Phase, Seat};

/// Upper bound on moves per match; a two-round match needs far fewer.
const MAX_MOVES: usize = 1000;

/// Every legal placement for whoever is due to move.
pub fn legal_placements(session: &GameSession, catalog: &PieceCatalog) -> Vec<MoveRecord> {
    let size = session.board().size();
    let mut moves = Vec::new();

    for definition in catalog.iter() {
        let allowed = match session.phase() {
            Phase::CathedralPlacement => definition.type_id == session.neutral_piece(),
            Phase::PlayerTurn => {
                session.remaining(session.current_player(), &definition.type_id) > 0
            }
        };
        if !allowed {
            continue;
        }
        for origin in size.cells() {
            for rotation in Rotation::ALL {
                if session.validate_placement(definition, origin, rotation).is_ok() {
                    moves.push(MoveRecord::Place {
                        piece: definition.type_id.clone(),
                        x: origin.x,
                        y: origin.y,
                        rotation,
                    });
                }
            }
        }
    }

    moves
}

/// Result of one random match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutSummary {
    pub seed: u64,
    pub scores: PerSeat<u32>,
    pub placements: usize,
    pub captures: usize,
    pub neutral_removals: usize,
    /// The full move list, replayable through the simulator.
    pub moves: Vec<MoveRecord>,
}

/// Play one match to the end with moves drawn from a seeded RNG.
pub fn play_random_match(
    config: &SessionConfig,
    catalog: &PieceCatalog,
    seed: u64,
) -> Result<PlayoutSummary, SessionError> {
    let mut session = GameSession::new(config.clone())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summary = PlayoutSummary {
        seed,
        scores: PerSeat::default(),
        placements: 0,
        captures: 0,
        neutral_removals: 0,
        moves: Vec::new(),
    };

    while !session.is_game_over() && summary.moves.len() < MAX_MOVES {
        // A cathedral that fits nowhere would stall the match.
        let phase = session.phase();
        let candidates = legal_placements(&session, catalog);
        if phase == Phase::CathedralPlacement && candidates.is_empty() {
            tracing::warn!(seed, "neutral piece cannot be placed, abandoning playout");
            break;
        }

        let record = candidates
            .choose(&mut rng)
            .cloned()
            .unwrap_or(MoveRecord::FinishRound);

        if let MoveResult::Placed(outcome) = apply_move(&mut session, catalog, &record) {
            summary.placements += 1;
            summary.captures += outcome.captured.len();
            summary.neutral_removals += outcome.removed_neutrals.len();
        }
        summary.moves.push(record);
    }

    summary.scores = PerSeat::from_fn(|seat| session.score(seat));
    Ok(summary)
}

/// Aggregated results from a batch of playouts.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub games: Vec<PlayoutSummary>,
    pub duration_ms: f64,
}

impl ArenaResult {
    pub fn num_games(&self) -> usize {
        self.games.len()
    }

    pub fn avg_score(&self, seat: Seat) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        self.games.iter().map(|g| g.scores[seat] as f64).sum::<f64>() / self.games.len() as f64
    }

    /// Matches where `seat` ended with the strictly smaller penalty.
    pub fn lower_penalty_count(&self, seat: Seat) -> usize {
        self.games
            .iter()
            .filter(|g| g.scores[seat] < g.scores[seat.other()])
            .count()
    }

    pub fn summary(&self) -> String {
        let n = self.num_games();
        let mut lines = vec![format!("Playout Results ({n} games)")];
        lines.push("=".repeat(60));
        for seat in Seat::BOTH {
            lines.push(format!(
                "  {:>4}: avg penalty {:5.1}  lower penalty in {:3} games",
                seat.to_string(),
                self.avg_score(seat),
                self.lower_penalty_count(seat),
            ));
        }
        let ties =
            n - self.lower_penalty_count(Seat::First) - self.lower_penalty_count(Seat::Second);
        lines.push(format!("  {:>4}: {}", "ties", ties));
        let placements: usize = self.games.iter().map(|g| g.placements).sum();
        let captures: usize = self.games.iter().map(|g| g.captures).sum();
        let removals: usize = self.games.iter().map(|g| g.neutral_removals).sum();
        lines.push(format!(
            "  placements={placements}  captures={captures}  neutral removals={removals}"
        ));
        lines.push(format!("  Total: {:.1}s", self.duration_ms / 1000.0));
        lines.join("\n")
    }
}

/// Run `num_games` playouts in parallel with seeds `base_seed..base_seed + num_games`.
pub fn run_arena(
    config: &SessionConfig,
    catalog: &PieceCatalog,
    num_games: usize,
    base_seed: u64,
) -> Result<ArenaResult, SessionError> {
    // Surface construction errors once instead of per game.
    GameSession::new(config.clone())?;

    let start = Instant::now();
    let games = (0..num_games)
        .into_par_iter()
        .map(|i| play_random_match(config, catalog, base_seed + i as u64))
        .collect::<Result<Vec<_>, _>>()?;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(games = games.len(), duration_ms, "arena finished");
    Ok(ArenaResult { games, duration_ms })
}

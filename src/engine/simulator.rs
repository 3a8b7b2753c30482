//! Synchronous driver: applies move records to a session.
//! Used by the replay CLI and the arena.

use crate::engine::models::*;
use crate::games::cathedral::pieces::PieceCatalog;
use crate::games::cathedral::session::GameSession;
use crate::games::cathedral::types::{Cell, Phase};

/// Apply one move record, resolving piece names through `catalog`.
pub fn apply_move(
    session: &mut GameSession,
    catalog: &PieceCatalog,
    record: &MoveRecord,
) -> MoveResult {
    match record {
        MoveRecord::Place { piece, x, y, rotation } => {
            let Some(definition) = catalog.get(piece) else {
                return MoveResult::UnknownPiece { piece: piece.clone() };
            };
            let origin = Cell::new(*x, *y);
            match session.try_place_piece(definition, origin, *rotation) {
                Ok(outcome) => MoveResult::Placed(outcome),
                Err(reason) => MoveResult::Rejected { reason },
            }
        }
        MoveRecord::FinishRound => {
            if session.phase() != Phase::PlayerTurn || session.is_game_over() {
                return MoveResult::Ignored;
            }
            session.finish_round_for_current_player();
            MoveResult::Finished
        }
    }
}

/// Apply every record in order. Rejected moves are reported and skipped.
pub fn replay(
    session: &mut GameSession,
    catalog: &PieceCatalog,
    moves: &[MoveRecord],
) -> Vec<MoveReport> {
    moves
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let round = session.round();
            let phase = session.phase();
            let player = session.current_player();
            let result = apply_move(session, catalog, record);
            if let MoveResult::Rejected { reason } = &result {
                tracing::debug!(index, %player, %reason, "move rejected");
            }
            MoveReport {
                index,
                round,
                phase,
                player,
                record: record.clone(),
                result,
            }
        })
        .collect()
}

//! Serializable move records and per-move reports for scripted matches.

use serde::{Deserialize, Serialize};

use crate::games::cathedral::pieces::Rotation;
use crate::games::cathedral::session::PlacementOutcome;
use crate::games::cathedral::types::{Phase, PlacementFailure, Seat};

/// One command from a match script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum MoveRecord {
    Place {
        piece: String,
        x: i32,
        y: i32,
        #[serde(default)]
        rotation: Rotation,
    },
    FinishRound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveResult {
    Placed(PlacementOutcome),
    Rejected { reason: PlacementFailure },
    /// The script named a piece type the catalog does not know.
    UnknownPiece { piece: String },
    Finished,
    /// `finish_round` outside a player turn or after the game ended.
    Ignored,
}

impl MoveResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveResult::Placed(_) | MoveResult::Finished)
    }
}

/// What happened to one scripted move, with the context it was played in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub index: usize,
    pub round: u8,
    pub phase: Phase,
    pub player: Seat,
    pub record: MoveRecord,
    pub result: MoveResult,
}

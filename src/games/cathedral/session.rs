//! GameSession: turn order, rounds, scoring and state transfer for a two-round match.
//!
//! Each round opens with the neutral cathedral, then players alternate until
//! both have finished. A player who has finished is skipped, so the other
//! keeps the turn. Territory is recomputed after every player placement.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{validate_placement, Board};
use super::inventory::PlayerInventory;
use super::pieces::{PieceDefinition, Rotation};
use super::scoring::remaining_area;
use super::territory::recompute_territory;
use super::types::*;

pub const ROUNDS_PER_MATCH: u8 = 2;

/// Everything needed to construct a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub board_size: BoardSize,
    pub neutral_piece: String,
    pub inventories: PerSeat<BTreeMap<String, u32>>,
    /// Cell count per piece type, used for end-of-round penalties.
    pub piece_sizes: BTreeMap<String, u32>,
    #[serde(default = "default_starting_player")]
    pub starting_player: Seat,
}

fn default_starting_player() -> Seat {
    Seat::First
}

/// Contract violations detected while building a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    ZeroSizedBoard,
    WrongPlayerCount(usize),
    InvalidStartingPlayer(usize),
    UnknownPieceSize(String),
    MissingNeutralSize(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ZeroSizedBoard => write!(f, "board must have at least one cell"),
            SessionError::WrongPlayerCount(n) => write!(f, "expected exactly 2 players, got {n}"),
            SessionError::InvalidStartingPlayer(i) => {
                write!(f, "invalid starting player index: {i}")
            }
            SessionError::UnknownPieceSize(id) => write!(f, "piece type {id} has no size entry"),
            SessionError::MissingNeutralSize(id) => {
                write!(f, "neutral piece type {id} has no size entry")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// A successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub instance_id: u32,
    pub owner: Owner,
    pub is_neutral: bool,
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub captured: Vec<PlacedPiece>,
    #[serde(default)]
    pub removed_neutrals: Vec<PlacedPiece>,
}

/// Complete session state. Restoring one trusts it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_player: Seat,
    pub phase: Phase,
    pub round: u8,
    pub round_revision: u32,
    pub game_over: bool,
    pub scores: PerSeat<u32>,
    pub finished: PerSeat<bool>,
    pub inventories: PerSeat<PlayerInventory>,
    pub pieces: Vec<PlacedPiece>,
    pub claimed: PerSeat<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    neutral_piece: String,
    initial_inventories: PerSeat<PlayerInventory>,
    piece_sizes: BTreeMap<String, u32>,
    first_starter: Seat,

    board: Board,
    pieces: BTreeMap<u32, PlacedPiece>,
    inventories: PerSeat<PlayerInventory>,
    claimed: PerSeat<BTreeSet<Cell>>,
    finished: PerSeat<bool>,
    scores: PerSeat<u32>,
    phase: Phase,
    current_player: Seat,
    round: u8,
    round_revision: u32,
    last_instance_id: u32,
    game_over: bool,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let SessionConfig {
            board_size,
            neutral_piece,
            inventories,
            piece_sizes,
            starting_player,
        } = config;

        if board_size.cell_count() == 0 {
            return Err(SessionError::ZeroSizedBoard);
        }
        if !piece_sizes.contains_key(&neutral_piece) {
            return Err(SessionError::MissingNeutralSize(neutral_piece));
        }
        for (_, inventory) in inventories.iter() {
            if let Some(id) = inventory.keys().find(|id| !piece_sizes.contains_key(*id)) {
                return Err(SessionError::UnknownPieceSize(id.clone()));
            }
        }

        let initial_inventories = inventories.map(|counts| PlayerInventory::new(counts.clone()));
        let mut session = Self {
            neutral_piece,
            inventories: initial_inventories.clone(),
            initial_inventories,
            piece_sizes,
            first_starter: starting_player,
            board: Board::new(board_size),
            pieces: BTreeMap::new(),
            claimed: PerSeat::default(),
            finished: PerSeat::default(),
            scores: PerSeat::default(),
            phase: Phase::CathedralPlacement,
            current_player: starting_player,
            round: 1,
            round_revision: 0,
            last_instance_id: 0,
            game_over: false,
        };
        session.start_round(starting_player);
        Ok(session)
    }

    // --- Queries ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player(&self) -> Seat {
        self.current_player
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn round_revision(&self) -> u32 {
        self.round_revision
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self, seat: Seat) -> u32 {
        self.scores[seat]
    }

    pub fn remaining(&self, seat: Seat, type_id: &str) -> u32 {
        self.inventories[seat].count(type_id)
    }

    pub fn inventory(&self, seat: Seat) -> &PlayerInventory {
        &self.inventories[seat]
    }

    pub fn claimed_territory(&self, seat: Seat) -> &BTreeSet<Cell> {
        &self.claimed[seat]
    }

    pub fn finished(&self, seat: Seat) -> bool {
        self.finished[seat]
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn placed_pieces(&self) -> impl Iterator<Item = &PlacedPiece> {
        self.pieces.values()
    }

    pub fn neutral_piece(&self) -> &str {
        &self.neutral_piece
    }

    // --- Commands ---

    /// Check a placement for the current phase and player without mutating anything.
    /// On success returns the owner the piece would have and its absolute cells.
    pub fn validate_placement(
        &self,
        piece: &PieceDefinition,
        origin: Cell,
        rotation: Rotation,
    ) -> Result<(Owner, Vec<Cell>), PlacementFailure> {
        if self.game_over {
            return Err(PlacementFailure::FinishedRound);
        }

        let owner = match self.phase {
            Phase::CathedralPlacement => {
                if piece.type_id != self.neutral_piece {
                    return Err(PlacementFailure::InvalidPieceForPhase);
                }
                Owner::Neutral
            }
            Phase::PlayerTurn => {
                let seat = self.current_player;
                if self.finished[seat] {
                    return Err(PlacementFailure::FinishedRound);
                }
                if !self.inventories[seat].has_piece(&piece.type_id) {
                    return Err(PlacementFailure::NoRemainingPieces);
                }
                Owner::Seat(seat)
            }
        };

        let cells = validate_placement(&self.board, piece, origin, rotation)?;

        if let Owner::Seat(seat) = owner {
            let opponent = &self.claimed[seat.other()];
            if cells.iter().any(|c| opponent.contains(c)) {
                return Err(PlacementFailure::InOpponentTerritory);
            }
        }

        Ok((owner, cells))
    }

    /// Place a piece for whoever is due to move. Nothing changes on failure.
    pub fn try_place_piece(
        &mut self,
        piece: &PieceDefinition,
        origin: Cell,
        rotation: Rotation,
    ) -> Result<PlacementOutcome, PlacementFailure> {
        let (owner, cells) = self.validate_placement(piece, origin, rotation)?;

        self.last_instance_id += 1;
        let placed = PlacedPiece {
            instance_id: self.last_instance_id,
            owner,
            piece_type: piece.type_id.clone(),
            cells: cells.clone(),
        };
        for &cell in &placed.cells {
            self.board.set_occupant(cell, placed.occupant());
        }
        self.pieces.insert(placed.instance_id, placed);

        tracing::debug!(
            round = self.round,
            %owner,
            piece_type = %piece.type_id,
            instance_id = self.last_instance_id,
            x = origin.x,
            y = origin.y,
            rotation = rotation.degrees(),
            "piece placed"
        );

        let mut outcome = PlacementOutcome {
            instance_id: self.last_instance_id,
            owner,
            is_neutral: owner.is_neutral(),
            cells,
            captured: Vec::new(),
            removed_neutrals: Vec::new(),
        };

        match owner {
            Owner::Neutral => {
                self.phase = Phase::PlayerTurn;
                self.advance_turn();
            }
            Owner::Seat(seat) => {
                let consumed = self.inventories[seat].try_consume(&piece.type_id);
                debug_assert!(consumed, "validated placement had no {} left", piece.type_id);
                let resolution = recompute_territory(
                    &mut self.board,
                    &mut self.pieces,
                    &mut self.claimed,
                    owner,
                );
                for captured in &resolution.captured {
                    if let Owner::Seat(victim) = captured.owner {
                        self.inventories[victim].return_piece(&captured.piece_type);
                    }
                }
                outcome.captured = resolution.captured;
                outcome.removed_neutrals = resolution.removed_neutrals;

                if !self.inventories[seat].has_any_pieces() {
                    self.finished[seat] = true;
                }
                self.advance_turn();
            }
        }

        Ok(outcome)
    }

    /// Declare that the current player will place nothing more this round.
    pub fn finish_round_for_current_player(&mut self) {
        if self.phase != Phase::PlayerTurn || self.game_over {
            return;
        }
        tracing::debug!(round = self.round, player = %self.current_player, "player finished round");
        self.finished[self.current_player] = true;
        self.advance_turn();
    }

    fn advance_turn(&mut self) {
        if self.phase != Phase::PlayerTurn {
            return;
        }
        if self.finished[Seat::First] && self.finished[Seat::Second] {
            self.end_round();
            return;
        }
        let other = self.current_player.other();
        if !self.finished[other] {
            self.current_player = other;
        }
    }

    fn end_round(&mut self) {
        for seat in Seat::BOTH {
            self.scores[seat] += remaining_area(&self.inventories[seat], &self.piece_sizes);
        }
        tracing::info!(
            round = self.round,
            p0 = self.scores[Seat::First],
            p1 = self.scores[Seat::Second],
            "round ended"
        );

        if self.round >= ROUNDS_PER_MATCH {
            self.game_over = true;
            tracing::info!(
                p0 = self.scores[Seat::First],
                p1 = self.scores[Seat::Second],
                "game over"
            );
            return;
        }

        self.round += 1;
        self.start_round(self.starter_for_round(self.round));
    }

    /// Round 1 goes to the configured starter, round 2 to the other player.
    fn starter_for_round(&self, round: u8) -> Seat {
        if round % 2 == 1 {
            self.first_starter
        } else {
            self.first_starter.other()
        }
    }

    fn start_round(&mut self, starting_player: Seat) {
        self.board.clear_all();
        self.pieces.clear();
        self.last_instance_id = 0;
        self.claimed = PerSeat::default();
        self.finished = PerSeat::default();
        self.inventories = self.initial_inventories.clone();
        // The opposite seat sets the cathedral; placing it passes the turn
        // to `starting_player`, who makes the first building move.
        self.current_player = starting_player.other();
        self.phase = Phase::CathedralPlacement;
        self.round_revision += 1;
        tracing::info!(round = self.round, starting_player = %starting_player, "round started");
    }

    // --- State transfer ---

    pub fn build_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_player: self.current_player,
            phase: self.phase,
            round: self.round,
            round_revision: self.round_revision,
            game_over: self.game_over,
            scores: self.scores.clone(),
            finished: self.finished.clone(),
            inventories: self.inventories.clone(),
            pieces: self.pieces.values().cloned().collect(),
            claimed: self.claimed.map(|cells| cells.iter().copied().collect()),
        }
    }

    /// Replace all state from a snapshot without validating it or recomputing territory.
    pub fn load_snapshot(&mut self, snapshot: &SessionSnapshot) {
        self.board.clear_all();
        self.pieces.clear();
        for piece in &snapshot.pieces {
            for &cell in &piece.cells {
                self.board.set_occupant(cell, piece.occupant());
            }
            self.pieces.insert(piece.instance_id, piece.clone());
        }
        self.last_instance_id = self.pieces.keys().next_back().copied().unwrap_or(0);

        self.current_player = snapshot.current_player;
        self.phase = snapshot.phase;
        self.round = snapshot.round;
        self.round_revision = snapshot.round_revision;
        self.game_over = snapshot.game_over;
        self.scores = snapshot.scores.clone();
        self.finished = snapshot.finished.clone();
        self.inventories = snapshot.inventories.clone();
        self.claimed = snapshot.claimed.map(|cells| cells.iter().copied().collect());
    }
}

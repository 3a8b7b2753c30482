//! Reversible board edits for previews.
//!
//! Sessions never use these; a presentation layer can stamp a ghost piece
//! onto a scratch copy of the board and take it off again.

use super::board::Board;
use super::types::{Cell, Occupant};

pub trait BoardCommand {
    fn apply(&mut self, board: &mut Board);
    fn undo(&mut self, board: &mut Board);
}

/// Writes one occupant over a set of cells, remembering what was there.
#[derive(Debug, Clone)]
pub struct PlacePieceCommand {
    cells: Vec<Cell>,
    occupant: Occupant,
    previous: Option<Vec<Option<Occupant>>>,
}

impl PlacePieceCommand {
    pub fn new(cells: Vec<Cell>, occupant: Occupant) -> Self {
        Self {
            cells,
            occupant,
            previous: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.previous.is_some()
    }
}

impl BoardCommand for PlacePieceCommand {
    /// No-op if already applied.
    fn apply(&mut self, board: &mut Board) {
        if self.previous.is_some() {
            return;
        }
        let previous = self
            .cells
            .iter()
            .map(|&cell| board.set_occupant(cell, self.occupant.clone()))
            .collect();
        self.previous = Some(previous);
    }

    /// No-op if not applied.
    fn undo(&mut self, board: &mut Board) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        for (&cell, old) in self.cells.iter().zip(previous) {
            match old {
                Some(occupant) => {
                    board.set_occupant(cell, occupant);
                }
                None => {
                    board.clear_occupant(cell);
                }
            }
        }
    }
}

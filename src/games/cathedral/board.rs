//! Occupancy board and placement validation.

use serde::{Deserialize, Serialize};

use super::pieces::{PieceDefinition, Rotation};
use super::types::{BoardSize, Cell, Occupant, Owner, PlacementFailure};

/// Row-major grid of optional occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: BoardSize,
    cells: Vec<Option<Occupant>>,
}

impl Board {
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        self.size.is_in_bounds(cell)
    }

    /// Occupant of a cell; `None` for empty and off-board cells.
    pub fn occupant_at(&self, cell: Cell) -> Option<&Occupant> {
        self.size.index_of(cell).and_then(|i| self.cells[i].as_ref())
    }

    pub fn owner_at(&self, cell: Cell) -> Option<Owner> {
        self.occupant_at(cell).map(|o| o.owner)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupant_at(cell).is_some()
    }

    /// Set a cell's occupant, returning the previous one. Off-board cells are ignored.
    pub fn set_occupant(&mut self, cell: Cell, occupant: Occupant) -> Option<Occupant> {
        let i = self.size.index_of(cell)?;
        self.cells[i].replace(occupant)
    }

    pub fn clear_occupant(&mut self, cell: Cell) -> Option<Occupant> {
        let i = self.size.index_of(cell)?;
        self.cells[i].take()
    }

    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Occupied cells with their occupants, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, &Occupant)> {
        self.size
            .cells()
            .zip(self.cells.iter())
            .filter_map(|(cell, occ)| occ.as_ref().map(|o| (cell, o)))
    }

    /// Render as text rows, top row first: `.` empty, `C` neutral, `0`/`1` players.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size.cell_count() + self.size.height as usize);
        for y in (0..self.size.height as i32).rev() {
            for x in 0..self.size.width as i32 {
                let ch = match self.owner_at(Cell::new(x, y)) {
                    None => '.',
                    Some(Owner::Neutral) => 'C',
                    Some(Owner::Seat(seat)) => char::from(b'0' + seat.index() as u8),
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

/// Check a placement against bounds and occupancy only.
///
/// Cells are checked in definition order and the first failing cell decides
/// the reason, so a cell off the board is never reported as an overlap.
/// Returns the full absolute footprint when every cell is free.
pub fn validate_placement(
    board: &Board,
    piece: &PieceDefinition,
    origin: Cell,
    rotation: Rotation,
) -> Result<Vec<Cell>, PlacementFailure> {
    let mut cells = Vec::with_capacity(piece.offsets.len());
    for cell in piece.placed_cells(origin, rotation) {
        let Some(cell) = cell else {
            return Err(PlacementFailure::OutOfBounds);
        };
        if !board.is_in_bounds(cell) {
            return Err(PlacementFailure::OutOfBounds);
        }
        if board.is_occupied(cell) {
            return Err(PlacementFailure::Overlap);
        }
        cells.push(cell);
    }
    Ok(cells)
}

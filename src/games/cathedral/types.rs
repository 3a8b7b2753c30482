//! Cathedral core types: cells, seats, occupants and placement failures.

use std::fmt;
use std::ops::{Add, Index, IndexMut};

use serde::{Deserialize, Serialize};

// --- Position ---

/// A grid cell. `(0, 0)` is the bottom-left corner of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translation that yields `None` instead of overflowing.
    pub fn checked_add(self, rhs: Cell) -> Option<Cell> {
        Some(Self::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// The 4 orthogonal neighbors, in E, W, N, S order.
    pub fn orthogonal(self) -> [Cell; 4] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x, self.y - 1),
        ]
    }

    /// All 8 surrounding cells.
    pub fn surrounding(self) -> [Cell; 8] {
        [
            Self::new(self.x + 1, self.y),
            Self::new(self.x + 1, self.y + 1),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y + 1),
            Self::new(self.x - 1, self.y),
            Self::new(self.x - 1, self.y - 1),
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y - 1),
        ]
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: u32,
    pub height: u32,
}

impl BoardSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_in_bounds(self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of an in-bounds cell.
    pub fn index_of(self, cell: Cell) -> Option<usize> {
        if self.is_in_bounds(cell) {
            Some(cell.y as usize * self.width as usize + cell.x as usize)
        } else {
            None
        }
    }

    /// Every cell on the board in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| Cell::new(x, y)))
    }
}

// --- Players ---

/// One of the two player seats. Serialized as the player index 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Seat> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            _ => None,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat.index() as u8
    }
}

impl TryFrom<u8> for Seat {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::from_index(value as usize).ok_or_else(|| format!("invalid player index: {value}"))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.index())
    }
}

/// Who a cell or piece belongs to: a player seat or the neutral cathedral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    Seat(Seat),
    Neutral,
}

impl Owner {
    pub fn seat(self) -> Option<Seat> {
        match self {
            Owner::Seat(seat) => Some(seat),
            Owner::Neutral => None,
        }
    }

    pub fn is_neutral(self) -> bool {
        matches!(self, Owner::Neutral)
    }
}

impl From<Seat> for Owner {
    fn from(seat: Seat) -> Owner {
        Owner::Seat(seat)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Seat(seat) => seat.fmt(f),
            Owner::Neutral => f.write_str("neutral"),
        }
    }
}

/// A value held once per seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSeat<T>(pub [T; 2]);

impl<T> PerSeat<T> {
    pub fn new(first: T, second: T) -> Self {
        Self([first, second])
    }

    pub fn from_fn(mut f: impl FnMut(Seat) -> T) -> Self {
        Self([f(Seat::First), f(Seat::Second)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::BOTH.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerSeat<U> {
        PerSeat([f(&self.0[0]), f(&self.0[1])])
    }
}

impl<T> Index<Seat> for PerSeat<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        &self.0[seat.index()]
    }
}

impl<T> IndexMut<Seat> for PerSeat<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.0[seat.index()]
    }
}

// --- Board-level types ---

/// What sits on an occupied cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub owner: Owner,
    pub instance_id: u32,
    pub piece_type: String,
}

/// A piece on the board. Lives until captured, removed with its region,
/// or cleared at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub instance_id: u32,
    pub owner: Owner,
    pub piece_type: String,
    pub cells: Vec<Cell>,
}

impl PlacedPiece {
    pub fn is_neutral(&self) -> bool {
        self.owner.is_neutral()
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            owner: self.owner,
            instance_id: self.instance_id,
            piece_type: self.piece_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CathedralPlacement,
    PlayerTurn,
}

/// Why a placement was rejected. Every variant is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementFailure {
    OutOfBounds,
    Overlap,
    InvalidPieceForPhase,
    NoRemainingPieces,
    FinishedRound,
    InOpponentTerritory,
}

impl fmt::Display for PlacementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PlacementFailure::OutOfBounds => "piece extends outside the board",
            PlacementFailure::Overlap => "piece overlaps an occupied cell",
            PlacementFailure::InvalidPieceForPhase => "piece cannot be placed in this phase",
            PlacementFailure::NoRemainingPieces => "no copies of this piece remain",
            PlacementFailure::FinishedRound => "player has already finished the round",
            PlacementFailure::InOpponentTerritory => "piece covers opponent territory",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PlacementFailure {}

//! Piece geometry: shapes, quarter-turn rotations and the classic catalog.
//!
//! A piece is a list of local cell offsets. Rotation is a pure function of
//! the offsets; pieces are never reflected. The absolute footprint of a
//! placement is `origin + rotate(offset)` for each offset, in definition order.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::types::Cell;

/// Type id of the neutral piece in the classic catalog.
pub const CATHEDRAL: &str = "cathedral";

/// Quarter-turn rotation, serialized in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn from_quarter_turns(turns: u8) -> Self {
        Self::ALL[(turns % 4) as usize]
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Rotation equivalent to applying `self` then `other`.
    pub fn then(self, other: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// Rotate a local offset.
    pub fn apply(self, offset: Cell) -> Cell {
        let Cell { x, y } = offset;
        match self {
            Rotation::R0 => Cell::new(x, y),
            Rotation::R90 => Cell::new(y, -x),
            Rotation::R180 => Cell::new(-x, -y),
            Rotation::R270 => Cell::new(-y, x),
        }
    }

    /// Like `apply`, but `None` when negating a coordinate overflows.
    pub fn checked_apply(self, offset: Cell) -> Option<Cell> {
        let Cell { x, y } = offset;
        match self {
            Rotation::R0 => Some(Cell::new(x, y)),
            Rotation::R90 => Some(Cell::new(y, x.checked_neg()?)),
            Rotation::R180 => Some(Cell::new(x.checked_neg()?, y.checked_neg()?)),
            Rotation::R270 => Some(Cell::new(y.checked_neg()?, x)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            _ => Err(format!("invalid rotation: {degrees}")),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub type_id: String,
    pub offsets: Vec<Cell>,
}

impl PieceDefinition {
    pub fn new(type_id: impl Into<String>, offsets: &[(i32, i32)]) -> Self {
        Self {
            type_id: type_id.into(),
            offsets: offsets.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        }
    }

    /// Number of cells the piece covers; its penalty weight when unplaced.
    pub fn size(&self) -> u32 {
        self.offsets.len() as u32
    }

    pub fn rotated_offsets(&self, rotation: Rotation) -> Vec<Cell> {
        self.offsets.iter().map(|&o| rotation.apply(o)).collect()
    }

    /// Absolute cells for a placement, in definition order. A cell whose
    /// coordinates do not fit in `i32` comes out as `None`.
    pub fn placed_cells(
        &self,
        origin: Cell,
        rotation: Rotation,
    ) -> impl Iterator<Item = Option<Cell>> + '_ {
        self.offsets
            .iter()
            .map(move |&o| rotation.checked_apply(o).and_then(|r| origin.checked_add(r)))
    }
}

/// Piece shapes by type id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceCatalog {
    definitions: BTreeMap<String, PieceDefinition>,
}

impl PieceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: PieceDefinition) {
        self.definitions.insert(definition.type_id.clone(), definition);
    }

    pub fn get(&self, type_id: &str) -> Option<&PieceDefinition> {
        self.definitions.get(type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceDefinition> {
        self.definitions.values()
    }

    /// Size lookup for scoring.
    pub fn sizes(&self) -> BTreeMap<String, u32> {
        self.definitions
            .iter()
            .map(|(id, def)| (id.clone(), def.size()))
            .collect()
    }
}

/// Classic shapes with the number of copies each player holds.
const CLASSIC_PIECES: [(&str, u32, &[(i32, i32)]); 11] = [
    ("tavern", 2, &[(0, 0)]),
    ("stable", 2, &[(0, 0), (1, 0)]),
    ("inn", 2, &[(0, 0), (1, 0), (0, 1)]),
    ("bridge", 1, &[(0, 0), (1, 0), (2, 0)]),
    ("square", 1, &[(0, 0), (1, 0), (0, 1), (1, 1)]),
    ("manor", 1, &[(0, 0), (1, 0), (2, 0), (1, 1)]),
    ("abbey", 1, &[(0, 0), (1, 0), (1, 1), (2, 1)]),
    ("academy", 1, &[(1, 0), (0, 1), (1, 1), (1, 2), (2, 2)]),
    ("infirmary", 1, &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]),
    ("castle", 1, &[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]),
    ("tower", 1, &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]),
];

const CATHEDRAL_SHAPE: [(i32, i32); 6] = [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2), (1, 3)];

pub static CLASSIC_CATALOG: Lazy<PieceCatalog> = Lazy::new(|| {
    let mut catalog = PieceCatalog::new();
    catalog.insert(PieceDefinition::new(CATHEDRAL, &CATHEDRAL_SHAPE));
    for (id, _, shape) in CLASSIC_PIECES {
        catalog.insert(PieceDefinition::new(id, shape));
    }
    catalog
});

/// Starting inventory of one player in the classic game.
pub fn classic_inventory() -> BTreeMap<String, u32> {
    CLASSIC_PIECES
        .iter()
        .map(|&(id, count, _)| (id.to_string(), count))
        .collect()
}

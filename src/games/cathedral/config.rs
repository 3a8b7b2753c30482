//! Match configuration loaded from TOML.
//!
//! ```toml
//! neutral_piece = "cathedral"
//! starting_player = 0
//!
//! [board]
//! width = 10
//! height = 10
//!
//! [pieces]
//! cathedral = [[1, 0], [0, 1], [1, 1], [2, 1], [1, 2], [1, 3]]
//! tavern = [[0, 0]]
//!
//! [inventory]
//! tavern = 2
//! ```
//!
//! `inventory` is shared by both players; an `inventories` array of exactly
//! two tables gives each player their own.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::pieces::{classic_inventory, PieceCatalog, PieceDefinition, CATHEDRAL, CLASSIC_CATALOG};
use super::session::{SessionConfig, SessionError};
use super::types::{BoardSize, Cell, PerSeat, Seat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub board: BoardSize,
    pub neutral_piece: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_player: Option<usize>,
    pub pieces: BTreeMap<String, Vec<[i32; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventories: Option<Vec<BTreeMap<String, u32>>>,
}

impl MatchConfig {
    /// The standard 10x10 match with the classic pieces.
    pub fn classic() -> Self {
        let pieces = CLASSIC_CATALOG
            .iter()
            .map(|def| {
                let cells = def.offsets.iter().map(|c| [c.x, c.y]).collect();
                (def.type_id.clone(), cells)
            })
            .collect();
        Self {
            board: BoardSize::new(10, 10),
            neutral_piece: CATHEDRAL.into(),
            starting_player: None,
            pieces,
            inventory: Some(classic_inventory()),
            inventories: None,
        }
    }

    pub fn catalog(&self) -> PieceCatalog {
        let mut catalog = PieceCatalog::new();
        for (id, cells) in &self.pieces {
            catalog.insert(PieceDefinition {
                type_id: id.clone(),
                offsets: cells.iter().map(|&[x, y]| Cell::new(x, y)).collect(),
            });
        }
        catalog
    }

    pub fn session_config(&self) -> Result<SessionConfig, SessionError> {
        let inventories = match (&self.inventories, &self.inventory) {
            (Some(list), _) => match list.as_slice() {
                [first, second] => PerSeat::new(first.clone(), second.clone()),
                other => return Err(SessionError::WrongPlayerCount(other.len())),
            },
            (None, Some(shared)) => PerSeat::new(shared.clone(), shared.clone()),
            (None, None) => return Err(SessionError::WrongPlayerCount(0)),
        };

        let starting_player = match self.starting_player {
            None => Seat::First,
            Some(i) => Seat::from_index(i).ok_or(SessionError::InvalidStartingPlayer(i))?,
        };

        Ok(SessionConfig {
            board_size: self.board,
            neutral_piece: self.neutral_piece.clone(),
            inventories,
            piece_sizes: self.catalog().sizes(),
            starting_player,
        })
    }
}

/// Load a match configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MatchConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try well-known paths, falling back to the classic match.
pub fn load_default_config() -> MatchConfig {
    let candidates = [
        "cathedral.toml",
        "../cathedral.toml",
        "/etc/cathedral/cathedral.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(
                        path = %p.display(),
                        pieces = config.pieces.len(),
                        "loaded match config"
                    );
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load match config");
                }
            }
        }
    }
    tracing::info!("no cathedral.toml found, using classic match");
    MatchConfig::classic()
}

//! Per-player supply of unplaced pieces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Remaining copies of each piece type. Type ids are not checked against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerInventory {
    counts: BTreeMap<String, u32>,
}

impl PlayerInventory {
    pub fn new(counts: BTreeMap<String, u32>) -> Self {
        Self { counts }
    }

    pub fn count(&self, type_id: &str) -> u32 {
        self.counts.get(type_id).copied().unwrap_or(0)
    }

    pub fn has_piece(&self, type_id: &str) -> bool {
        self.count(type_id) > 0
    }

    /// Take one copy. Returns false, leaving the inventory untouched, when none remain.
    pub fn try_consume(&mut self, type_id: &str) -> bool {
        match self.counts.get_mut(type_id) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn return_piece(&mut self, type_id: &str) {
        *self.counts.entry(type_id.to_string()).or_insert(0) += 1;
    }

    pub fn has_any_pieces(&self) -> bool {
        self.counts.values().any(|&n| n > 0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(id, &n)| (id.as_str(), n))
    }

    pub fn as_map(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }
}

//! End-of-round scoring: the area of every unplaced piece counts against its owner.

use std::collections::BTreeMap;

use super::inventory::PlayerInventory;

/// Total cell area still sitting in an inventory.
///
/// Panics if the inventory holds a type missing from `sizes`; sessions
/// check this at construction, so reaching it is a programming error.
pub fn remaining_area(inventory: &PlayerInventory, sizes: &BTreeMap<String, u32>) -> u32 {
    inventory
        .counts()
        .filter(|&(_, count)| count > 0)
        .map(|(id, count)| {
            let size = sizes
                .get(id)
                .copied()
                .unwrap_or_else(|| panic!("piece type {id} has no size entry"));
            size * count
        })
        .sum()
}

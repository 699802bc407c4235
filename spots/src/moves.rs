//! Old → new index correspondence after a batch of insertions or deletions.
//!
//! Both functions are `O(n·k)`; inputs are bounded by near-screen item counts.

use std::collections::{BTreeMap, BTreeSet};

/// Maps each surviving index at or after the first insertion to the slot it occupies once
/// `indexes` have been inserted.
pub fn calculate_move_for_inserted_indexes(
    indexes: &[usize],
    number_of_items: usize,
) -> BTreeMap<usize, usize> {
    let inserted: BTreeSet<usize> = indexes.iter().copied().collect();
    let mut moves = BTreeMap::new();
    let Some(&first) = inserted.first() else {
        return moves;
    };

    let mut offset = first;
    for index in first..number_of_items {
        while inserted.contains(&offset) {
            offset += 1;
        }
        moves.insert(index, offset);
        offset += 1;
    }
    moves
}

/// Maps each index following a deleted run to the slot it occupies once `indexes` have been
/// removed. Indexes before the first deletion are absent from the result.
pub fn calculate_move_for_deleted_indexes(
    indexes: &[usize],
    number_of_items: usize,
) -> BTreeMap<usize, usize> {
    let deleted: BTreeSet<usize> = indexes.iter().copied().collect();
    let mut moves = BTreeMap::new();
    let mut offset: Option<usize> = None;
    let mut count = 0usize;

    for index in 0..number_of_items {
        if deleted.contains(&index) {
            offset.get_or_insert(index);
            count += 1;
            continue;
        }
        if count > 0 {
            if let Some(start) = offset.as_mut() {
                moves.insert(*start + count, *start);
                *start += 1;
            }
        }
    }
    moves
}

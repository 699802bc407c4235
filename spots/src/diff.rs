use std::collections::{BTreeMap, BTreeSet};

use crate::Item;
use crate::moves::{calculate_move_for_deleted_indexes, calculate_move_for_inserted_indexes};

/// Per-index classification produced by [`evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemDiff {
    Kind,
    Size,
    Identifier,
    Title,
    Subtitle,
    Text,
    Image,
    Action,
    Meta,
    Relations,
    Children,
    New,
    Removed,
    None,
}

impl ItemDiff {
    /// Changes that require the view to go through the full configure-and-measure path.
    pub fn requires_reload(self) -> bool {
        matches!(self, Self::Kind | Self::Size)
    }
}

/// Classifies every index of `new` against `old` by position.
///
/// Returns `None` when both slices are strictly equal.
pub fn evaluate(new: &[Item], old: &[Item]) -> Option<Vec<ItemDiff>> {
    if crate::item::items_strict_eq(new, old) {
        return None;
    }
    let len = new.len().max(old.len());
    let diffs = (0..len)
        .map(|index| match (new.get(index), old.get(index)) {
            (Some(new), Some(old)) => new.diff(old),
            (Some(_), None) => ItemDiff::New,
            (None, Some(_)) => ItemDiff::Removed,
            (None, None) => ItemDiff::None,
        })
        .collect();
    Some(diffs)
}

/// The edit script between two item lists.
///
/// `deletions` index the old list; every other set indexes the new list. An index appears in at
/// most one of `insertions`, `updates` and `reloads`, and may additionally appear in
/// `child_updates`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    pub insertions: BTreeSet<usize>,
    pub updates: BTreeSet<usize>,
    pub reloads: BTreeSet<usize>,
    pub deletions: BTreeSet<usize>,
    pub child_updates: BTreeSet<usize>,
    /// Old index → new index for items shifted by the insertions or deletions.
    pub moved: BTreeMap<usize, usize>,
}

impl Changes {
    /// Computes the positional edit script turning `old` into `new`.
    ///
    /// Reordering is not detected as a move: a permutation is reported as per-index
    /// updates/reloads.
    pub fn between(new: &[Item], old: &[Item]) -> Self {
        let mut changes = Self::default();
        let len = new.len().max(old.len());
        for index in 0..len {
            match (new.get(index), old.get(index)) {
                (Some(new), Some(old)) => {
                    if new.strict_eq(old) {
                        continue;
                    }
                    match new.diff(old) {
                        diff if diff.requires_reload() => {
                            changes.reloads.insert(index);
                        }
                        ItemDiff::Children => {}
                        _ => {
                            changes.updates.insert(index);
                        }
                    }
                    if new.children_differ(old) {
                        changes.child_updates.insert(index);
                    }
                }
                (Some(_), None) => {
                    changes.insertions.insert(index);
                }
                (None, Some(_)) => {
                    changes.deletions.insert(index);
                }
                (None, None) => {}
            }
        }
        changes.compute_moves(new.len(), old.len());
        changes
    }

    /// Collapses a flat classification from [`evaluate`] into set form.
    ///
    /// A flat list cannot express an item whose own fields and children both changed; use
    /// [`Changes::between`] when the item slices are at hand.
    pub fn from_diff(diffs: &[ItemDiff], new_count: usize, old_count: usize) -> Self {
        let mut changes = Self::default();
        for (index, diff) in diffs.iter().enumerate() {
            match diff {
                ItemDiff::Kind | ItemDiff::Size => {
                    changes.reloads.insert(index);
                }
                ItemDiff::Children => {
                    changes.child_updates.insert(index);
                }
                ItemDiff::New => {
                    changes.insertions.insert(index);
                }
                ItemDiff::Removed => {
                    changes.deletions.insert(index);
                }
                ItemDiff::None => {}
                _ => {
                    changes.updates.insert(index);
                }
            }
        }
        changes.compute_moves(new_count, old_count);
        changes
    }

    fn compute_moves(&mut self, new_count: usize, old_count: usize) {
        if !self.insertions.is_empty() {
            let inserted: Vec<usize> = self.insertions.iter().copied().collect();
            self.moved = calculate_move_for_inserted_indexes(&inserted, old_count);
        } else if !self.deletions.is_empty() {
            let deleted: Vec<usize> = self.deletions.iter().copied().collect();
            self.moved = calculate_move_for_deleted_indexes(&deleted, old_count);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
            && self.updates.is_empty()
            && self.reloads.is_empty()
            && self.deletions.is_empty()
            && self.child_updates.is_empty()
            && self.moved.is_empty()
    }

    /// Whether the surface needs a structural batch (insert/delete/reload) for these changes.
    pub fn has_structural_changes(&self) -> bool {
        !self.insertions.is_empty() || !self.deletions.is_empty() || !self.reloads.is_empty()
    }
}

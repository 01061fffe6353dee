//! Todo list (store) domain model.
//!
//! # Responsibility
//! - Hold the ordered item sequence plus collection-level timestamps.
//! - Provide pure in-place transitions used by the mutation service.
//! - Provide derived pinned/non-pinned views.
//!
//! # Invariants
//! - Item uuids are unique within one list.
//! - Item order is display order and is independent of timestamps.
//! - A transition that does not apply leaves the list byte-for-byte equal,
//!   including `updated_at`.

use crate::model::item::{Item, ItemId, ItemPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Full persisted todo-list state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    /// Time of the last applied mutation.
    pub updated_at: DateTime<Utc>,
}

/// Relocation request for one item.
///
/// Both variants resolve to a canonical `(from, to)` index pair before the
/// move executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderMove {
    /// Positional indices into `items`.
    ByIndex { from: usize, to: usize },
    /// Item ids, each resolved to its current index.
    ByUuid { from: ItemId, to: ItemId },
}

impl TodoList {
    /// Creates an empty list stamped with `now`.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Gets one item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.uuid == id)
    }

    /// Returns the current index of the item with `id`.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.uuid == id)
    }

    /// Pinned items, in list order.
    pub fn pinned_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(|item| item.pinned)
    }

    /// Non-pinned items, in list order.
    pub fn non_pinned_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(|item| !item.pinned)
    }

    /// Appends `item` at the end of the list.
    pub fn push_item(&mut self, item: Item, now: DateTime<Utc>) {
        self.items.push(item);
        self.updated_at = now;
    }

    /// Removes the item with `id`. Returns `false` when absent.
    pub fn remove_item(&mut self, id: ItemId, now: DateTime<Utc>) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.items.remove(index);
        self.updated_at = now;
        true
    }

    /// Merges `patch` into the item with `id`.
    ///
    /// Returns `false` when the item is absent or the patch is empty.
    pub fn patch_item(&mut self, id: ItemId, patch: &ItemPatch, now: DateTime<Utc>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.uuid == id) else {
            return false;
        };
        if !item.apply_patch(patch, now) {
            return false;
        }
        self.updated_at = now;
        true
    }

    /// Resolves a move request to an in-bounds `(from, to)` index pair.
    ///
    /// Returns `None` when either side cannot be resolved.
    pub fn resolve_move(&self, request: ReorderMove) -> Option<(usize, usize)> {
        let (from, to) = match request {
            ReorderMove::ByIndex { from, to } => (from, to),
            ReorderMove::ByUuid { from, to } => (self.position(from)?, self.position(to)?),
        };
        if from >= self.items.len() || to >= self.items.len() {
            return None;
        }
        Some((from, to))
    }

    /// Relocates one item, keeping the relative order of all others.
    ///
    /// Returns `false` (and leaves the list untouched) when the request does
    /// not resolve or resolves to a self-move.
    pub fn move_item(&mut self, request: ReorderMove, now: DateTime<Utc>) -> bool {
        let Some((from, to)) = self.resolve_move(request) else {
            return false;
        };
        if from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.updated_at = now;
        true
    }

    /// Re-mints nil and duplicated item ids, keeping the first occurrence.
    ///
    /// Returns how many ids were replaced.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.items.len());
        let mut reminted = 0;
        for item in &mut self.items {
            if item.uuid.is_nil() || !seen.insert(item.uuid) {
                let mut fresh = Uuid::new_v4();
                while !seen.insert(fresh) {
                    fresh = Uuid::new_v4();
                }
                item.uuid = fresh;
                reminted += 1;
            }
        }
        reminted
    }
}

//! Todo item domain model.
//!
//! # Responsibility
//! - Define the canonical task/note record stored in a todo list.
//! - Define caller-facing inputs for creating and patching items.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another item.
//! - `created_at` never changes after construction.
//! - Patches never touch `uuid` or `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one todo item.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = Uuid;

/// One task/note entry of a todo list.
///
/// Serialized with camelCase keys so the persisted blob stays readable by
/// web front-ends sharing the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable ID used for lookups, reordering and UI keys.
    ///
    /// Legacy blobs carry no uuid; those are minted on read and
    /// deduplicated by `TodoList::ensure_unique_ids`.
    #[serde(default = "Uuid::nil")]
    pub uuid: ItemId,
    pub title: String,
    /// Plain text produced by the rich-text editor.
    pub content: String,
    pub completed: bool,
    /// Elevates the item into the pinned view.
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Creates a new unpinned item with a generated stable ID.
    pub fn new(draft: ItemDraft, now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), draft, now)
    }

    /// Creates a new unpinned item with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: ItemId, draft: ItemDraft, now: DateTime<Utc>) -> Self {
        Self {
            uuid,
            title: draft.title,
            content: draft.content,
            completed: draft.completed,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges set fields of `patch` into this item.
    ///
    /// Returns `true` when at least one field was provided. `updated_at` is
    /// bumped whenever the patch is non-empty, even if the values are equal.
    pub fn apply_patch(&mut self, patch: &ItemPatch, now: DateTime<Utc>) -> bool {
        if patch.is_empty() {
            return false;
        }

        if let Some(title) = patch.title.as_ref() {
            self.title.clone_from(title);
        }
        if let Some(content) = patch.content.as_ref() {
            self.content.clone_from(content);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        self.updated_at = now;
        true
    }
}

/// Input model for creating an item.
///
/// Empty title/content are accepted; validation is a UI concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub content: String,
    pub completed: bool,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, completed: bool) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            completed,
        }
    }
}

/// Partial update for an existing item. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub pinned: Option<bool>,
}

impl ItemPatch {
    /// Patch that only sets the pinned flag.
    pub fn pinned(value: bool) -> Self {
        Self {
            pinned: Some(value),
            ..Self::default()
        }
    }

    /// Patch that only sets the completed flag.
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.completed.is_none()
            && self.pinned.is_none()
    }
}

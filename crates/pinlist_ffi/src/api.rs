//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level list functions to Dart via FRB.
//! - Keep error semantics simple for UI integration: every call returns an
//!   envelope with `ok` and a human-readable `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens the store, applies one use-case and drops the service,
//!   so no list state is cached between calls.
//! - Item ids cross the boundary as hyphenated UUID strings.

use log::warn;
use pinlist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Item, ItemDraft, ItemId, ItemPatch, ListServiceResult, MutationOutcome, ReorderMove,
    SqliteStorage, StorageListRepository, TodoListService,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "pinlist_store.sqlite3";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type SqliteListService = TodoListService<StorageListRepository<SqliteStorage>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects `debug` in debug builds and `info` in release builds.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the SQLite file backing the list store.
///
/// Must be called before the first list call to take effect; afterwards the
/// path is fixed for the process. Without this call the store lives in the OS
/// temp directory.
///
/// # FFI contract
/// - Returns empty string on success (including repeating the active path).
/// - Returns an error message for blank paths or a conflicting second path.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "store path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Item projection returned to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemView {
    /// Stable item ID in string form.
    pub item_id: String,
    pub title: String,
    pub content: String,
    pub completed: bool,
    pub pinned: bool,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
    /// Last update time in epoch milliseconds.
    pub updated_at_ms: i64,
}

/// Full list snapshot with both derived views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshotResponse {
    /// Whether the store could be opened.
    pub ok: bool,
    /// All items in list order.
    pub items: Vec<ListItemView>,
    /// Pinned items in list order.
    pub pinned_items: Vec<ListItemView>,
    /// Non-pinned items in list order.
    pub non_pinned_items: Vec<ListItemView>,
    /// List update time in epoch milliseconds (0 when `ok` is false).
    pub updated_at_ms: i64,
    pub message: String,
}

/// Generic action response envelope for list mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListActionResponse {
    /// Whether the call completed without error.
    pub ok: bool,
    /// Whether the list changed. `false` with `ok = true` means no-op.
    pub applied: bool,
    /// Affected item ID, when one was created or targeted.
    pub item_id: Option<String>,
    pub message: String,
}

impl ListActionResponse {
    fn from_outcome(outcome: MutationOutcome, item_id: Option<String>, message: &str) -> Self {
        match outcome {
            MutationOutcome::Applied => Self {
                ok: true,
                applied: true,
                item_id,
                message: message.to_string(),
            },
            MutationOutcome::Unchanged => Self {
                ok: true,
                applied: false,
                item_id,
                message: "Nothing changed.".to_string(),
            },
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            item_id: None,
            message: message.into(),
        }
    }
}

/// Returns the current list with pinned/non-pinned views.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_snapshot() -> ListSnapshotResponse {
    match open_service() {
        Ok(service) => {
            let list = service.list();
            ListSnapshotResponse {
                ok: true,
                items: list.items.iter().map(to_item_view).collect(),
                pinned_items: list.pinned_items().map(to_item_view).collect(),
                non_pinned_items: list.non_pinned_items().map(to_item_view).collect(),
                updated_at_ms: list.updated_at.timestamp_millis(),
                message: format!("{} item(s).", list.len()),
            }
        }
        Err(err) => ListSnapshotResponse {
            ok: false,
            items: Vec::new(),
            pinned_items: Vec::new(),
            non_pinned_items: Vec::new(),
            updated_at_ms: 0,
            message: format!("list_snapshot failed: {err}"),
        },
    }
}

/// Appends a new item. Empty title/content are accepted.
///
/// # FFI contract
/// - Never panics.
/// - Returns the created item ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn list_add_item(title: String, content: String, completed: bool) -> ListActionResponse {
    match with_list_service(|service| service.add_item(ItemDraft::new(title, content, completed)))
    {
        Ok(item) => ListActionResponse::from_outcome(
            MutationOutcome::Applied,
            Some(item.uuid.to_string()),
            "Item added.",
        ),
        Err(err) => ListActionResponse::failure(format!("list_add_item failed: {err}")),
    }
}

/// Deletes one item. Unknown IDs are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn list_delete_item(item_id: String) -> ListActionResponse {
    run_item_action("list_delete_item", &item_id, "Item deleted.", |service, id| {
        service.delete_item(id)
    })
}

/// Merges the provided fields into one item. `None` leaves a field unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn list_modify_item(
    item_id: String,
    title: Option<String>,
    content: Option<String>,
    completed: Option<bool>,
    pinned: Option<bool>,
) -> ListActionResponse {
    let patch = ItemPatch {
        title,
        content,
        completed,
        pinned,
    };
    run_item_action("list_modify_item", &item_id, "Item updated.", |service, id| {
        service.modify_item(id, patch)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn list_pin_item(item_id: String) -> ListActionResponse {
    run_item_action("list_pin_item", &item_id, "Item pinned.", |service, id| {
        service.pin_item(id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn list_unpin_item(item_id: String) -> ListActionResponse {
    run_item_action("list_unpin_item", &item_id, "Item unpinned.", |service, id| {
        service.unpin_item(id)
    })
}

/// Moves the item at position `from` to position `to`.
///
/// Out-of-range positions are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn list_reorder_by_index(from: u32, to: u32) -> ListActionResponse {
    let request = ReorderMove::ByIndex {
        from: from as usize,
        to: to as usize,
    };
    match with_list_service(|service| service.reorder_items(request)) {
        Ok(outcome) => ListActionResponse::from_outcome(outcome, None, "Items reordered."),
        Err(err) => ListActionResponse::failure(format!("list_reorder_by_index failed: {err}")),
    }
}

/// Moves the dragged item (`from_id`) onto the slot of `to_id`.
///
/// Unknown IDs are a successful no-op; malformed IDs are a failure.
#[flutter_rust_bridge::frb(sync)]
pub fn list_reorder_by_uuid(from_id: String, to_id: String) -> ListActionResponse {
    let (from, to) = match (parse_item_id(&from_id), parse_item_id(&to_id)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(err), _) | (_, Err(err)) => {
            return ListActionResponse::failure(format!("list_reorder_by_uuid failed: {err}"))
        }
    };
    match with_list_service(|service| service.reorder_items(ReorderMove::ByUuid { from, to })) {
        Ok(outcome) => {
            ListActionResponse::from_outcome(outcome, Some(from.to_string()), "Items reordered.")
        }
        Err(err) => ListActionResponse::failure(format!("list_reorder_by_uuid failed: {err}")),
    }
}

fn run_item_action(
    op: &str,
    item_id: &str,
    applied_message: &str,
    action: impl FnOnce(&mut SqliteListService, ItemId) -> ListServiceResult<MutationOutcome>,
) -> ListActionResponse {
    let id = match parse_item_id(item_id) {
        Ok(id) => id,
        Err(err) => return ListActionResponse::failure(format!("{op} failed: {err}")),
    };
    match with_list_service(|service| action(service, id)) {
        Ok(outcome) => {
            ListActionResponse::from_outcome(outcome, Some(id.to_string()), applied_message)
        }
        Err(err) => ListActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn parse_item_id(raw: &str) -> Result<ItemId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid item id `{}`", raw.trim()))
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| std::env::temp_dir().join(STORE_DB_FILE_NAME))
        .clone()
}

fn open_service() -> Result<SqliteListService, String> {
    let db_path = resolve_store_db_path();
    let storage = SqliteStorage::open(&db_path).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error={err}");
        format!("store open failed: {err}")
    })?;
    Ok(TodoListService::open(StorageListRepository::new(storage)))
}

fn with_list_service<T>(
    f: impl FnOnce(&mut SqliteListService) -> ListServiceResult<T>,
) -> Result<T, String> {
    let mut service = open_service()?;
    f(&mut service).map_err(|err| err.to_string())
}

fn to_item_view(item: &Item) -> ListItemView {
    ListItemView {
        item_id: item.uuid.to_string(),
        title: item.title.clone(),
        content: item.content.clone(),
        completed: item.completed,
        pinned: item.pinned,
        created_at_ms: item.created_at.timestamp_millis(),
        updated_at_ms: item.updated_at.timestamp_millis(),
    }
}

//! Core domain logic for pinlist.
//! This crate is the single source of truth for todo-list invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{
    init_logging, init_logging_with, logging_status, LogLevel, LoggingConfig,
};
pub use model::item::{Item, ItemDraft, ItemId, ItemPatch};
pub use model::list::{ReorderMove, TodoList};
pub use repo::list_repo::{
    decode_list, encode_list, load_list_or_empty, ListRepository, RepoError, RepoResult,
    StorageListRepository, DEFAULT_LIST_KEY,
};
pub use service::list_service::{
    ListServiceError, ListServiceResult, MutationOutcome, SubscriptionId, TodoListService,
};
pub use storage::{
    validate_key, FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage, StorageError,
    StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

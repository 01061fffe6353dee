//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pinlist_core` linkage.
//! - Exercise one add/pin/delete cycle against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use pinlist_core::{ItemDraft, MemoryStorage, StorageListRepository, TodoListService};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pinlist_core ping={}", pinlist_core::ping());
    println!("pinlist_core version={}", pinlist_core::core_version());

    match smoke_cycle() {
        Ok(summary) => {
            println!("pinlist_core smoke={summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("pinlist_core smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_cycle() -> Result<String, pinlist_core::ListServiceError> {
    let mut service = TodoListService::open(StorageListRepository::new(MemoryStorage::new()));
    let item = service.add_item(ItemDraft::new("smoke", "", false))?;
    service.pin_item(item.uuid)?;
    let pinned = service.pinned_items().len();
    service.delete_item(item.uuid)?;
    Ok(format!("pinned={pinned} remaining={}", service.items().len()))
}

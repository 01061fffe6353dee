//! Todo list use-case service (the mutation API).
//!
//! # Responsibility
//! - Own the current `TodoList` for the lifetime of one service instance.
//! - Provide add/delete/modify/pin/unpin/reorder entry points.
//! - Persist the whole list after every applied mutation and publish it to
//!   subscribers.
//!
//! # Invariants
//! - The next list is computed on a copy and swapped in only after the write
//!   succeeds; a failed write leaves the current list untouched.
//! - Unresolvable ids/indices are no-ops: no write, no timestamp change, no
//!   notification.
//! - Subscribers are notified in registration order, once per applied
//!   mutation.
//! - Ids repaired on open are written back immediately, so they stay stable
//!   across later opens.

use crate::model::item::{Item, ItemDraft, ItemId, ItemPatch};
use crate::model::list::{ReorderMove, TodoList};
use crate::repo::list_repo::{load_list_or_empty, ListRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ListServiceResult<T> = Result<T, ListServiceError>;

/// Service error for list mutations.
#[derive(Debug)]
pub enum ListServiceError {
    /// The new list could not be written; the in-memory list is unchanged.
    Persist(RepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist(err) => write!(f, "failed to persist list: {err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        Self::Persist(value)
    }
}

/// Whether a mutating call changed (and persisted) the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Target did not resolve, or the request was a no-op.
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&TodoList)>;

/// Explicitly constructed todo-list state container.
pub struct TodoListService<R: ListRepository> {
    repo: R,
    list: TodoList,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: u64,
}

impl<R: ListRepository> TodoListService<R> {
    /// Loads the persisted list (or an empty one) and wraps `repo`.
    ///
    /// Never fails; load problems are logged and replaced by an empty list.
    /// Nil or duplicated item ids are re-minted and saved right away; a
    /// failed save is logged and the repaired list is still used.
    pub fn open(mut repo: R) -> Self {
        let mut list = load_list_or_empty(&repo, Utc::now());
        let reminted = list.ensure_unique_ids();
        if reminted > 0 {
            match repo.save_list(&list) {
                Ok(()) => warn!(
                    "event=list_repair module=service status=ok reminted_ids={reminted}"
                ),
                Err(err) => error!(
                    "event=list_repair module=service status=error reminted_ids={reminted} error={err}"
                ),
            }
        }
        Self {
            repo,
            list,
            subscribers: Vec::new(),
            next_subscription_id: 0,
        }
    }

    /// Current list snapshot.
    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn items(&self) -> &[Item] {
        &self.list.items
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.list.get(id)
    }

    /// Pinned items, in list order. Recomputed on every call.
    pub fn pinned_items(&self) -> Vec<&Item> {
        self.list.pinned_items().collect()
    }

    /// Non-pinned items, in list order. Recomputed on every call.
    pub fn non_pinned_items(&self) -> Vec<&Item> {
        self.list.non_pinned_items().collect()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Registers `callback`, invoked with the new list after each applied
    /// mutation.
    pub fn subscribe(&mut self, callback: impl FnMut(&TodoList) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` when `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(current, _)| *current != id);
        self.subscribers.len() != before
    }

    /// Appends a new unpinned item and returns it.
    pub fn add_item(&mut self, draft: ItemDraft) -> ListServiceResult<Item> {
        let now = Utc::now();
        let item = Item::new(draft, now);
        let mut next = self.list.clone();
        next.push_item(item.clone(), now);
        self.commit("add", next)?;
        Ok(item)
    }

    /// Removes one item by id.
    pub fn delete_item(&mut self, id: ItemId) -> ListServiceResult<MutationOutcome> {
        self.apply("delete", |list, now| list.remove_item(id, now))
    }

    /// Merges `patch` into one item by id.
    pub fn modify_item(
        &mut self,
        id: ItemId,
        patch: ItemPatch,
    ) -> ListServiceResult<MutationOutcome> {
        self.apply("modify", |list, now| list.patch_item(id, &patch, now))
    }

    pub fn pin_item(&mut self, id: ItemId) -> ListServiceResult<MutationOutcome> {
        self.apply("pin", |list, now| {
            list.patch_item(id, &ItemPatch::pinned(true), now)
        })
    }

    pub fn unpin_item(&mut self, id: ItemId) -> ListServiceResult<MutationOutcome> {
        self.apply("unpin", |list, now| {
            list.patch_item(id, &ItemPatch::pinned(false), now)
        })
    }

    /// Moves one item; see `ReorderMove` for how positions resolve.
    pub fn reorder_items(&mut self, request: ReorderMove) -> ListServiceResult<MutationOutcome> {
        if self.list.resolve_move(request).is_none() {
            debug!("event=list_mutation module=service op=reorder status=unresolved");
            return Ok(MutationOutcome::Unchanged);
        }
        self.apply("reorder", |list, now| list.move_item(request, now))
    }

    fn apply(
        &mut self,
        op: &'static str,
        mutate: impl FnOnce(&mut TodoList, DateTime<Utc>) -> bool,
    ) -> ListServiceResult<MutationOutcome> {
        let mut next = self.list.clone();
        if !mutate(&mut next, Utc::now()) {
            debug!("event=list_mutation module=service op={op} status=unchanged");
            return Ok(MutationOutcome::Unchanged);
        }
        self.commit(op, next)?;
        Ok(MutationOutcome::Applied)
    }

    fn commit(&mut self, op: &'static str, next: TodoList) -> ListServiceResult<()> {
        if let Err(err) = self.repo.save_list(&next) {
            error!(
                "event=list_mutation module=service op={op} status=error error_code=persist_failed error={err}"
            );
            return Err(err.into());
        }

        self.list = next;
        debug!(
            "event=list_mutation module=service op={op} status=ok items={}",
            self.list.len()
        );
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.list);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationOutcome, TodoListService};
    use crate::model::item::ItemDraft;
    use crate::model::list::{ReorderMove, TodoList};
    use crate::repo::list_repo::{
        decode_list, ListRepository, RepoError, RepoResult, StorageListRepository,
    };
    use crate::storage::{KeyValueStorage, MemoryStorage, StorageError};
    use std::cell::RefCell;
    use std::rc::Rc;

    const LEGACY_BLOB: &[u8] = br#"{
        "items": [
            {
                "title": "from the old app",
                "content": "",
                "completed": false,
                "createdAt": "2025-05-01T10:00:00.000Z",
                "updatedAt": "2025-05-01T10:00:00.000Z"
            }
        ],
        "createdAt": "2025-05-01T09:00:00.000Z",
        "updatedAt": "2025-05-01T10:00:00.000Z"
    }"#;

    fn service() -> TodoListService<StorageListRepository<MemoryStorage>> {
        TodoListService::open(StorageListRepository::new(MemoryStorage::new()))
    }

    #[test]
    fn subscribers_see_each_applied_mutation_only() {
        let mut service = service();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        service.subscribe(move |list| sink.borrow_mut().push(list.len()));

        let item = service.add_item(ItemDraft::new("a", "", false)).unwrap();
        service.add_item(ItemDraft::new("b", "", false)).unwrap();
        let outcome = service
            .reorder_items(ReorderMove::ByIndex { from: 0, to: 5 })
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged);
        service.delete_item(item.uuid).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut service = service();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = service.subscribe(move |_| *sink.borrow_mut() += 1);

        service.add_item(ItemDraft::default()).unwrap();
        assert!(service.unsubscribe(id));
        assert!(!service.unsubscribe(id));
        service.add_item(ItemDraft::default()).unwrap();

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn open_persists_reminted_legacy_ids() {
        let mut storage = MemoryStorage::new();
        storage.set("todos", LEGACY_BLOB).unwrap();

        let service = TodoListService::open(StorageListRepository::new(storage));
        let id = service.items()[0].uuid;
        assert!(!id.is_nil());

        let stored = service.repository().storage().get("todos").unwrap().unwrap();
        assert_eq!(decode_list(&stored).unwrap().items[0].uuid, id);
        let reloaded = service.repository().load_list().unwrap().unwrap();
        assert_eq!(reloaded.items[0].uuid, id);
    }

    struct ReadOnlyRepo(StorageListRepository<MemoryStorage>);

    impl ListRepository for ReadOnlyRepo {
        fn load_list(&self) -> RepoResult<Option<TodoList>> {
            self.0.load_list()
        }

        fn save_list(&mut self, _list: &TodoList) -> RepoResult<()> {
            Err(RepoError::Storage(StorageError::QuotaExceeded {
                requested: 1,
                quota: 0,
            }))
        }
    }

    #[test]
    fn open_keeps_repaired_list_when_repair_write_fails() {
        let mut storage = MemoryStorage::new();
        storage.set("todos", LEGACY_BLOB).unwrap();

        let service = TodoListService::open(ReadOnlyRepo(StorageListRepository::new(storage)));
        assert_eq!(service.items().len(), 1);
        assert!(!service.items()[0].uuid.is_nil());
    }
}

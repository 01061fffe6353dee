use pinlist_core::{
    FileStorage, ItemDraft, ItemPatch, ListRepository, ListServiceError, MemoryStorage,
    MutationOutcome, RepoError, RepoResult, ReorderMove, SqliteStorage, StorageError,
    StorageListRepository, TodoList, TodoListService,
};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

type MemoryService = TodoListService<StorageListRepository<MemoryStorage>>;

fn memory_service() -> MemoryService {
    TodoListService::open(StorageListRepository::new(MemoryStorage::new()))
}

/// Wraps a repository and counts successful saves.
struct CountingRepo {
    inner: StorageListRepository<MemoryStorage>,
    saves: Rc<Cell<usize>>,
}

impl ListRepository for CountingRepo {
    fn load_list(&self) -> RepoResult<Option<TodoList>> {
        self.inner.load_list()
    }

    fn save_list(&mut self, list: &TodoList) -> RepoResult<()> {
        self.inner.save_list(list)?;
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

fn counting_service() -> (TodoListService<CountingRepo>, Rc<Cell<usize>>) {
    let saves = Rc::new(Cell::new(0));
    let repo = CountingRepo {
        inner: StorageListRepository::new(MemoryStorage::new()),
        saves: Rc::clone(&saves),
    };
    (TodoListService::open(repo), saves)
}

#[test]
fn add_pin_self_move_delete_scenario() {
    let mut service = memory_service();
    assert!(service.list().is_empty());

    let item = service
        .add_item(ItemDraft::new("Buy milk", "", false))
        .unwrap();
    assert_eq!(service.items().len(), 1);
    assert!(!item.uuid.is_nil());
    assert!(!item.uuid.to_string().is_empty());

    assert_eq!(service.pin_item(item.uuid).unwrap(), MutationOutcome::Applied);
    assert_eq!(service.pinned_items().len(), 1);
    assert_eq!(service.non_pinned_items().len(), 0);

    let before = service.list().clone();
    let outcome = service
        .reorder_items(ReorderMove::ByUuid {
            from: item.uuid,
            to: item.uuid,
        })
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert_eq!(service.list(), &before);

    assert_eq!(
        service.delete_item(item.uuid).unwrap(),
        MutationOutcome::Applied
    );
    assert_eq!(service.items().len(), 0);
}

#[test]
fn add_appends_with_fresh_timestamps_and_bumps_list_updated_at() {
    let mut service = memory_service();
    let created_at = service.list().created_at;

    let first = service.add_item(ItemDraft::new("a", "", false)).unwrap();
    let second = service
        .add_item(ItemDraft::new("", "body only", true))
        .unwrap();

    let items = service.items();
    assert_eq!(items[0].uuid, first.uuid);
    assert_eq!(items[1].uuid, second.uuid);
    assert!(items[1].completed);
    assert!(!items[1].pinned);
    assert_eq!(items[1].created_at, items[1].updated_at);
    assert_eq!(service.list().created_at, created_at);
    assert_eq!(service.list().updated_at, second.updated_at);
}

#[test]
fn delete_twice_is_idempotent() {
    let (mut service, saves) = counting_service();
    let item = service.add_item(ItemDraft::default()).unwrap();
    assert_eq!(saves.get(), 1);

    assert_eq!(
        service.delete_item(item.uuid).unwrap(),
        MutationOutcome::Applied
    );
    assert_eq!(
        service.delete_item(item.uuid).unwrap(),
        MutationOutcome::Unchanged
    );
    assert_eq!(saves.get(), 2);
}

#[test]
fn modify_merges_fields_and_ignores_unknown_ids() {
    let (mut service, saves) = counting_service();
    let item = service
        .add_item(ItemDraft::new("draft", "text", false))
        .unwrap();

    let outcome = service
        .modify_item(
            item.uuid,
            ItemPatch {
                title: Some("final".to_string()),
                completed: Some(true),
                ..ItemPatch::default()
            },
        )
        .unwrap();
    assert!(outcome.is_applied());

    let stored = service.get_item(item.uuid).unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.content, "text");
    assert!(stored.completed);
    assert_eq!(stored.created_at, item.created_at);
    assert!(stored.updated_at >= item.updated_at);

    let saves_before = saves.get();
    let missing = service
        .modify_item(Uuid::new_v4(), ItemPatch::completed(false))
        .unwrap();
    assert_eq!(missing, MutationOutcome::Unchanged);
    assert_eq!(saves.get(), saves_before);
}

#[test]
fn pin_then_unpin_restores_original_relative_position() {
    let mut service = memory_service();
    let ids: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|title| {
            service
                .add_item(ItemDraft::new(*title, "", false))
                .unwrap()
                .uuid
        })
        .collect();

    service.pin_item(ids[1]).unwrap();
    let rest: Vec<_> = service.non_pinned_items().iter().map(|item| item.uuid).collect();
    assert_eq!(rest, vec![ids[0], ids[2]]);

    service.unpin_item(ids[1]).unwrap();
    let rest: Vec<_> = service.non_pinned_items().iter().map(|item| item.uuid).collect();
    assert_eq!(rest, ids);
    assert!(service.pinned_items().is_empty());
}

#[test]
fn unresolvable_reorder_does_not_write_or_touch_timestamps() {
    let (mut service, saves) = counting_service();
    service.add_item(ItemDraft::new("a", "", false)).unwrap();
    service.add_item(ItemDraft::new("b", "", false)).unwrap();
    let before = service.list().clone();
    let saves_before = saves.get();

    for request in [
        ReorderMove::ByIndex { from: 0, to: 2 },
        ReorderMove::ByIndex { from: 7, to: 0 },
        ReorderMove::ByUuid {
            from: Uuid::new_v4(),
            to: before.items[0].uuid,
        },
        ReorderMove::ByUuid {
            from: before.items[0].uuid,
            to: Uuid::new_v4(),
        },
    ] {
        let outcome = service.reorder_items(request).unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged, "{request:?}");
    }

    assert_eq!(service.list(), &before);
    assert_eq!(saves.get(), saves_before);
}

#[test]
fn reorder_by_uuid_moves_dragged_item_onto_target_slot() {
    let mut service = memory_service();
    let ids: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|title| {
            service
                .add_item(ItemDraft::new(*title, "", false))
                .unwrap()
                .uuid
        })
        .collect();

    let outcome = service
        .reorder_items(ReorderMove::ByUuid {
            from: ids[0],
            to: ids[2],
        })
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);

    let order: Vec<_> = service.items().iter().map(|item| item.uuid).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0], ids[3]]);
}

#[test]
fn failed_write_surfaces_error_and_keeps_current_list() {
    let mut service = TodoListService::open(StorageListRepository::new(
        MemoryStorage::with_quota(512),
    ));
    let item = service
        .add_item(ItemDraft::new("small", "", false))
        .unwrap();
    let before = service.list().clone();

    let notified = Rc::new(Cell::new(0));
    let sink = Rc::clone(&notified);
    service.subscribe(move |_| sink.set(sink.get() + 1));

    let err = service
        .add_item(ItemDraft::new("large", "x".repeat(1024), false))
        .unwrap_err();
    assert!(matches!(
        err,
        ListServiceError::Persist(RepoError::Storage(StorageError::QuotaExceeded { .. }))
    ));
    assert_eq!(service.list(), &before);
    assert_eq!(notified.get(), 0);

    let err = service
        .modify_item(
            item.uuid,
            ItemPatch {
                content: Some("y".repeat(1024)),
                ..ItemPatch::default()
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("quota"));
    assert_eq!(service.list(), &before);
}

#[test]
fn state_survives_reopen_on_file_storage() {
    let dir = tempfile::tempdir().unwrap();

    let (first_id, second_id) = {
        let mut service =
            TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
        let first = service.add_item(ItemDraft::new("one", "", false)).unwrap();
        let second = service.add_item(ItemDraft::new("two", "", false)).unwrap();
        service.pin_item(second.uuid).unwrap();
        service
            .reorder_items(ReorderMove::ByIndex { from: 1, to: 0 })
            .unwrap();
        (first.uuid, second.uuid)
    };

    let reopened = TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
    let order: Vec<_> = reopened.items().iter().map(|item| item.uuid).collect();
    assert_eq!(order, vec![second_id, first_id]);
    assert!(reopened.get_item(second_id).unwrap().pinned);
}

#[test]
fn state_survives_reopen_on_sqlite_storage_with_custom_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pinlist.db");

    let snapshot = {
        let repo =
            StorageListRepository::with_key(SqliteStorage::open(&path).unwrap(), "work-list")
                .unwrap();
        let mut service = TodoListService::open(repo);
        service
            .add_item(ItemDraft::new("ship", "release notes", false))
            .unwrap();
        service.list().clone()
    };

    let repo =
        StorageListRepository::with_key(SqliteStorage::open(&path).unwrap(), "work-list").unwrap();
    let reopened = TodoListService::open(repo);
    assert_eq!(reopened.list(), &snapshot);

    let other = TodoListService::open(StorageListRepository::new(
        SqliteStorage::open(&path).unwrap(),
    ));
    assert!(other.list().is_empty());
}

#[test]
fn corrupt_persisted_state_opens_as_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todos"), b"\x00\x01 definitely not json").unwrap();

    let mut service =
        TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
    assert!(service.list().is_empty());

    service.add_item(ItemDraft::new("fresh", "", false)).unwrap();
    let reopened = TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
    assert_eq!(reopened.items().len(), 1);
}

#[test]
fn legacy_ids_stay_stable_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = br#"{
        "items": [
            {"title": "old", "content": "", "completed": false,
             "createdAt": "2025-05-01T10:00:00.000Z", "updatedAt": "2025-05-01T10:00:00.000Z"},
            {"uuid": "00000000-0000-0000-0000-000000000000", "title": "older", "content": "",
             "completed": true, "createdAt": "2025-04-01T10:00:00.000Z",
             "updatedAt": "2025-04-01T10:00:00.000Z"}
        ],
        "createdAt": "2025-04-01T09:00:00.000Z",
        "updatedAt": "2025-05-01T10:00:00.000Z"
    }"#;
    std::fs::write(dir.path().join("todos"), legacy).unwrap();

    let first_ids: Vec<Uuid> = {
        let service =
            TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
        service.items().iter().map(|item| item.uuid).collect()
    };
    assert!(first_ids.iter().all(|id| !id.is_nil()));

    let mut reopened =
        TodoListService::open(StorageListRepository::new(FileStorage::new(dir.path())));
    let reopened_ids: Vec<Uuid> = reopened.items().iter().map(|item| item.uuid).collect();
    assert_eq!(reopened_ids, first_ids);
    assert_eq!(
        reopened.pin_item(first_ids[1]).unwrap(),
        MutationOutcome::Applied
    );
    assert!(reopened.get_item(first_ids[1]).unwrap().pinned);
}

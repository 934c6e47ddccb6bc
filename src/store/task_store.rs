//! The task collection: CRUD, checklist mutation, sort state and persistence

use crate::events::{Event, EventBus};
use crate::models::{NewTask, Priority, SortCriteria, SortField, Subtask, Task, TaskPatch};
use crate::storage::{SharedStorage, StorageError, load_json, save_json};
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

/// Storage key for the task list
pub const TASKS_KEY: &str = "todos-app-tasks";

/// Storage key for the active sort criteria
pub const SORT_CRITERIA_KEY: &str = "todos-app-sort-criteria";

/// Errors related to task operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task text cannot be empty")]
    EmptyText,
    #[error("Task not found: {0}")]
    NotFound(u64),
    #[error("Subtask {subtask} not found on task {task}")]
    SubtaskNotFound { task: u64, subtask: u64 },
}

/// Owns every task.
///
/// Each successful mutation writes the collection to storage and publishes
/// `tasksUpdated` with the sorted list. Writes are best effort: a failed
/// write is logged and remembered per key, the in-memory state stays
/// authoritative.
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
    sort: SortCriteria,
    storage: SharedStorage,
    bus: Rc<EventBus>,
    save_errors: BTreeMap<&'static str, String>,
}

impl TaskStore {
    /// Rehydrate tasks and sort criteria from storage.
    ///
    /// Unreadable data is logged and replaced by defaults; loading never fails.
    /// Records are decoded one at a time, so a bad record only loses itself.
    pub fn load(storage: SharedStorage, bus: Rc<EventBus>) -> Self {
        let tasks = match load_json::<Vec<Value>>(&*storage, TASKS_KEY) {
            Ok(Some(records)) => dedupe_ids(decode_tasks(records)),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Error loading tasks from storage, starting empty: {}", e);
                Vec::new()
            }
        };

        let sort = match load_json::<SortCriteria>(&*storage, SORT_CRITERIA_KEY) {
            Ok(criteria) => criteria.unwrap_or_default(),
            Err(e) => {
                log::warn!("Error loading sort criteria, using default: {}", e);
                SortCriteria::default()
            }
        };

        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        log::debug!("Loaded {} task(s), next id {}", tasks.len(), next_id);

        let store = TaskStore {
            tasks,
            next_id,
            sort,
            storage,
            bus,
            save_errors: BTreeMap::new(),
        };
        store.publish();
        store
    }

    /// All tasks in current sort order. Stored order is never changed.
    pub fn list(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        self.sort.sort(&mut tasks);
        tasks
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn sort_criteria(&self) -> SortCriteria {
        self.sort
    }

    /// Number of tasks filed under `project`
    pub fn count_in(&self, project: &str) -> usize {
        self.tasks.iter().filter(|t| t.category == project).count()
    }

    /// Failed writes, one message per key, each cleared by that key's next
    /// successful write
    pub fn save_errors(&self) -> Vec<&str> {
        self.save_errors.values().map(String::as_str).collect()
    }

    /// Create a task with the next sequential id
    pub fn create(&mut self, new: NewTask) -> Result<Task, TaskError> {
        let text = normalize_text(&new.text)?;

        let mut task = Task::new(self.next_id, text);
        task.category = new.category_or_default().to_string();
        task.due = new.due.filter(|d| !d.trim().is_empty());
        task.priority = new.priority;
        task.created_at = Utc::now();

        self.next_id += 1;
        self.tasks.push(task.clone());
        log::debug!("Created task #{} in {}", task.id, task.category);
        self.commit();
        Ok(task)
    }

    /// Merge `patch` into task `id`
    pub fn update(&mut self, id: u64, mut patch: TaskPatch) -> Result<Task, TaskError> {
        if let Some(text) = &patch.text {
            patch.text = Some(normalize_text(text)?);
        }

        let task = self.get_mut(id)?;
        if patch.is_empty() {
            return Ok(task.clone());
        }
        patch.apply(task);
        let updated = task.clone();
        self.commit();
        Ok(updated)
    }

    /// Remove task `id`, returning whether anything was removed
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() < before {
            log::debug!("Deleted task #{}", id);
            self.commit();
            true
        } else {
            false
        }
    }

    pub fn toggle_complete(&mut self, id: u64) -> Result<Task, TaskError> {
        let task = self.get_mut(id)?;
        task.toggle_complete();
        let updated = task.clone();
        self.commit();
        Ok(updated)
    }

    pub fn set_priority(&mut self, id: u64, priority: Option<Priority>) -> Result<Task, TaskError> {
        self.update(id, TaskPatch::default().priority(priority))
    }

    pub fn set_note(&mut self, id: u64, note: impl Into<String>) -> Result<Task, TaskError> {
        self.update(id, TaskPatch::default().note(note))
    }

    /// Append a checklist item to task `task_id`
    pub fn add_subtask(&mut self, task_id: u64, text: &str) -> Result<Subtask, TaskError> {
        let text = normalize_text(text)?;
        let task = self.get_mut(task_id)?;
        let subtask = Subtask {
            id: task.next_subtask_id(),
            text,
            done: false,
        };
        task.subtasks.push(subtask.clone());
        self.commit();
        Ok(subtask)
    }

    pub fn toggle_subtask(&mut self, task_id: u64, sub_id: u64) -> Result<Subtask, TaskError> {
        let task = self.get_mut(task_id)?;
        let subtask = task.subtask_mut(sub_id).ok_or(TaskError::SubtaskNotFound {
            task: task_id,
            subtask: sub_id,
        })?;
        subtask.done = !subtask.done;
        let updated = subtask.clone();
        self.commit();
        Ok(updated)
    }

    /// Remove a checklist item, returning it
    pub fn delete_subtask(&mut self, task_id: u64, sub_id: u64) -> Result<Subtask, TaskError> {
        let task = self.get_mut(task_id)?;
        let pos = task
            .subtasks
            .iter()
            .position(|s| s.id == sub_id)
            .ok_or(TaskError::SubtaskNotFound {
                task: task_id,
                subtask: sub_id,
            })?;
        let removed = task.subtasks.remove(pos);
        self.commit();
        Ok(removed)
    }

    /// Remove every task filed under `project`.
    ///
    /// Persists and publishes once, and only when something was removed.
    pub fn delete_by_project(&mut self, project: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.category != project);
        let removed = before - self.tasks.len();
        if removed > 0 {
            log::info!("Removed {} task(s) from project {}", removed, project);
            self.commit();
        }
        removed
    }

    /// Pick a sort field: the same field flips direction, a new field
    /// starts at its default direction.
    pub fn set_sort_criteria(&mut self, field: SortField) -> SortCriteria {
        self.sort = self.sort.select(field);
        let result = save_json(&*self.storage, SORT_CRITERIA_KEY, &self.sort);
        self.record_save(SORT_CRITERIA_KEY, result);
        self.bus.publish(Event::SortCriteriaChanged(self.sort));
        self.publish();
        self.sort
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn commit(&mut self) {
        self.save();
        self.publish();
    }

    fn save(&mut self) {
        let result = save_json(&*self.storage, TASKS_KEY, &self.tasks);
        self.record_save(TASKS_KEY, result);
    }

    fn record_save(&mut self, key: &'static str, result: Result<(), StorageError>) {
        match result {
            Ok(()) => {
                self.save_errors.remove(key);
            }
            Err(e) => {
                log::error!("Failed to save {}, keeping in-memory state: {}", key, e);
                self.save_errors.insert(key, e.to_string());
            }
        }
    }

    fn publish(&self) {
        self.bus.publish(Event::TasksUpdated(self.list()));
    }
}

fn normalize_text(text: &str) -> Result<String, TaskError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(TaskError::EmptyText)
    } else {
        Ok(trimmed.to_string())
    }
}

fn decode_tasks(records: Vec<Value>) -> Vec<Task> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(mut task) => {
                if task.repair_subtask_ids() {
                    log::warn!("Renumbered checklist items of stored task {}", task.id);
                }
                Some(task)
            }
            Err(e) => {
                log::warn!("Skipping unreadable stored task at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

fn dedupe_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.id);
            if !fresh {
                log::warn!("Dropping stored task with duplicate id {}", t.id);
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use crate::models::SortDirection;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use std::cell::{Cell, RefCell};

    /// Storage that refuses writes to one chosen key
    #[derive(Default)]
    struct RefusingStorage {
        inner: MemoryStorage,
        refused: RefCell<Option<&'static str>>,
    }

    impl KeyValueStorage for RefusingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if *self.refused.borrow() == Some(key) {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    limit: 0,
                });
            }
            self.inner.set(key, value)
        }
    }

    fn setup_test_store() -> (Rc<MemoryStorage>, Rc<EventBus>, TaskStore) {
        let memory = Rc::new(MemoryStorage::new());
        let bus = Rc::new(EventBus::new());
        let store = TaskStore::load(memory.clone(), Rc::clone(&bus));
        (memory, bus, store)
    }

    fn count_events(bus: &EventBus, topic: Topic) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        bus.subscribe(topic, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        count
    }

    #[test]
    fn test_create_task() {
        let (_memory, _bus, mut store) = setup_test_store();

        let task = store
            .create(NewTask::new("  Buy milk  ").due("2024-03-01"))
            .unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.category, "Inbox");
        assert_eq!(task.priority, Some(Priority::Medium));
        assert_eq!(task.due.as_deref(), Some("2024-03-01"));
        assert_eq!(store.len(), 1);

        let task = store
            .create(NewTask::new("Report").category("Work").due("  "))
            .unwrap();
        assert_eq!(task.category, "Work");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_create_rejects_blank_text() {
        let (_memory, bus, mut store) = setup_test_store();
        let updates = count_events(&bus, Topic::TasksUpdated);

        assert_eq!(store.create(NewTask::new("   ")), Err(TaskError::EmptyText));
        assert!(store.is_empty());
        assert_eq!(updates.get(), 0);
    }

    #[test]
    fn test_sequential_ids() {
        let (_memory, _bus, mut store) = setup_test_store();

        let a = store.create(NewTask::new("Task 1")).unwrap();
        let b = store.create(NewTask::new("Task 2")).unwrap();
        store.delete(b.id);
        let c = store.create(NewTask::new("Task 3")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        // Ids are not reused within a store lifetime
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_update_merges_fields() {
        let (_memory, _bus, mut store) = setup_test_store();
        let created = store
            .create(
                NewTask::new("Original")
                    .due("2024-01-15")
                    .category("Work")
                    .priority(Some(Priority::High)),
            )
            .unwrap();

        let updated = store
            .update(created.id, TaskPatch::default().text("x"))
            .unwrap();

        assert_eq!(updated.text, "x");
        let found = store.find_by_id(created.id).unwrap();
        assert_eq!(found.text, "x");
        assert_eq!(found.due, created.due);
        assert_eq!(found.category, created.category);
        assert_eq!(found.priority, created.priority);
        assert_eq!(found.created_at, created.created_at);
        assert_eq!(found.done, created.done);
    }

    #[test]
    fn test_update_not_found() {
        let (_memory, _bus, mut store) = setup_test_store();
        assert_eq!(
            store.update(42, TaskPatch::default().text("x")),
            Err(TaskError::NotFound(42))
        );
    }

    #[test]
    fn test_update_rejects_blank_text() {
        let (_memory, _bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Keep me")).unwrap();

        assert_eq!(
            store.update(task.id, TaskPatch::default().text(" ")),
            Err(TaskError::EmptyText)
        );
        assert_eq!(store.find_by_id(task.id).unwrap().text, "Keep me");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_memory, bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Gone soon")).unwrap();
        let updates = count_events(&bus, Topic::TasksUpdated);

        assert!(store.delete(task.id));
        assert!(!store.delete(task.id));
        assert!(store.list().iter().all(|t| t.id != task.id));
        // Only the effective delete publishes
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_toggle_complete() {
        let (_memory, _bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Toggle")).unwrap();

        assert!(store.toggle_complete(task.id).unwrap().done);
        assert!(!store.toggle_complete(task.id).unwrap().done);
        assert_eq!(store.toggle_complete(99), Err(TaskError::NotFound(99)));
    }

    #[test]
    fn test_note_and_priority() {
        let (_memory, _bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Annotated")).unwrap();

        store.set_note(task.id, "remember the receipt").unwrap();
        store.set_priority(task.id, None).unwrap();

        let found = store.find_by_id(task.id).unwrap();
        assert_eq!(found.note, "remember the receipt");
        assert!(found.priority.is_none());
    }

    #[test]
    fn test_subtasks() {
        let (_memory, _bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Pack")).unwrap();

        let first = store.add_subtask(task.id, "Socks").unwrap();
        let second = store.add_subtask(task.id, "Shoes").unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert!(store.toggle_subtask(task.id, first.id).unwrap().done);
        let removed = store.delete_subtask(task.id, second.id).unwrap();
        assert_eq!(removed.text, "Shoes");

        let found = store.find_by_id(task.id).unwrap();
        assert_eq!(found.subtasks.len(), 1);
        assert!(found.subtasks[0].done);
    }

    #[test]
    fn test_subtask_failures() {
        let (_memory, _bus, mut store) = setup_test_store();
        let task = store.create(NewTask::new("Pack")).unwrap();

        assert_eq!(store.add_subtask(7, "x"), Err(TaskError::NotFound(7)));
        assert_eq!(store.add_subtask(task.id, "  "), Err(TaskError::EmptyText));
        assert_eq!(
            store.toggle_subtask(task.id, 3),
            Err(TaskError::SubtaskNotFound {
                task: task.id,
                subtask: 3
            })
        );
        assert!(store.delete_subtask(task.id, 3).is_err());
    }

    #[test]
    fn test_subtask_ids_scoped_to_task() {
        let (_memory, _bus, mut store) = setup_test_store();
        let a = store.create(NewTask::new("A")).unwrap();
        let b = store.create(NewTask::new("B")).unwrap();

        assert_eq!(store.add_subtask(a.id, "one").unwrap().id, 1);
        assert_eq!(store.add_subtask(b.id, "one").unwrap().id, 1);
    }

    #[test]
    fn test_delete_by_project_publishes_once() {
        let (_memory, bus, mut store) = setup_test_store();
        store.create(NewTask::new("a").category("Work")).unwrap();
        store.create(NewTask::new("b").category("Work")).unwrap();
        store.create(NewTask::new("c")).unwrap();
        let updates = count_events(&bus, Topic::TasksUpdated);

        assert_eq!(store.delete_by_project("Work"), 2);
        assert_eq!(updates.get(), 1);
        assert_eq!(store.len(), 1);

        assert_eq!(store.delete_by_project("Work"), 0);
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_sort_criteria_toggle() {
        let (memory, bus, mut store) = setup_test_store();
        let sort_events = count_events(&bus, Topic::SortCriteriaChanged);
        let updates = count_events(&bus, Topic::TasksUpdated);

        assert_eq!(store.set_sort_criteria(SortField::Text).direction, SortDirection::Desc);
        assert_eq!(store.set_sort_criteria(SortField::Text).direction, SortDirection::Asc);
        assert_eq!(sort_events.get(), 2);
        assert_eq!(updates.get(), 2);

        let stored = memory.get(SORT_CRITERIA_KEY).unwrap().unwrap();
        assert_eq!(stored, r#"{"field":"text","direction":"asc"}"#);
    }

    #[test]
    fn test_list_is_sorted_but_storage_order_kept() {
        let (memory, _bus, mut store) = setup_test_store();
        store.create(NewTask::new("banana")).unwrap();
        store.create(NewTask::new("Apple")).unwrap();

        let listed: Vec<_> = store.list().into_iter().map(|t| t.text).collect();
        assert_eq!(listed, vec!["Apple", "banana"]);

        let stored: Vec<Task> =
            serde_json::from_str(&memory.get(TASKS_KEY).unwrap().unwrap()).unwrap();
        let stored: Vec<_> = stored.into_iter().map(|t| t.text).collect();
        assert_eq!(stored, vec!["banana", "Apple"]);
    }

    #[test]
    fn test_reload_round_trip() {
        let (memory, _bus, mut store) = setup_test_store();
        let full = store
            .create(
                NewTask::new("Everything")
                    .due("2024-03-01")
                    .category("Work")
                    .priority(Some(Priority::Low)),
            )
            .unwrap();
        store.set_note(full.id, "details").unwrap();
        store.add_subtask(full.id, "step").unwrap();
        store.toggle_complete(full.id).unwrap();
        store
            .create(NewTask::new("Defaults").priority(None))
            .unwrap();
        store.set_sort_criteria(SortField::Priority);

        let reloaded = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        assert_eq!(reloaded.list(), store.list());
        assert_eq!(reloaded.sort_criteria(), store.sort_criteria());

        // The id counter resumes after the highest stored id
        let mut reloaded = reloaded;
        assert_eq!(reloaded.create(NewTask::new("next")).unwrap().id, 3);
    }

    #[test]
    fn test_load_corrupted_tasks() {
        let memory = Rc::new(MemoryStorage::new());
        memory.set(TASKS_KEY, "{definitely not json").unwrap();
        memory.set(SORT_CRITERIA_KEY, r#"{"field":"color"}"#).unwrap();

        let store = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        assert!(store.is_empty());
        assert_eq!(store.sort_criteria(), SortCriteria::default());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let memory = Rc::new(MemoryStorage::new());
        memory
            .set(TASKS_KEY, r#"[{"id":1,"text":"a"},{"id":1,"text":"b"},{"id":4,"text":"c"}]"#)
            .unwrap();

        let store = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_id(1).unwrap().text, "a");
    }

    #[test]
    fn test_load_keeps_records_with_empty_priority() {
        let memory = Rc::new(MemoryStorage::new());
        memory
            .set(
                TASKS_KEY,
                r#"[{"id":1,"text":"keep me","priority":"Medium"},{"id":2,"text":"no prio","priority":""}]"#,
            )
            .unwrap();

        let mut store = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        assert_eq!(store.len(), 2);
        assert!(store.find_by_id(2).unwrap().priority.is_none());

        // A later write keeps the loaded tasks
        store.create(NewTask::new("new")).unwrap();
        let stored: Vec<Task> =
            serde_json::from_str(&memory.get(TASKS_KEY).unwrap().unwrap()).unwrap();
        let ids: Vec<u64> = stored.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_load_renumbers_token_subtask_ids() {
        let memory = Rc::new(MemoryStorage::new());
        memory
            .set(
                TASKS_KEY,
                r#"[{"id":1,"text":"pack","subtasks":[{"id":"k3j9x","text":"socks","done":true},{"id":1,"text":"shoes"}]}]"#,
            )
            .unwrap();

        let mut store = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        let task = store.find_by_id(1).unwrap();
        let ids: Vec<u64> = task.subtasks.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(task.subtasks[0].done);

        assert!(store.toggle_subtask(1, 2).is_ok());
        assert_eq!(store.add_subtask(1, "hat").unwrap().id, 3);
    }

    #[test]
    fn test_load_drops_only_bad_records() {
        let memory = Rc::new(MemoryStorage::new());
        memory
            .set(
                TASKS_KEY,
                r#"[{"id":1,"text":"a"},{"text":"no id"},"junk",{"id":"x"},{"id":5,"text":"b"}]"#,
            )
            .unwrap();

        let mut store = TaskStore::load(memory.clone(), Rc::new(EventBus::new()));
        let ids: Vec<u64> = store.list().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(store.create(NewTask::new("c")).unwrap().id, 6);
    }

    #[test]
    fn test_save_errors_tracked_per_key() {
        let storage = Rc::new(RefusingStorage::default());
        let mut store = TaskStore::load(storage.clone(), Rc::new(EventBus::new()));

        *storage.refused.borrow_mut() = Some(SORT_CRITERIA_KEY);
        store.set_sort_criteria(SortField::Due);
        assert_eq!(store.save_errors().len(), 1);

        // A successful tasks write does not hide the unsaved sort criteria
        store.create(NewTask::new("saved")).unwrap();
        assert_eq!(store.save_errors().len(), 1);
        assert!(store.save_errors()[0].contains(SORT_CRITERIA_KEY));

        *storage.refused.borrow_mut() = None;
        store.set_sort_criteria(SortField::Due);
        assert!(store.save_errors().is_empty());
    }

    #[test]
    fn test_count_in() {
        let (_memory, _bus, mut store) = setup_test_store();
        store.create(NewTask::new("a").category("Work")).unwrap();
        store.create(NewTask::new("b").category("Work")).unwrap();
        store.create(NewTask::new("c")).unwrap();

        assert_eq!(store.count_in("Work"), 2);
        assert_eq!(store.count_in("Inbox"), 1);
        assert_eq!(store.count_in("Home"), 0);
    }

    #[test]
    fn test_load_publishes_once() {
        let memory = Rc::new(MemoryStorage::new());
        let bus = Rc::new(EventBus::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(Topic::TasksUpdated, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });

        TaskStore::load(memory, Rc::clone(&bus));
        assert_eq!(*seen.borrow(), vec![Event::TasksUpdated(Vec::new())]);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let memory = Rc::new(MemoryStorage::with_quota(64));
        let bus = Rc::new(EventBus::new());
        let mut store = TaskStore::load(memory.clone(), Rc::clone(&bus));
        let updates = count_events(&bus, Topic::TasksUpdated);

        let task = store
            .create(NewTask::new("This task is far too long to fit in the tiny quota"))
            .unwrap();

        assert_eq!(store.find_by_id(task.id).unwrap().id, task.id);
        assert_eq!(store.save_errors().len(), 1);
        assert_eq!(updates.get(), 1);
        assert!(memory.get(TASKS_KEY).unwrap().is_none());

        // Once the data fits again, the error clears
        store.delete(task.id);
        assert!(store.save_errors().is_empty());
        assert_eq!(memory.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
    }
}

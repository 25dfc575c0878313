//! Todo store
//!
//! Ordered, process-wide collection of todos with a monotonically
//! increasing identifier allocator. Knows nothing about the protocol.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Prefix of every todo identifier
pub const TODO_ID_PREFIX: &str = "todo-";

/// A single todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier, `todo-<n>`
    pub id: String,

    /// Trimmed, non-empty title
    pub title: String,

    /// Only ever flips from `false` to `true`
    pub completed: bool,
}

/// The todo list itself, without synchronization
///
/// Only reachable through [`TodoStore`], either via its one-shot methods or
/// inside [`TodoStore::transact`].
#[derive(Debug)]
pub struct TodoList {
    todos: Vec<Todo>,
    next_id: u64,
}

impl TodoList {
    fn starting_at(next_id: u64) -> Self {
        Self {
            todos: Vec::new(),
            next_id,
        }
    }

    /// Append a new todo with the trimmed `title`
    pub fn add(&mut self, title: &str) -> Result<Todo, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation {
                field: "title".to_string(),
            });
        }

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;

        let todo = Todo {
            id: format!("{}{}", TODO_ID_PREFIX, id),
            title: title.to_string(),
            completed: false,
        };
        self.todos.push(todo.clone());

        tracing::debug!(id = %todo.id, "todo added");
        Ok(todo)
    }

    /// Mark the todo with `id` as completed
    ///
    /// Completing an already completed todo succeeds and leaves it unchanged.
    pub fn complete(&mut self, id: &str) -> Result<Todo, StoreError> {
        let todo = self
            .todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        todo.completed = true;

        tracing::debug!(id = %todo.id, "todo completed");
        Ok(todo.clone())
    }

    /// Todos in insertion order
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }
}

/// Shared todo store
///
/// Every mutation runs under the write lock, so a reader never sees an
/// allocated id without its item or a matched todo that is not yet flipped.
#[derive(Debug)]
pub struct TodoStore {
    inner: RwLock<TodoList>,
}

impl TodoStore {
    /// Create an empty store whose first todo will be `todo-1`
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub(crate) fn starting_at(next_id: u64) -> Self {
        Self {
            inner: RwLock::new(TodoList::starting_at(next_id)),
        }
    }

    /// Run `op` against the list and snapshot the result under one write guard
    ///
    /// The snapshot reflects exactly the effect of `op`, whether it succeeded
    /// or not; no other mutation can land in between.
    pub async fn transact<T, E>(
        &self,
        op: impl FnOnce(&mut TodoList) -> Result<T, E>,
    ) -> (Result<T, E>, Vec<Todo>) {
        let mut list = self.inner.write().await;
        let outcome = op(&mut *list);
        (outcome, list.todos.clone())
    }

    /// Append a new todo with the trimmed `title`
    pub async fn add(&self, title: &str) -> Result<Todo, StoreError> {
        self.inner.write().await.add(title)
    }

    /// Mark the todo with `id` as completed
    pub async fn complete(&self, id: &str) -> Result<Todo, StoreError> {
        self.inner.write().await.complete(id)
    }

    /// Copy of the current list, in insertion order
    pub async fn snapshot(&self) -> Vec<Todo> {
        self.inner.read().await.todos.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.todos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.todos.is_empty()
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_add_trims_and_assigns_ids() {
        let store = TodoStore::new();

        let first = assert_ok!(store.add("  Buy milk ").await);
        assert_eq!(
            first,
            Todo {
                id: "todo-1".to_string(),
                title: "Buy milk".to_string(),
                completed: false,
            }
        );

        let second = assert_ok!(store.add("Walk dog").await);
        assert_eq!(second.id, "todo-2");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_title() {
        let store = TodoStore::new();
        assert_ok!(store.add("Existing").await);

        let err = assert_err!(store.add(" \t\n ").await);
        assert_eq!(
            err,
            StoreError::Validation {
                field: "title".to_string()
            }
        );
        assert_eq!(store.len().await, 1);

        // A rejected add does not consume an identifier
        assert_eq!(assert_ok!(store.add("Next").await).id, "todo-2");
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = TodoStore::new();
        let mut last = 0u64;

        for i in 0..20 {
            let before = store.len().await;
            let todo = assert_ok!(store.add(&format!("task {}", i)).await);
            let n: u64 = todo.id.strip_prefix(TODO_ID_PREFIX).unwrap().parse().unwrap();
            assert!(n > last);
            last = n;
            assert_eq!(store.len().await, before + 1);
        }
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let store = TodoStore::new();
        assert_ok!(store.add("Buy milk").await);

        let once = assert_ok!(store.complete("todo-1").await);
        assert!(once.completed);
        let after_once = store.snapshot().await;

        let twice = assert_ok!(store.complete("todo-1").await);
        assert_eq!(once, twice);
        assert_eq!(store.snapshot().await, after_once);
    }

    #[tokio::test]
    async fn test_complete_unknown_leaves_store_unchanged() {
        let store = TodoStore::new();
        assert_ok!(store.add("Buy milk").await);
        let before = store.snapshot().await;

        let err = assert_err!(store.complete("todo-99").await);
        assert_eq!(
            err,
            StoreError::NotFound {
                id: "todo-99".to_string()
            }
        );
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_insertion_order() {
        let store = TodoStore::new();
        for title in ["c", "a", "b"] {
            assert_ok!(store.add(title).await);
        }
        assert_ok!(store.complete("todo-2").await);

        let titles: Vec<_> = store
            .snapshot()
            .await
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_not_reused() {
        let store = TodoStore::starting_at(u64::MAX);
        assert_eq!(assert_err!(store.add("last").await), StoreError::IdsExhausted);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_transact_snapshot_matches_outcome() {
        let store = TodoStore::new();

        let (outcome, snapshot) = store.transact(|list| list.add("Buy milk")).await;
        let todo = assert_ok!(outcome);
        assert_eq!(snapshot, vec![todo]);

        let (outcome, after) = store.transact(|list| list.complete("todo-7")).await;
        assert_err!(outcome);
        assert_eq!(after, snapshot);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_adds_see_their_own_snapshot() {
        let store = Arc::new(TodoStore::new());

        let handles: Vec<_> = (0..200)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .transact(|list| list.add(&format!("task {}", i)))
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let (outcome, snapshot) = handle.await.unwrap();
            let todo = assert_ok!(outcome);

            // The snapshot ends with this add and holds exactly the todos
            // allocated before it
            assert_eq!(snapshot.last(), Some(&todo));
            let n: usize = todo.id.strip_prefix(TODO_ID_PREFIX).unwrap().parse().unwrap();
            assert_eq!(snapshot.len(), n);

            ids.push(todo.id);
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.len().await, 200);
    }
}

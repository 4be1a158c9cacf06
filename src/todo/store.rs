//! Todo records and file-backed list persistence
//!
//! The list is one pretty-printed JSON array, rewritten in full on every
//! mutation. Loads are memoized in a [`TagCache`] until a mutation
//! invalidates the tag. There is no internal locking: callers that dispatch
//! overlapping mutations race the read-modify-write and the last full
//! rewrite wins.

use crate::cache::TagCache;
use crate::error::{TallyError, TallyResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Default cache tag for todo list stores
pub const TODOS_TAG: &str = "todos";

/// One persisted list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Random short token, unique within the list, immutable
    pub id: String,

    /// User-supplied title
    pub title: String,

    /// Completion flag
    pub completed: bool,
}

impl Todo {
    fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            completed: false,
        }
    }
}

/// Short random token from a v4 UUID
fn token() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

/// Token not already used by any record in the list
fn unique_token(todos: &[Todo]) -> String {
    loop {
        let candidate = token();
        if !todos.iter().any(|t| t.id == candidate) {
            return candidate;
        }
    }
}

/// Ordered, durable todo list behind a tagged cache
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Current list, served from cache when the tag is valid
    async fn load(&self) -> TallyResult<Vec<Todo>>;

    /// List length, derived from `load`
    async fn count(&self) -> TallyResult<usize>;

    /// Append a record with a fresh unique id, returning it
    async fn append(&self, title: &str) -> TallyResult<Todo>;

    /// Replace the title of an existing record
    async fn retitle(&self, id: &str, title: &str) -> TallyResult<Todo>;

    /// Delete a record, returning it
    async fn remove(&self, id: &str) -> TallyResult<Todo>;

    /// Cache tag announced with change notifications
    fn tag(&self) -> &str;
}

/// File-backed [`ListStore`]
pub struct TodoStore {
    path: PathBuf,
    cache: TagCache<Vec<Todo>>,
}

impl TodoStore {
    /// Create a store over the given blob path with the default tag
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_tag(path, TODOS_TAG)
    }

    /// Create a store with a custom cache tag
    pub fn with_tag(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cache: TagCache::new(tag),
        }
    }

    /// Blob path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the blob with seed records unless it already exists.
    ///
    /// Returns `true` if the blob was created. An existing blob is left
    /// untouched: the list is created once, then mutated only through the
    /// store.
    pub async fn init(&self, seed: &[Todo]) -> TallyResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TallyError::storage("creating store directory", parent, e))?;
        }

        self.write_list(seed).await?;
        info!("Initialized todo store at {}", self.path.display());
        Ok(true)
    }

    /// Read and deserialize the blob, bypassing the cache.
    ///
    /// A missing file is `StorageUnavailable`: an empty list is a legitimate
    /// persisted state (`[]`), distinct from "store missing".
    async fn read_list(&self) -> TallyResult<Vec<Todo>> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| TallyError::storage("reading todo list", &self.path, e))?;

        serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Serialize and rewrite the whole blob, exactly one durable write
    async fn write_list(&self, todos: &[Todo]) -> TallyResult<()> {
        let content = serde_json::to_string_pretty(todos)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| TallyError::storage("writing todo list", &self.path, e))
    }
}

#[async_trait]
impl ListStore for TodoStore {
    async fn load(&self) -> TallyResult<Vec<Todo>> {
        if let Some(todos) = self.cache.get() {
            return Ok(todos);
        }

        let todos = self.read_list().await?;
        self.cache.put(todos.clone());
        Ok(todos)
    }

    async fn count(&self) -> TallyResult<usize> {
        Ok(self.load().await?.len())
    }

    async fn append(&self, title: &str) -> TallyResult<Todo> {
        let mut todos = self.load().await?;
        let todo = Todo::new(unique_token(&todos), title.to_string());
        todos.push(todo.clone());

        self.write_list(&todos).await?;
        self.cache.invalidate();
        debug!("Appended todo {} ({})", todo.id, todo.title);
        Ok(todo)
    }

    async fn retitle(&self, id: &str, title: &str) -> TallyResult<Todo> {
        let mut todos = self.load().await?;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TallyError::TodoNotFound(id.to_string()))?;
        todo.title = title.to_string();
        let updated = todo.clone();

        self.write_list(&todos).await?;
        self.cache.invalidate();
        debug!("Retitled todo {}", updated.id);
        Ok(updated)
    }

    async fn remove(&self, id: &str) -> TallyResult<Todo> {
        let mut todos = self.load().await?;
        let pos = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TallyError::TodoNotFound(id.to_string()))?;
        let removed = todos.remove(pos);

        self.write_list(&todos).await?;
        self.cache.invalidate();
        debug!("Removed todo {}", removed.id);
        Ok(removed)
    }

    fn tag(&self) -> &str {
        self.cache.tag()
    }
}

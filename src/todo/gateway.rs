//! Validated mutation boundary for the todo list
//!
//! The gateway is the only place untrusted user text enters the system.
//! Each mutation is two steps: validate, then commit. Validation failures
//! return before any write is attempted. The store is an injected
//! dependency, and an optional on-change hook fires with the store's cache
//! tag after each successful commit so the presentation layer knows to
//! re-read.

use crate::error::{TallyError, TallyResult};
use crate::todo::store::{ListStore, Todo};
use tracing::info;

type OnChange = Box<dyn Fn(&str) + Send + Sync>;

/// Mutation gateway over an injected [`ListStore`]
pub struct TodoGateway<S: ListStore> {
    store: S,
    on_change: Option<OnChange>,
}

impl<S: ListStore> TodoGateway<S> {
    /// Create a gateway with no change hook
    pub fn new(store: S) -> Self {
        Self {
            store,
            on_change: None,
        }
    }

    /// Register the hook fired with the cache tag after successful commits
    pub fn with_on_change(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// The underlying store, for reads
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Trim and validate raw user text, then append a record.
    ///
    /// Not idempotent: submitting the same title twice creates two records
    /// with distinct ids. This mirrors at-least-once user submission, not
    /// deduplication.
    pub async fn submit_title(&self, raw: &str) -> TallyResult<Todo> {
        let title = validate_title(raw)?;
        let todo = self.store.append(title).await?;
        info!("Created todo {}", todo.id);
        self.notify();
        Ok(todo)
    }

    /// Replace an existing record's title, validated like `submit_title`
    pub async fn retitle(&self, id: &str, raw: &str) -> TallyResult<Todo> {
        let title = validate_title(raw)?;
        let todo = self.store.retitle(id, title).await?;
        info!("Retitled todo {}", todo.id);
        self.notify();
        Ok(todo)
    }

    /// Delete a record by id
    pub async fn remove(&self, id: &str) -> TallyResult<Todo> {
        let todo = self.store.remove(id).await?;
        info!("Removed todo {}", todo.id);
        self.notify();
        Ok(todo)
    }

    fn notify(&self) {
        if let Some(hook) = &self.on_change {
            hook(self.store.tag());
        }
    }
}

/// Trimmed title, or `Validation` before any write happens
fn validate_title(raw: &str) -> TallyResult<&str> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TallyError::validation("title is empty"));
    }
    Ok(title)
}

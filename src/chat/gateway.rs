//! Validated mutation boundary for chat transcripts

use crate::chat::store::{Chat, ChatId, ChatStore, Message};
use crate::error::{TallyError, TallyResult};
use tracing::info;

type OnChange = Box<dyn Fn(&str) + Send + Sync>;

/// Mutation gateway over an injected [`ChatStore`]
pub struct ChatGateway {
    store: ChatStore,
    on_change: Option<OnChange>,
}

impl ChatGateway {
    /// Create a gateway with no change hook
    pub fn new(store: ChatStore) -> Self {
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
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Validate and commit one transcript.
    ///
    /// `id = None` starts a new chat for `owner`; `Some(id)` replaces that
    /// chat's history. Empty transcripts are rejected, and a new chat needs
    /// a non-blank owner; updates key on the id alone.
    pub async fn submit_transcript(
        &self,
        id: Option<ChatId>,
        owner: &str,
        messages: Vec<Message>,
    ) -> TallyResult<Chat> {
        if messages.is_empty() {
            return Err(TallyError::validation("transcript is empty"));
        }
        let owner = owner.trim();
        if id.is_none() && owner.is_empty() {
            return Err(TallyError::validation("owner is required for a new chat"));
        }

        let chat = self.store.upsert(id, owner, messages).await?;
        info!("Committed chat {}", chat.id);
        self.notify();
        Ok(chat)
    }

    fn notify(&self) {
        if let Some(hook) = &self.on_change {
            hook(self.store.tag());
        }
    }
}

//! Chat transcripts persisted as one JSON blob
//!
//! Same mechanics as the todo store: whole-blob rewrite per mutation, tagged
//! cache, no internal locking. Transcripts are upserted: a missing id
//! allocates a new chat, an existing id replaces the message history.

use crate::cache::TagCache;
use crate::error::{TallyError, TallyResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default cache tag for chat stores
pub const CHATS_TAG: &str = "chats";

/// Chat identifier, allocated sequentially per store
pub type ChatId = u64;

/// Speaker of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One persisted chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Sequential id, unique within the store
    pub id: ChatId,

    /// Derived from the first message at creation, immutable afterwards
    pub title: String,

    /// Owner key supplied by the caller
    pub owner: String,

    /// Full message history, replaced wholesale on update
    pub messages: Vec<Message>,

    /// When the chat was created
    pub created_at: DateTime<Utc>,

    /// When the transcript was last replaced
    pub updated_at: DateTime<Utc>,
}

/// Titles keep at most this many chars of the first message
const TITLE_MAX_CHARS: usize = 80;

impl Chat {
    fn new(id: ChatId, owner: String, messages: Vec<Message>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: derive_title(&messages),
            owner,
            messages,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Chat title from the opening message
fn derive_title(messages: &[Message]) -> String {
    messages
        .first()
        .map(|m| m.content.trim().chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_default()
}

/// File-backed chat transcript store
pub struct ChatStore {
    path: PathBuf,
    cache: TagCache<Vec<Chat>>,
}

impl ChatStore {
    /// Create a store over the given blob path with the default tag
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_tag(path, CHATS_TAG)
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

    /// Cache tag announced with change notifications
    pub fn tag(&self) -> &str {
        self.cache.tag()
    }

    /// Create an empty blob unless it already exists
    pub async fn init(&self) -> TallyResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TallyError::storage("creating store directory", parent, e))?;
        }

        self.write_chats(&[]).await?;
        info!("Initialized chat store at {}", self.path.display());
        Ok(true)
    }

    /// All chats, served from cache when the tag is valid
    pub async fn load(&self) -> TallyResult<Vec<Chat>> {
        if let Some(chats) = self.cache.get() {
            return Ok(chats);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| TallyError::storage("reading chats", &self.path, e))?;
        let chats: Vec<Chat> = serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;

        self.cache.put(chats.clone());
        Ok(chats)
    }

    /// One chat by id
    pub async fn get(&self, id: ChatId) -> TallyResult<Option<Chat>> {
        Ok(self.load().await?.into_iter().find(|c| c.id == id))
    }

    /// An owner's chats, most recently updated first
    pub async fn list_for(&self, owner: &str) -> TallyResult<Vec<Chat>> {
        let mut chats: Vec<Chat> = self
            .load()
            .await?
            .into_iter()
            .filter(|c| c.owner == owner)
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    /// Create or update one chat.
    ///
    /// `None` allocates the next id and derives the title from the first
    /// message; `Some(id)` replaces the transcript of the existing chat,
    /// keeps `created_at`, and bumps `updated_at`. Owner is only consulted
    /// at creation.
    pub async fn upsert(
        &self,
        id: Option<ChatId>,
        owner: &str,
        messages: Vec<Message>,
    ) -> TallyResult<Chat> {
        let mut chats = self.load().await?;

        let chat = match id {
            Some(id) => {
                let chat = chats
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(TallyError::ChatNotFound(id))?;
                chat.messages = messages;
                chat.updated_at = Utc::now();
                chat.clone()
            }
            None => {
                let next_id = chats.iter().map(|c| c.id).max().unwrap_or(0) + 1;
                let chat = Chat::new(next_id, owner.to_string(), messages);
                chats.push(chat.clone());
                chat
            }
        };

        self.write_chats(&chats).await?;
        self.cache.invalidate();
        debug!("Upserted chat {} ({} messages)", chat.id, chat.messages.len());
        Ok(chat)
    }

    async fn write_chats(&self, chats: &[Chat]) -> TallyResult<()> {
        let content = serde_json::to_string_pretty(chats)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| TallyError::storage("writing chats", &self.path, e))
    }
}

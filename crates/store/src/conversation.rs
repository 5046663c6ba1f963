//! Conversation persistence (spec §3 "Conversation"/"Message", §4.8, C8).
//!
//! `FileConversationStore` persists every conversation and its messages to
//! a single JSON file under a configured state directory, guarded by an
//! in-process `RwLock` and flushed to disk on every mutation — the same
//! shape the gateway's session store used for its own JSON-file state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use briefing_domain::error::{Error, Result};
use briefing_domain::tool::Role;
use briefing_domain::visitor::VisitorTag;

const THINKING_OPEN: &str = "[THINKING]";
const THINKING_CLOSE: &str = "[/THINKING]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Chat,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub visitor_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    /// The wire-encoded content: the plain text, or `"[THINKING]…[/THINKING]"`
    /// followed by the text when `thinking_mode` is set (spec §9).
    pub content: String,
    pub thinking_mode: bool,
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    /// Split the encoded `content` back into its thinking and plain-text
    /// halves. Returns `(None, content)` unchanged when the delimiter pair
    /// is absent, even if `thinking_mode` is set — a well-formed encoding
    /// is assumed but never required for correctness.
    pub fn decode_content(&self) -> (Option<String>, String) {
        decode_content(&self.content)
    }
}

/// Encode a thinking/text pair into the single-field wire format.
pub fn encode_content(thinking: Option<&str>, content: &str) -> String {
    match thinking {
        Some(t) if !t.is_empty() => format!("{THINKING_OPEN}{t}{THINKING_CLOSE}{content}"),
        _ => content.to_string(),
    }
}

/// Inverse of [`encode_content`].
pub fn decode_content(raw: &str) -> (Option<String>, String) {
    if let Some(rest) = raw.strip_prefix(THINKING_OPEN) {
        if let Some(idx) = rest.find(THINKING_CLOSE) {
            let thinking = rest[..idx].to_string();
            let content = rest[idx + THINKING_CLOSE.len()..].to_string();
            return (Some(thinking), content);
        }
    }
    (None, raw.to_string())
}

/// Operations the agent core consumes (spec §4.8). Every accessor that
/// takes a `visitor` filters by ownership; a conversation owned by a
/// different visitor is indistinguishable from one that doesn't exist.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(
        &self,
        visitor: &VisitorTag,
        title: String,
        conversation_type: ConversationType,
    ) -> Result<Conversation>;

    async fn get(&self, id: &str, visitor: &VisitorTag) -> Result<Option<Conversation>>;

    async fn list(
        &self,
        visitor: &VisitorTag,
        offset: usize,
        limit: usize,
        conversation_type: Option<ConversationType>,
    ) -> Result<Vec<Conversation>>;

    async fn update_title(&self, id: &str, title: String, visitor: &VisitorTag) -> Result<()>;

    async fn delete(&self, id: &str, visitor: &VisitorTag) -> Result<()>;

    async fn touch(&self, id: &str) -> Result<()>;

    async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        thinking: Option<&str>,
    ) -> Result<StoredMessage>;

    async fn recent_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<StoredMessage>>;
}

#[derive(Default, Serialize, Deserialize)]
struct FileState {
    conversations: HashMap<String, Conversation>,
    /// Messages ordered by insertion (== timestamp ascending) per conversation.
    messages: HashMap<String, Vec<StoredMessage>>,
}

/// JSON-file-backed [`ConversationStore`], one state file under the
/// configured directory, held in memory behind an `RwLock` and flushed on
/// every mutating call.
pub struct FileConversationStore {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileConversationStore {
    pub fn new(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir).map_err(Error::Io)?;
        let path = state_dir.join("conversations.json");
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(Error::Io)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            FileState::default()
        };
        tracing::info!(conversations = state.conversations.len(), path = %path.display(), "conversation store loaded");
        Ok(Self { path, state: RwLock::new(state) })
    }

    fn flush(&self, state: &FileState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json).map_err(Error::Io)?;
        Ok(())
    }

    fn owned<'a>(state: &'a FileState, id: &str, visitor: &VisitorTag) -> Option<&'a Conversation> {
        state
            .conversations
            .get(id)
            .filter(|c| c.visitor_id == visitor.as_str_repr())
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn create_conversation(
        &self,
        visitor: &VisitorTag,
        title: String,
        conversation_type: ConversationType,
    ) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            visitor_id: visitor.as_str_repr().to_string(),
            title,
            conversation_type,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write();
        state.conversations.insert(conversation.id.clone(), conversation.clone());
        state.messages.insert(conversation.id.clone(), Vec::new());
        self.flush(&state)?;
        Ok(conversation)
    }

    async fn get(&self, id: &str, visitor: &VisitorTag) -> Result<Option<Conversation>> {
        let state = self.state.read();
        Ok(Self::owned(&state, id, visitor).cloned())
    }

    async fn list(
        &self,
        visitor: &VisitorTag,
        offset: usize,
        limit: usize,
        conversation_type: Option<ConversationType>,
    ) -> Result<Vec<Conversation>> {
        let state = self.state.read();
        let mut matching: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.visitor_id == visitor.as_str_repr())
            .filter(|c| conversation_type.map_or(true, |t| t == c.conversation_type))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_title(&self, id: &str, title: String, visitor: &VisitorTag) -> Result<()> {
        let mut state = self.state.write();
        if Self::owned(&state, id, visitor).is_none() {
            return Err(Error::OwnershipMismatch);
        }
        let conversation = state.conversations.get_mut(id).expect("checked above");
        conversation.title = title;
        conversation.updated_at = Utc::now();
        self.flush(&state)
    }

    async fn delete(&self, id: &str, visitor: &VisitorTag) -> Result<()> {
        let mut state = self.state.write();
        if Self::owned(&state, id, visitor).is_none() {
            return Err(Error::OwnershipMismatch);
        }
        state.conversations.remove(id);
        state.messages.remove(id);
        self.flush(&state)
    }

    async fn touch(&self, id: &str) -> Result<()> {
        let mut state = self.state.write();
        let Some(conversation) = state.conversations.get_mut(id) else {
            return Err(Error::OwnershipMismatch);
        };
        conversation.updated_at = Utc::now();
        self.flush(&state)
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        thinking: Option<&str>,
    ) -> Result<StoredMessage> {
        let mut state = self.state.write();
        if !state.conversations.contains_key(conversation_id) {
            return Err(Error::OwnershipMismatch);
        }

        let message = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: encode_content(thinking, content),
            thinking_mode: thinking.is_some_and(|t| !t.is_empty()),
            timestamp: Utc::now(),
        };

        state.messages.entry(conversation_id.to_string()).or_default().push(message.clone());
        if let Some(conversation) = state.conversations.get_mut(conversation_id) {
            conversation.updated_at = message.timestamp;
        }
        self.flush(&state)?;
        Ok(message)
    }

    async fn recent_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<StoredMessage>> {
        let state = self.state.read();
        let Some(all) = state.messages.get(conversation_id) else { return Ok(Vec::new()) };
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor() -> VisitorTag {
        VisitorTag::new()
    }

    #[test]
    fn encode_decode_round_trips_thinking_and_content() {
        let encoded = encode_content(Some("pondering"), "the answer is 4");
        assert_eq!(encoded, "[THINKING]pondering[/THINKING]the answer is 4");
        let (thinking, content) = decode_content(&encoded);
        assert_eq!(thinking.as_deref(), Some("pondering"));
        assert_eq!(content, "the answer is 4");
    }

    #[test]
    fn encode_without_thinking_is_unwrapped_content() {
        let encoded = encode_content(None, "plain text");
        assert_eq!(encoded, "plain text");
        let (thinking, content) = decode_content(&encoded);
        assert!(thinking.is_none());
        assert_eq!(content, "plain text");
    }

    #[tokio::test]
    async fn create_get_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConversationStore::new(dir.path()).unwrap();
        let visitor = visitor();

        let conv = store
            .create_conversation(&visitor, "hello".into(), ConversationType::Chat)
            .await
            .unwrap();
        let fetched = store.get(&conv.id, &visitor).await.unwrap().unwrap();
        assert_eq!(fetched.title, "hello");

        let listed = store.list(&visitor, 0, 10, None).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn get_returns_none_for_mismatched_visitor() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConversationStore::new(dir.path()).unwrap();
        let owner = visitor();
        let intruder = visitor();

        let conv = store.create_conversation(&owner, "mine".into(), ConversationType::Chat).await.unwrap();
        assert!(store.get(&conv.id, &intruder).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_title_rejects_mismatched_visitor() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConversationStore::new(dir.path()).unwrap();
        let owner = visitor();
        let intruder = visitor();

        let conv = store.create_conversation(&owner, "mine".into(), ConversationType::Chat).await.unwrap();
        let err = store.update_title(&conv.id, "stolen".into(), &intruder).await.unwrap_err();
        assert!(matches!(err, Error::OwnershipMismatch));
    }

    #[tokio::test]
    async fn messages_append_and_recent_ordered_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConversationStore::new(dir.path()).unwrap();
        let visitor = visitor();
        let conv = store.create_conversation(&visitor, "chat".into(), ConversationType::Chat).await.unwrap();

        store.append_message(&conv.id, Role::User, "hi", None).await.unwrap();
        store.append_message(&conv.id, Role::Assistant, "hello", Some("thinking first")).await.unwrap();

        let recent = store.recent_messages(&conv.id, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].role, Role::User);
        assert!(recent[1].thinking_mode);
        assert_eq!(recent[1].decode_content().0.as_deref(), Some("thinking first"));
    }

    #[tokio::test]
    async fn recent_messages_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConversationStore::new(dir.path()).unwrap();
        let visitor = visitor();
        let conv = store.create_conversation(&visitor, "chat".into(), ConversationType::Chat).await.unwrap();
        for i in 0..5 {
            store.append_message(&conv.id, Role::User, &format!("msg {i}"), None).await.unwrap();
        }
        let recent = store.recent_messages(&conv.id, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "msg 3");
        assert_eq!(recent[1].content, "msg 4");
    }
}

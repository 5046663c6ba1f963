//! Conversation persistence (spec §4.8, C8): ownership-checked CRUD over
//! conversations and their messages, backed by a JSON state file.

pub mod conversation;

pub use conversation::{
    decode_content, encode_content, Conversation, ConversationStore, ConversationType,
    FileConversationStore, StoredMessage,
};

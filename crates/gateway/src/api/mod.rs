pub mod chat;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod rss_cache;
pub mod visitor;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the full API router (spec §6): the streaming chat endpoint, the
/// conversation/message CRUD surface, and the on-demand RSS cache trigger,
/// all behind the visitor-identity middleware (C10).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/chat/stream", post(chat::stream_chat))
        .route("/conversations", post(conversations::create_conversation))
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/:id", get(conversations::get_conversation))
        .route("/conversations/:id", delete(conversations::delete_conversation))
        .route("/conversations/:id/title", put(conversations::update_title))
        .route("/conversations/:id/generate-title", post(conversations::generate_title))
        .route("/conversations/:id/messages", get(messages::list_messages))
        .route("/agent/rss-cache/generate", post(rss_cache::generate_rss_cache))
        .layer(middleware::from_fn(visitor::visitor_middleware))
}

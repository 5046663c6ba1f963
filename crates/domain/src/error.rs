//! Shared error type for the Agent Execution Core (spec §7).
//!
//! Every crate boundary returns this one `thiserror`-derived enum; the
//! gateway's `IntoResponse` impl maps each variant to the wire status code
//! named in §7. `anyhow` is used only at the CLI/binary edge.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    /// Caller does not own the conversation they are addressing. Surfaced
    /// as 404, never 403 — we do not disclose existence of other visitors'
    /// conversations.
    #[error("not found or access denied")]
    OwnershipMismatch,

    /// Malformed request body. Surfaced as 422 with field-level detail.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Raised by a tool handler; captured by the agent loop and folded
    /// into a tool-role message so the LLM can recover.
    #[error("tool failure: {0}")]
    ToolFailure(String),

    /// The LLM requested a tool name that isn't registered. Treated as a
    /// `ToolFailure` with an explanatory message; the loop continues.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Exceeded the per-request LLM wall-clock timeout. Retried with
    /// bounded exponential backoff before surfacing.
    #[error("LLM timeout: {0}")]
    LlmTimeout(String),

    /// Connection-level failure talking to an LLM provider. Same retry
    /// policy as `LlmTimeout`.
    #[error("LLM transport error: {0}")]
    LlmTransport(String),

    /// Non-retriable provider error (bad request, auth failure, etc.).
    #[error("provider {provider}: {message}")]
    LlmProviderError { provider: String, message: String },

    /// `fetch_rss_news` was called before the cache job has ever run.
    #[error("rss cache missing: {0}")]
    CacheMissing(String),

    /// Tool-call arguments were not valid JSON; the loop substitutes `{}`
    /// and continues rather than failing the turn.
    #[error("could not decode tool arguments: {0}")]
    SchemaDecodeError(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error should be retried by the LLM client's bounded
    /// backoff policy (spec §4.7: timeout and transport errors retry,
    /// provider errors do not).
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::LlmTimeout(_) | Error::LlmTransport(_))
    }
}

//! Generic OpenAI-compatible adapter (spec §4.7) — works against OpenAI
//! itself and any endpoint implementing the same chat-completions contract
//! (vLLM, Ollama's OpenAI-compat surface, etc).

use std::time::Duration;

use serde_json::Value;

use briefing_domain::config::{LlmConfig, ProviderConfig};
use briefing_domain::error::{Error, Result};
use briefing_domain::stream::{BoxStream, StreamEvent, Usage};
use briefing_domain::tool::{ContentPart, Message, MessageContent, Role, ToolDefinition};

use crate::retry::with_backoff;
use crate::traits::{ChatOptions, LlmProvider};
use crate::util::{from_reqwest, resolve_api_key};

pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiCompatProvider {
    pub fn from_config(cfg: &ProviderConfig, llm: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(cfg)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(llm.default_timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.default_model.clone().unwrap_or_else(|| "gpt-4o".into()),
            client,
            max_retries: llm.max_retries,
            retry_delay: Duration::from_millis(llm.retry_delay_ms),
        })
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
    }

    fn build_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &ChatOptions,
        stream: bool,
    ) -> Value {
        let model = options.model.clone().unwrap_or_else(|| self.default_model.clone());
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages.iter().map(msg_to_openai).collect::<Vec<_>>(),
            "stream": stream,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_to_openai).collect());
        }
        if let Some(t) = options.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(m) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(m);
        }
        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }
        body
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn msg_to_openai(msg: &Message) -> Value {
    match msg.role {
        Role::Tool => tool_result_to_openai(msg),
        Role::Assistant => assistant_to_openai(msg),
        _ => serde_json::json!({ "role": role_str(msg.role), "content": msg.content.extract_all_text() }),
    }
}

fn assistant_to_openai(msg: &Message) -> Value {
    let mut obj = serde_json::json!({ "role": "assistant" });
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    match &msg.content {
        MessageContent::Text(t) => text_parts.push(t.clone()),
        MessageContent::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => text_parts.push(text.clone()),
                    ContentPart::ToolUse { id, name, input } => tool_calls.push(serde_json::json!({
                        "id": id,
                        "type": "function",
                        "function": { "name": name, "arguments": input.to_string() },
                    })),
                    _ => {}
                }
            }
        }
    }
    // Always a string, never absent — some providers reject null content on
    // a subsequent turn even when tool_calls are present (spec §4.6).
    obj["content"] = Value::String(text_parts.join("\n"));
    if !tool_calls.is_empty() {
        obj["tool_calls"] = Value::Array(tool_calls);
    }
    obj
}

fn tool_result_to_openai(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Parts(parts) => {
            for part in parts {
                if let ContentPart::ToolResult { tool_use_id, content, .. } = part {
                    return serde_json::json!({ "role": "tool", "tool_call_id": tool_use_id, "content": content });
                }
            }
            serde_json::json!({ "role": "tool", "tool_call_id": "", "content": "" })
        }
        MessageContent::Text(t) => serde_json::json!({ "role": "tool", "tool_call_id": "", "content": t }),
    }
}

fn tool_to_openai(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "type": "function",
        "function": { "name": tool.name, "description": tool.description, "parameters": tool.parameters },
    })
}

fn parse_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Parse one SSE `data:` payload into zero or more events. OpenAI's
/// `tool_calls` deltas are already keyed by a stable `index`, matching the
/// tagged `ToolCallFragment` shape directly (spec §4.6).
fn parse_sse_event(data: &str) -> Vec<Result<StreamEvent>> {
    if data.trim() == "[DONE]" {
        return vec![Ok(StreamEvent::Done { usage: None, finish_reason: Some("stop".into()) })];
    }
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };

    let choice = v.get("choices").and_then(|c| c.as_array()).and_then(|a| a.first());
    let Some(choice) = choice else {
        if let Some(usage) = v.get("usage").and_then(parse_usage) {
            return vec![Ok(StreamEvent::Done { usage: Some(usage), finish_reason: None })];
        }
        return Vec::new();
    };

    if let Some(reason) = choice.get("finish_reason").and_then(|v| v.as_str()) {
        let usage = v.get("usage").and_then(parse_usage);
        return vec![Ok(StreamEvent::Done { usage, finish_reason: Some(reason.to_string()) })];
    }

    let delta = choice.get("delta").unwrap_or(&Value::Null);
    let mut events = Vec::new();

    if let Some(reasoning) = delta.get("reasoning_content").and_then(|v| v.as_str()) {
        if !reasoning.is_empty() {
            events.push(Ok(StreamEvent::Thinking { text: reasoning.to_string() }));
        }
    }
    if let Some(text) = delta.get("content").and_then(|v| v.as_str()) {
        if !text.is_empty() {
            events.push(Ok(StreamEvent::Token { text: text.to_string() }));
        }
    }
    if let Some(tc_arr) = delta.get("tool_calls").and_then(|v| v.as_array()) {
        for tc in tc_arr {
            let index = tc.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            let id = tc.get("id").and_then(|v| v.as_str()).map(String::from);
            let name = tc
                .get("function")
                .and_then(|f| f.get("name"))
                .and_then(|v| v.as_str())
                .map(String::from);
            let arguments_delta = tc
                .get("function")
                .and_then(|f| f.get("arguments"))
                .and_then(|v| v.as_str())
                .map(String::from);
            if id.is_some() || name.is_some() || arguments_delta.is_some() {
                events.push(Ok(StreamEvent::ToolCallFragment { index, id, name, arguments_delta }));
            }
        }
    }
    events
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(messages, tools, options, true);
        let resp = with_backoff(self.max_retries, self.retry_delay, || async {
            self.authed_post(&url).json(&body).send().await.map_err(from_reqwest)
        })
        .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::LlmProviderError {
                provider: self.id.clone(),
                message: format!("HTTP {} - {text}", status.as_u16()),
            });
        }
        Ok(crate::sse::sse_response_stream(resp, parse_sse_event))
    }

    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(messages, &[], options, false);
        let resp = with_backoff(self.max_retries, self.retry_delay, || async {
            self.authed_post(&url).json(&body).send().await.map_err(from_reqwest)
        })
        .await?;
        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            return Err(Error::LlmProviderError {
                provider: self.id.clone(),
                message: format!("HTTP {} - {text}", status.as_u16()),
            });
        }
        let body: Value = serde_json::from_str(&text)?;
        let content = body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        Ok(content)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_sentinel_emits_done_event() {
        let events = parse_sse_event("[DONE]");
        assert!(matches!(events[0], Ok(StreamEvent::Done { .. })));
    }

    #[test]
    fn tool_call_delta_carries_index() {
        let data = r#"{"choices":[{"delta":{"tool_calls":[{"index":2,"id":"call_2","function":{"name":"filter_rss_news","arguments":""}}]}}]}"#;
        let events = parse_sse_event(data);
        match &events[0] {
            Ok(StreamEvent::ToolCallFragment { index, id, name, .. }) => {
                assert_eq!(*index, 2);
                assert_eq!(id.as_deref(), Some("call_2"));
                assert_eq!(name.as_deref(), Some("filter_rss_news"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn text_delta_emits_token() {
        let data = r#"{"choices":[{"delta":{"content":"hello"}}]}"#;
        let events = parse_sse_event(data);
        assert!(matches!(&events[0], Ok(StreamEvent::Token { text }) if text == "hello"));
    }
}

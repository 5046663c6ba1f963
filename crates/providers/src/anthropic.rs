//! Anthropic Messages API adapter — the "thinking-capable" provider (spec
//! §4.7): reasoning is surfaced on its own `StreamEvent::Thinking` channel,
//! distinct from `StreamEvent::Token`, end to end.

use std::time::Duration;

use serde_json::Value;

use briefing_domain::config::{LlmConfig, ProviderConfig};
use briefing_domain::error::{Error, Result};
use briefing_domain::stream::{BoxStream, StreamEvent, Usage};
use briefing_domain::tool::{ContentPart, Message, MessageContent, Role, ToolDefinition};

use crate::retry::with_backoff;
use crate::traits::{ChatOptions, LlmProvider};
use crate::util::{from_reqwest, resolve_api_key};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl AnthropicProvider {
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
            default_model: cfg
                .default_model
                .clone()
                .unwrap_or_else(|| "claude-sonnet-4-20250514".into()),
            client,
            max_retries: llm.max_retries,
            retry_delay: Duration::from_millis(llm.retry_delay_ms),
        })
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

        let mut system_parts = Vec::new();
        let mut api_messages = Vec::new();
        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.extract_all_text()),
                Role::User => api_messages.push(user_msg(msg)),
                Role::Assistant => api_messages.push(assistant_msg(msg)),
                Role::Tool => api_messages.push(tool_result_msg(msg)),
            }
        }

        let mut body = serde_json::json!({
            "model": model,
            "messages": api_messages,
            "stream": stream,
            "max_tokens": options.max_tokens.unwrap_or(4096),
        });
        if !system_parts.is_empty() {
            body["system"] = Value::String(system_parts.join("\n\n"));
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_spec).collect());
        }
        if let Some(temp) = options.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if options.thinking_enabled {
            body["thinking"] = serde_json::json!({ "type": "enabled", "budget_tokens": 4096 });
        }
        body
    }
}

fn user_msg(msg: &Message) -> Value {
    serde_json::json!({ "role": "user", "content": msg.content.extract_all_text() })
}

fn assistant_msg(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Text(t) => serde_json::json!({
            "role": "assistant",
            "content": [{"type": "text", "text": t}],
        }),
        MessageContent::Parts(parts) => {
            let content: Vec<Value> = parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(serde_json::json!({"type": "text", "text": text})),
                    ContentPart::ToolUse { id, name, input } => Some(serde_json::json!({
                        "type": "tool_use", "id": id, "name": name, "input": input,
                    })),
                    _ => None,
                })
                .collect();
            serde_json::json!({ "role": "assistant", "content": content })
        }
    }
}

fn tool_result_msg(msg: &Message) -> Value {
    let content = match &msg.content {
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::ToolResult { tool_use_id, content, is_error } => Some(serde_json::json!({
                    "type": "tool_result", "tool_use_id": tool_use_id, "content": content, "is_error": is_error,
                })),
                _ => None,
            })
            .collect(),
        MessageContent::Text(t) => vec![serde_json::json!({"type": "tool_result", "tool_use_id": "", "content": t})],
    };
    serde_json::json!({ "role": "user", "content": content })
}

fn tool_spec(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.parameters,
    })
}

fn parse_usage(v: &Value) -> Option<Usage> {
    let input = v.get("input_tokens")?.as_u64()? as u32;
    let output = v.get("output_tokens")?.as_u64()? as u32;
    Some(Usage { prompt_tokens: input, completion_tokens: output, total_tokens: input + output })
}

/// Tracks in-flight content-block indices while assembling a streamed
/// tool call (spec §4.6 "Tool-call stream reconstruction").
#[derive(Default)]
struct StreamState {
    usage: Option<Usage>,
}

fn parse_sse_event(data: &str, state: &mut StreamState) -> Vec<Result<StreamEvent>> {
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };
    let event_type = v.get("type").and_then(|v| v.as_str()).unwrap_or("");

    match event_type {
        "message_start" => {
            if let Some(msg) = v.get("message") {
                state.usage = msg.get("usage").and_then(parse_usage);
            }
            Vec::new()
        }
        "content_block_start" => {
            let index = v.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            let Some(block) = v.get("content_block") else { return Vec::new() };
            if block.get("type").and_then(|v| v.as_str()) == Some("tool_use") {
                vec![Ok(StreamEvent::ToolCallFragment {
                    index,
                    id: block.get("id").and_then(|v| v.as_str()).map(String::from),
                    name: block.get("name").and_then(|v| v.as_str()).map(String::from),
                    arguments_delta: None,
                })]
            } else {
                Vec::new()
            }
        }
        "content_block_delta" => {
            let index = v.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            let Some(delta) = v.get("delta") else { return Vec::new() };
            match delta.get("type").and_then(|v| v.as_str()).unwrap_or("") {
                "text_delta" => {
                    let text = delta.get("text").and_then(|v| v.as_str()).unwrap_or("");
                    if text.is_empty() { Vec::new() } else { vec![Ok(StreamEvent::Token { text: text.into() })] }
                }
                "thinking_delta" => {
                    let text = delta.get("thinking").and_then(|v| v.as_str()).unwrap_or("");
                    if text.is_empty() { Vec::new() } else { vec![Ok(StreamEvent::Thinking { text: text.into() })] }
                }
                "input_json_delta" => {
                    let partial = delta.get("partial_json").and_then(|v| v.as_str()).unwrap_or("");
                    vec![Ok(StreamEvent::ToolCallFragment {
                        index,
                        id: None,
                        name: None,
                        arguments_delta: Some(partial.to_string()),
                    })]
                }
                _ => Vec::new(),
            }
        }
        "message_delta" => {
            if let Some(output) = v.get("usage").and_then(|u| u.get("output_tokens")).and_then(|v| v.as_u64()) {
                if let Some(u) = state.usage.as_mut() {
                    u.completion_tokens = output as u32;
                    u.total_tokens = u.prompt_tokens + u.completion_tokens;
                }
            }
            let stop_reason = v
                .get("delta")
                .and_then(|d| d.get("stop_reason"))
                .and_then(|v| v.as_str())
                .map(normalize_finish_reason);
            match stop_reason {
                Some(reason) => vec![Ok(StreamEvent::Done { usage: state.usage.clone(), finish_reason: Some(reason) })],
                None => Vec::new(),
            }
        }
        "error" => {
            let message = v
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            vec![Ok(StreamEvent::Error { message: message.to_string() })]
        }
        _ => Vec::new(),
    }
}

fn normalize_finish_reason(s: &str) -> String {
    match s {
        "end_turn" => "stop".to_string(),
        "tool_use" => "tool_calls".to_string(),
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let url = format!("{}/v1/messages", self.base_url);
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

        let mut state = StreamState::default();
        Ok(crate::sse::sse_response_stream(resp, move |data| parse_sse_event(data, &mut state)))
    }

    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
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
            .get("content")
            .and_then(|v| v.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b.get("text").and_then(|v| v.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
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
    fn thinking_delta_emits_distinct_channel() {
        let mut state = StreamState::default();
        let events = parse_sse_event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"pondering"}}"#,
            &mut state,
        );
        assert!(matches!(events[0], Ok(StreamEvent::Thinking { .. })));
    }

    #[test]
    fn tool_use_block_start_emits_indexed_fragment_with_name() {
        let mut state = StreamState::default();
        let events = parse_sse_event(
            r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"call_1","name":"fetch_rss_news"}}"#,
            &mut state,
        );
        match &events[0] {
            Ok(StreamEvent::ToolCallFragment { index, id, name, .. }) => {
                assert_eq!(*index, 1);
                assert_eq!(id.as_deref(), Some("call_1"));
                assert_eq!(name.as_deref(), Some("fetch_rss_news"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn stop_reason_maps_tool_use_to_tool_calls() {
        assert_eq!(normalize_finish_reason("tool_use"), "tool_calls");
        assert_eq!(normalize_finish_reason("end_turn"), "stop");
    }
}

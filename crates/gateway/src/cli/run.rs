//! `briefing-gateway run` — one-shot execution command.
//!
//! Sends a single message to the agent, streams the response to stdout, and
//! exits. Useful for scripting, piping, and quick CLI interactions without
//! standing up the HTTP server.

use std::io::Write;
use std::sync::Arc;

use briefing_domain::agent_event::AgentEvent;
use briefing_domain::config::Config;
use briefing_domain::tool::{Message, MessageContent, Role};
use briefing_domain::visitor::VisitorTag;
use briefing_store::{decode_content, ConversationType};

use crate::bootstrap;
use crate::runtime::{run_agent_loop, CancelToken};

const SYSTEM_DIRECTIVE: &str = "\
You are a helpful assistant with access to a small set of tools for reading \
a daily-cached RSS news digest and analyzing uploaded documents. Use a tool \
only when it would materially improve your answer; otherwise respond directly.";

pub async fn run(
    config: Arc<Config>,
    message: String,
    conversation_id: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config).await?;
    let visitor = VisitorTag::new();

    let conversation = match conversation_id {
        Some(id) => state
            .store
            .get(&id, &visitor)
            .await?
            .ok_or_else(|| anyhow::anyhow!("conversation {id} not found for this CLI invocation"))?,
        None => state.store.create_conversation(&visitor, "CLI session".into(), ConversationType::Chat).await?,
    };

    let history = state.store.recent_messages(&conversation.id, state.config.sessions.max_history_messages).await?;
    state.store.append_message(&conversation.id, Role::User, &message, None).await?;

    let mut messages = vec![Message::system(SYSTEM_DIRECTIVE)];
    for stored in &history {
        let (_thinking, content) = decode_content(&stored.content);
        messages.push(Message { role: stored.role, content: MessageContent::Text(content) });
    }
    messages.push(Message::user(message));

    let (provider, mut options) = state.llm.resolve(&state.config.llm.agent_model)?;
    options.temperature = Some(state.config.llm.temperature);
    options.max_tokens = state.config.llm.max_tokens;

    let mut rx = run_agent_loop(
        provider,
        state.tools.clone(),
        state.tool_defs.as_ref().clone(),
        messages,
        options,
        state.config.llm.max_loop_iterations,
        CancelToken::new(),
    );

    let mut exit_code = 0;
    let mut collected: Vec<AgentEvent> = Vec::new();
    let mut thinking = String::new();
    let mut text = String::new();

    while let Some(event) = rx.recv().await {
        match &event {
            AgentEvent::Thinking { content } => thinking.push_str(content),
            AgentEvent::Delta { content } => text.push_str(content),
            AgentEvent::Error { content } => {
                eprintln!("error: {content}");
                exit_code = 1;
            }
            AgentEvent::ToolCall { tool_name, .. } => {
                if !json_output {
                    eprintln!("\x1b[2m[tool: {tool_name}]\x1b[0m");
                }
            }
            AgentEvent::ToolResult { .. } | AgentEvent::Done => {}
        }

        if json_output {
            collected.push(event);
        } else {
            match &event {
                AgentEvent::Delta { content } => {
                    print!("{content}");
                    std::io::stdout().flush().ok();
                }
                AgentEvent::Thinking { content } => {
                    eprint!("\x1b[2m{content}\x1b[0m");
                    std::io::stderr().flush().ok();
                }
                AgentEvent::Done => println!(),
                _ => {}
            }
        }
    }

    if let Err(e) = state.store.append_message(&conversation.id, Role::Assistant, &text, (!thinking.is_empty()).then_some(thinking.as_str())).await {
        tracing::warn!(error = %e, "failed to persist CLI turn");
    }

    if json_output {
        let out = serde_json::to_string_pretty(&collected)?;
        println!("{out}");
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

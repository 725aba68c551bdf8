//! Agent — the external reasoning collaborator.
//!
//! The session pipeline only sees the [`Agent`] trait: hand it a directive and a
//! role-tagged conversation, get back the conversation extended with whatever the
//! run produced (tool calls, tool results, final reply).
//!
//! `AppState` holds an `Arc<dyn Agent>`; production wires [`claude::ClaudeAgent`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::tool::{extract_application_info, ApplicationInfoArgs, TOOL_NAME};
use crate::llm_client::LlmError;

pub mod claude;

#[cfg(test)]
pub mod testing;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// One message of an agent conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentMessage {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

impl AgentMessage {
    pub fn user(content: impl Into<String>) -> Self {
        AgentMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        AgentMessage::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        AgentMessage::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

/// The agent trait. Implement this to swap reasoning backends without touching
/// the session pipeline or handlers.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Runs the agent to completion.
    ///
    /// The returned list starts with `messages` and ends with the assistant's
    /// human-readable reply; tool results produced along the way sit in between.
    async fn invoke(
        &self,
        system: &str,
        messages: Vec<AgentMessage>,
    ) -> Result<Vec<AgentMessage>, LlmError>;
}

/// Executes a model-requested tool call and returns the tool-result text.
/// Unknown tools and malformed arguments yield an error string, not a failure.
pub fn dispatch_tool_call(call: &ToolCall) -> String {
    if call.name != TOOL_NAME {
        warn!(tool = %call.name, "agent requested an unknown tool");
        return format!("Error: unknown tool '{}'", call.name);
    }

    match serde_json::from_value::<ApplicationInfoArgs>(call.input.clone()) {
        Ok(args) => extract_application_info(&args),
        Err(e) => {
            warn!("agent sent malformed tool arguments: {e}");
            format!("Error: invalid arguments for {TOOL_NAME}: {e}")
        }
    }
}

/// The human-readable reply at the end of an agent run.
pub fn final_reply(messages: &[AgentMessage]) -> Option<&str> {
    match messages.last() {
        Some(AgentMessage::Assistant { content, .. }) if !content.trim().is_empty() => {
            Some(content.as_str())
        }
        _ => None,
    }
}

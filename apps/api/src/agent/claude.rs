//! Claude-backed agent: a tool-calling loop over the Messages API.
//!
//! Each model turn either answers in plain text (the run ends) or requests tool
//! calls. Tool calls are executed locally through [`dispatch_tool_call`] and fed
//! back as `tool_result` blocks before the next model turn.

use async_trait::async_trait;
use tracing::debug;

use crate::agent::{dispatch_tool_call, Agent, AgentMessage, ToolCall};
use crate::application::tool::tool_definition;
use crate::llm_client::{ApiMessage, ContentBlock, LlmClient, LlmError, ToolDefinition};

/// The Messages API requires the conversation to open with a user turn. A session
/// whose first turn is an assistant reply (after a résumé upload) gets this opener.
const CONVERSATION_OPENER: &str = "I uploaded my resume.";

pub struct ClaudeAgent {
    llm: LlmClient,
    tools: Vec<ToolDefinition>,
    max_steps: usize,
}

impl ClaudeAgent {
    pub fn new(llm: LlmClient, max_steps: usize) -> Self {
        Self {
            llm,
            tools: vec![tool_definition()],
            max_steps: max_steps.max(1),
        }
    }
}

#[async_trait]
impl Agent for ClaudeAgent {
    async fn invoke(
        &self,
        system: &str,
        messages: Vec<AgentMessage>,
    ) -> Result<Vec<AgentMessage>, LlmError> {
        let mut conversation = messages;

        for step in 0..self.max_steps {
            let api_messages = to_api_messages(&conversation);
            let response = self.llm.call(system, &api_messages, &self.tools).await?;

            let text = response.text();
            let tool_calls: Vec<ToolCall> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| ToolCall { id, name, input })
                .collect();

            debug!(step, tool_calls = tool_calls.len(), "agent step completed");

            if tool_calls.is_empty() {
                if text.trim().is_empty() {
                    return Err(LlmError::EmptyContent);
                }
                conversation.push(AgentMessage::assistant(text));
                return Ok(conversation);
            }

            let results: Vec<AgentMessage> = tool_calls
                .iter()
                .map(|call| AgentMessage::tool_result(call.id.clone(), dispatch_tool_call(call)))
                .collect();
            conversation.push(AgentMessage::Assistant {
                content: text,
                tool_calls,
            });
            conversation.extend(results);
        }

        Err(LlmError::StepLimit {
            steps: self.max_steps,
        })
    }
}

/// Maps the agent conversation onto Messages API turns.
///
/// Tool results travel as `user` turns; consecutive turns with the same role are
/// merged into one, and blank text blocks are dropped.
fn to_api_messages(conversation: &[AgentMessage]) -> Vec<ApiMessage> {
    let mut out: Vec<ApiMessage> = Vec::new();

    for message in conversation {
        let (role, blocks) = match message {
            AgentMessage::User { content } => ("user", text_block(content)),
            AgentMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut blocks = text_block(content);
                blocks.extend(tool_calls.iter().map(|c| ContentBlock::ToolUse {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    input: c.input.clone(),
                }));
                ("assistant", blocks)
            }
            AgentMessage::ToolResult {
                tool_use_id,
                content,
            } => (
                "user",
                vec![ContentBlock::ToolResult {
                    tool_use_id: tool_use_id.clone(),
                    content: content.clone(),
                }],
            ),
        };

        if blocks.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.role == role => last.content.extend(blocks),
            _ => out.push(ApiMessage {
                role,
                content: blocks,
            }),
        }
    }

    if out.first().is_some_and(|m| m.role == "assistant") {
        out.insert(
            0,
            ApiMessage {
                role: "user",
                content: text_block(CONVERSATION_OPENER),
            },
        );
    }

    out
}

fn text_block(text: &str) -> Vec<ContentBlock> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![ContentBlock::Text {
            text: text.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_transcript_maps_roles() {
        let api = to_api_messages(&[AgentMessage::user("hi"), AgentMessage::assistant("hello")]);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "user");
        assert_eq!(api[1].role, "assistant");
    }

    #[test]
    fn test_tool_round_trip_layout() {
        let conversation = vec![
            AgentMessage::user("I'm Jane, jane@x.com"),
            AgentMessage::Assistant {
                content: String::new(),
                tool_calls: vec![
                    ToolCall {
                        id: "a".into(),
                        name: "extract_application_info".into(),
                        input: json!({"name": "Jane"}),
                    },
                    ToolCall {
                        id: "b".into(),
                        name: "extract_application_info".into(),
                        input: json!({"email": "jane@x.com"}),
                    },
                ],
            },
            AgentMessage::tool_result("a", "SET_NAME:Jane"),
            AgentMessage::tool_result("b", "SET_EMAIL:jane@x.com"),
        ];
        let api = to_api_messages(&conversation);
        assert_eq!(api.len(), 3);
        assert_eq!(api[1].content.len(), 2);
        assert!(matches!(api[1].content[0], ContentBlock::ToolUse { .. }));
        assert_eq!(api[2].role, "user");
        assert_eq!(api[2].content.len(), 2);
    }

    #[test]
    fn test_leading_assistant_gets_opener() {
        let api = to_api_messages(&[
            AgentMessage::assistant("I parsed your resume."),
            AgentMessage::user("Thanks"),
        ]);
        assert_eq!(api.len(), 3);
        assert_eq!(api[0].role, "user");
        assert_eq!(
            api[0].content,
            vec![ContentBlock::Text {
                text: CONVERSATION_OPENER.into()
            }]
        );
    }

    #[test]
    fn test_consecutive_user_turns_merge() {
        let api = to_api_messages(&[AgentMessage::user("one"), AgentMessage::user("two")]);
        assert_eq!(api.len(), 1);
        assert_eq!(api[0].content.len(), 2);
    }

    #[test]
    fn test_max_steps_is_at_least_one() {
        let llm = LlmClient::new("k".into(), "http://localhost", "m".into()).unwrap();
        let agent = ClaudeAgent::new(llm, 0);
        assert_eq!(agent.max_steps, 1);
        assert_eq!(agent.tools.len(), 1);
    }
}

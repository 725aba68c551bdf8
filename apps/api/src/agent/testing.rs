//! Scripted in-process agent for tests. Never touches the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::agent::{dispatch_tool_call, Agent, AgentMessage, ToolCall};
use crate::application::tool::{ApplicationInfoArgs, TOOL_NAME};
use crate::llm_client::LlmError;

pub enum ScriptedRun {
    /// Calls the application tool once per entry, then replies.
    Reply {
        tool_calls: Vec<ApplicationInfoArgs>,
        reply: String,
    },
    Fail(String),
    /// Never finishes within any sane timeout.
    Hang,
}

impl ScriptedRun {
    pub fn reply(reply: &str) -> Self {
        ScriptedRun::Reply {
            tool_calls: Vec::new(),
            reply: reply.to_string(),
        }
    }

    pub fn save(args: ApplicationInfoArgs, reply: &str) -> Self {
        ScriptedRun::Reply {
            tool_calls: vec![args],
            reply: reply.to_string(),
        }
    }
}

#[derive(Default)]
pub struct ScriptedAgent {
    runs: Mutex<VecDeque<ScriptedRun>>,
    calls: AtomicUsize,
    last_system: Mutex<Option<String>>,
    last_messages: Mutex<Vec<AgentMessage>>,
}

impl ScriptedAgent {
    pub fn new(runs: Vec<ScriptedRun>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().unwrap().clone()
    }

    pub fn last_messages(&self) -> Vec<AgentMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn invoke(
        &self,
        system: &str,
        messages: Vec<AgentMessage>,
    ) -> Result<Vec<AgentMessage>, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().unwrap() = Some(system.to_string());
        *self.last_messages.lock().unwrap() = messages.clone();

        let run = self
            .runs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedRun::reply("OK"));

        match run {
            ScriptedRun::Reply { tool_calls, reply } => {
                let mut conversation = messages;
                for (i, args) in tool_calls.into_iter().enumerate() {
                    let call = ToolCall {
                        id: format!("toolu_{n}_{i}"),
                        name: TOOL_NAME.to_string(),
                        input: serde_json::to_value(&args).unwrap(),
                    };
                    let result = dispatch_tool_call(&call);
                    conversation.push(AgentMessage::Assistant {
                        content: String::new(),
                        tool_calls: vec![call.clone()],
                    });
                    conversation.push(AgentMessage::tool_result(call.id, result));
                }
                conversation.push(AgentMessage::assistant(reply));
                Ok(conversation)
            }
            ScriptedRun::Fail(message) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            ScriptedRun::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyContent)
            }
        }
    }
}

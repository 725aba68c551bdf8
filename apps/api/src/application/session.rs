//! Session — owns one user's application state and transcript, and runs turns.
//!
//! Every turn is computed on a working copy of the state and transcript and
//! committed only once the agent has answered. An agent failure or timeout
//! therefore leaves the session exactly as it was.
//!
//! Pipeline per turn: (regex pass) → agent → reconcile → decide effect.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{final_reply, Agent, AgentMessage};
use crate::application::extractor::extract;
use crate::application::models::{ApplicationState, ChatTranscript, Field, Role};
use crate::application::prompts::{build_directive, build_resume_prompt};
use crate::application::reconcile::sync;
use crate::documents::is_blank;
use crate::errors::AppError;

/// Knobs for one turn, derived from `Config`.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub agent_timeout: Duration,
    pub resume_prompt_chars: usize,
}

/// What the client should do after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEffect {
    /// State changed: re-render the tracker from the snapshot.
    Refresh,
    /// Nothing changed: show the reply, celebrate if the application is complete.
    Reply { ready_to_apply: bool },
    /// The turn was skipped before reaching the agent; show the notice.
    Skipped,
}

/// Per-turn orchestration decision.
pub fn decide_effect(state_changed: bool, state: &ApplicationState) -> TurnEffect {
    if state_changed {
        TurnEffect::Refresh
    } else {
        TurnEffect::Reply {
            ready_to_apply: state.is_complete(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: Option<String>,
    pub state_changed: bool,
    pub effect: TurnEffect,
    /// Fields the local regex pass filled during this turn.
    pub extracted_fields: Vec<Field>,
    pub notice: Option<String>,
}

impl TurnOutcome {
    /// A non-fatal skip: no state mutation, no agent call.
    pub fn skipped(notice: impl Into<String>) -> Self {
        Self {
            reply: None,
            state_changed: false,
            effect: TurnEffect::Skipped,
            extracted_fields: Vec::new(),
            notice: Some(notice.into()),
        }
    }
}

pub const BLANK_DOCUMENT_NOTICE: &str =
    "No text could be read from the uploaded resume, so parsing was skipped.";

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: ApplicationState,
    transcript: ChatTranscript,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: ApplicationState::new(),
            transcript: ChatTranscript::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Clears state and transcript. Nothing else is touched.
    pub fn reset(&mut self) {
        self.state.clear();
        self.transcript.clear();
        info!(session = %self.id, "session reset");
    }

    /// Chat turn: the full transcript plus the new user message goes to the agent.
    pub async fn chat(
        &mut self,
        input: &str,
        agent: &dyn Agent,
        settings: &TurnSettings,
    ) -> Result<TurnOutcome, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::Validation("message cannot be empty".to_string()));
        }

        let mut state = self.state.clone();
        let mut transcript = self.transcript.clone();
        transcript.push(Role::User, input);

        let directive = build_directive(&state);
        let messages = run_agent(
            agent,
            &directive,
            transcript.to_agent_messages(),
            settings.agent_timeout,
        )
        .await?;

        let state_changed = sync(&mut state, &messages);
        let reply = take_reply(&messages)?;
        transcript.push(Role::Assistant, reply.clone());

        self.state = state;
        self.transcript = transcript;

        let effect = decide_effect(state_changed, &self.state);
        info!(
            session = %self.id,
            state_changed,
            ?effect,
            turns = self.transcript.len(),
            "chat turn completed"
        );

        Ok(TurnOutcome {
            reply: Some(reply),
            state_changed,
            effect,
            extracted_fields: Vec::new(),
            notice: None,
        })
    }

    /// Résumé turn: regex pass fills absent fields, then the agent reads the text.
    /// Blank text skips the turn with a notice.
    pub async fn ingest_resume_text(
        &mut self,
        text: &str,
        agent: &dyn Agent,
        settings: &TurnSettings,
    ) -> Result<TurnOutcome, AppError> {
        if is_blank(text) {
            warn!(session = %self.id, "resume text is blank, skipping parse");
            return Ok(TurnOutcome::skipped(BLANK_DOCUMENT_NOTICE));
        }

        let mut state = self.state.clone();
        let extracted = extract(text);
        if extracted.is_empty() {
            debug!(session = %self.id, "regex pass found no fields");
        }
        let extracted_fields = state.merge_absent(&extracted);

        let directive = build_directive(&state);
        let request = AgentMessage::user(build_resume_prompt(text, settings.resume_prompt_chars));
        let messages = run_agent(agent, &directive, vec![request], settings.agent_timeout).await?;

        let synced = sync(&mut state, &messages);
        let reply = take_reply(&messages)?;

        self.state = state;
        self.transcript.push(Role::Assistant, reply.clone());

        let state_changed = synced || !extracted_fields.is_empty();
        let effect = decide_effect(state_changed, &self.state);
        info!(
            session = %self.id,
            extracted = extracted_fields.len(),
            synced,
            "resume turn completed"
        );

        Ok(TurnOutcome {
            reply: Some(reply),
            state_changed,
            effect,
            extracted_fields,
            notice: None,
        })
    }
}

/// Invokes the agent under a bounded timeout, mapping failures to recoverable errors.
async fn run_agent(
    agent: &dyn Agent,
    directive: &str,
    messages: Vec<AgentMessage>,
    timeout: Duration,
) -> Result<Vec<AgentMessage>, AppError> {
    match tokio::time::timeout(timeout, agent.invoke(directive, messages)).await {
        Ok(Ok(messages)) => Ok(messages),
        Ok(Err(e)) => {
            warn!("agent invocation failed: {e}");
            Err(AppError::Llm(e.to_string()))
        }
        Err(_) => Err(AppError::AgentTimeout {
            secs: timeout.as_secs(),
        }),
    }
}

fn take_reply(messages: &[AgentMessage]) -> Result<String, AppError> {
    final_reply(messages)
        .map(str::to_string)
        .ok_or_else(|| AppError::Llm("agent run ended without a reply".to_string()))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentMessage;

/// One of the three fields an application needs before it is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Skills,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Skills];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Skills => "skills",
        }
    }

    /// Human-facing label used in the summary export.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Skills => "Skills",
        }
    }

    /// Wire token that introduces this field's value in a tool acknowledgment.
    pub fn token(self) -> &'static str {
        match self {
            Field::Name => "SET_NAME:",
            Field::Email => "SET_EMAIL:",
            Field::Skills => "SET_SKILLS:",
        }
    }

    /// Canonical stored form of a raw value.
    ///
    /// Names are title-cased, emails lower-cased, skills whitespace-normalized.
    /// Returns `None` when nothing remains after normalization.
    pub fn normalize(self, raw: &str) -> Option<String> {
        let value = match self {
            Field::Name => title_case(&collapse_whitespace(raw)),
            Field::Email => raw.trim().to_lowercase(),
            Field::Skills => collapse_whitespace(raw),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest,
/// so `o'neil` becomes `O'Neil`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Transient partial record produced by the regex pass or decoded from a tool
/// acknowledgment. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Option<String>,
}

impl ExtractionResult {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Skills => self.skills.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Skills => &mut self.skills,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Present fields in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }
}

/// The per-session application record.
///
/// A field is either absent or holds a non-empty normalized value. The only
/// ways in are [`ApplicationState::set`] (authoritative, used by reconciliation)
/// and [`ApplicationState::fill_if_absent`] (used by the regex pass).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationState {
    name: Option<String>,
    email: Option<String>,
    skills: Option<String>,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Skills => self.skills.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Skills => &mut self.skills,
        }
    }

    /// Overwrites `field` with the normalized `raw` value.
    /// Values that normalize to nothing are ignored.
    /// Returns true if the stored value changed.
    pub fn set(&mut self, field: Field, raw: &str) -> bool {
        let Some(value) = field.normalize(raw) else {
            return false;
        };
        let slot = self.slot_mut(field);
        if slot.as_deref() == Some(value.as_str()) {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Sets `field` only when it is currently absent. Never overwrites.
    pub fn fill_if_absent(&mut self, field: Field, raw: &str) -> bool {
        if self.get(field).is_some() {
            return false;
        }
        self.set(field, raw)
    }

    /// Applies a regex-pass result under the non-overwrite policy.
    /// Returns the fields that were filled.
    pub fn merge_absent(&mut self, extracted: &ExtractionResult) -> Vec<Field> {
        extracted
            .present()
            .filter(|(field, value)| self.fill_if_absent(*field, value))
            .map(|(field, _)| field)
            .collect()
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_some())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered chat history. Append-only; cleared only by a session reset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChatTranscript {
    turns: Vec<ChatTurn>,
}

impl ChatTranscript {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
            created_at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Replays the transcript as agent conversation context.
    pub fn to_agent_messages(&self) -> Vec<AgentMessage> {
        self.turns()
            .iter()
            .map(|turn| match turn.role {
                Role::User => AgentMessage::user(turn.content.clone()),
                Role::Assistant => AgentMessage::assistant(turn.content.clone()),
            })
            .collect()
    }
}

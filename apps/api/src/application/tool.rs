//! Tool contract exposed to the agent: `extract_application_info`.
//!
//! The tool never touches session state. It answers with an acknowledgment
//! string in a fixed token grammar, which the reconciliation pass decodes later:
//!
//! ```text
//! ack      = "No info parsed." | token *( " | " token )
//! token    = ( "SET_NAME:" | "SET_EMAIL:" | "SET_SKILLS:" ) value
//! ```
//!
//! Tokens appear in field order (name, email, skills). A value runs until the
//! next `" | "` delimiter or the end of the string. The grammar is a wire format
//! shared with the model conversation; do not change it without changing the
//! decoder alongside.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::models::{title_case, ExtractionResult, Field};
use crate::llm_client::ToolDefinition;

pub const TOOL_NAME: &str = "extract_application_info";
pub const TOOL_DESCRIPTION: &str = "Save user information found in the text.";
pub const TOKEN_DELIMITER: &str = " | ";
pub const NO_INFO_MARKER: &str = "No info parsed.";

/// Arguments the agent may pass. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfoArgs {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
}

impl ApplicationInfoArgs {
    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Skills => self.skills.as_deref(),
        }
    }
}

/// Executes the tool: encodes every provided, non-blank field as a `SET_<FIELD>:` token.
pub fn extract_application_info(args: &ApplicationInfoArgs) -> String {
    let tokens: Vec<String> = Field::ALL
        .into_iter()
        .filter_map(|field| {
            let raw = args.get(field)?;
            let value = match field {
                Field::Name => title_case(raw.trim()),
                Field::Email => raw.trim().to_lowercase(),
                Field::Skills => raw.trim().to_string(),
            };
            (!value.is_empty()).then(|| format!("{}{}", field.token(), value))
        })
        .collect();

    if tokens.is_empty() {
        NO_INFO_MARKER.to_string()
    } else {
        tokens.join(TOKEN_DELIMITER)
    }
}

/// JSON schema declaration sent to the model with every agent call.
pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The applicant's full name"
                },
                "email": {
                    "type": "string",
                    "description": "The applicant's email address"
                },
                "skills": {
                    "type": "string",
                    "description": "Comma-separated list of the applicant's skills"
                }
            }
        }),
    }
}

/// Decodes every `SET_<FIELD>:` token in `content`, in the order they appear.
///
/// Values are trimmed; tokens whose value is blank are dropped. Text that is not
/// a token (including the no-info marker) is ignored.
pub fn decode_acknowledgment(content: &str) -> Vec<(Field, String)> {
    let mut found: Vec<(usize, Field, String)> = Vec::new();

    for field in Field::ALL {
        let token = field.token();
        for (start, _) in content.match_indices(token) {
            let rest = &content[start + token.len()..];
            let value = rest
                .split(TOKEN_DELIMITER)
                .next()
                .unwrap_or_default()
                .trim();
            if !value.is_empty() {
                found.push((start, field, value.to_string()));
            }
        }
    }

    found.sort_by_key(|(start, _, _)| *start);
    found
        .into_iter()
        .map(|(_, field, value)| (field, value))
        .collect()
}

/// Collapses an acknowledgment into a partial record; later tokens for the same field win.
pub fn decode_to_result(content: &str) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    for (field, value) in decode_acknowledgment(content) {
        result.set(field, value);
    }
    result
}

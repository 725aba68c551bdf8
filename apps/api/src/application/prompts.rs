// Agent directive templates for the application assistant.
// The directive is rebuilt on every turn from the current state snapshot.

use crate::application::models::{ApplicationState, Field};

pub const ASSISTANT_DIRECTIVE_TEMPLATE: &str = "\
You are a helpful job application assistant. Collect the applicant's name, email, and skills.
Status: {status}. Missing: {missing}.

**Rules for Ambiguity:**
- If you find multiple potential values for a field (e.g., two different emails in a CV), DO NOT guess.
- Instead, point them out to the user and ask: \"I found multiple emails: [Email A] and [Email B]. Which one should I use?\"
- Only call extract_application_info once the user confirms or if the value is unambiguous.

Use extract_application_info to save data. Once all 3 fields are present, congratulate the user!";

/// First user message of a résumé turn; `{text}` is the truncated document text.
pub const RESUME_EXTRACTION_PROMPT: &str = "Extract info from: {text}";

/// Builds the per-turn system directive from the current state.
pub fn build_directive(state: &ApplicationState) -> String {
    let status = Field::ALL
        .iter()
        .map(|f| format!("{}={}", f.as_str(), state.get(*f).unwrap_or("missing")))
        .collect::<Vec<_>>()
        .join(", ");

    let missing = state.missing_fields();
    let missing = if missing.is_empty() {
        "none".to_string()
    } else {
        missing
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    ASSISTANT_DIRECTIVE_TEMPLATE
        .replace("{status}", &status)
        .replace("{missing}", &missing)
}

/// Builds the résumé extraction request, keeping at most `max_chars` characters of text.
pub fn build_resume_prompt(text: &str, max_chars: usize) -> String {
    let truncated = match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    RESUME_EXTRACTION_PROMPT.replace("{text}", truncated)
}

use crate::application::models::{ApplicationState, Field};

pub const SUMMARY_FILE_NAME: &str = "application_summary.txt";

/// Renders the plain-text summary export. Available only once every field is present.
pub fn render_summary(state: &ApplicationState) -> Option<String> {
    let mut lines = vec!["RESUME SUMMARY".to_string(), "---".to_string()];
    for field in Field::ALL {
        lines.push(format!("{}: {}", field.label(), state.get(field)?));
    }
    Some(lines.join("\n"))
}

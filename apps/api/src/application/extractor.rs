//! Field Extractor — fast, local regex pass over raw résumé or chat text.
//!
//! Pure and deterministic: no I/O, never fails. A field with no match is simply
//! absent in the result. Values are returned as found (trimmed); normalization
//! happens when they are merged into `ApplicationState`.

use std::sync::LazyLock;

use regex::Regex;

use crate::application::models::ExtractionResult;

/// `Name:` or `Full Name:` (label case-insensitive) followed by words that start
/// with a capital, on the same line. Interior capitals and apostrophes are part of
/// the word (`McDonald`, `O'Brien`, `JOHN`).
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i:\b(?:full[ \t]+)?name)[ \t]*:[ \t]*(\p{Lu}[\p{L}'\-]*(?:[ \t]+\p{Lu}[\p{L}'\-]*)*)",
    )
    .expect("name pattern is valid")
});

/// `local@domain.tld` with ASCII word, dot and hyphen characters on both sides.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9_.\-]+@[A-Za-z0-9_.\-]+\.[A-Za-z0-9_]+\b")
        .expect("email pattern is valid")
});

/// `Skills:` / `Skills -` up to a blank line, the next known section label, or end of text.
static SKILLS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bskills\s*[:\-]+\s*(.*?)(?:\n[ \t]*\n|\b(?:projects|certifications|education)\b|\z)")
        .expect("skills pattern is valid")
});

/// Runs the regex pass over `text`.
pub fn extract(text: &str) -> ExtractionResult {
    let text = text.replace("\r\n", "\n");

    ExtractionResult {
        name: NAME_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        email: EMAIL_RE
            .find(&text)
            .map(|m| m.as_str().trim().to_string()),
        skills: SKILLS_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| clean_skills(m.as_str()))
            .filter(|s| !s.is_empty()),
    }
}

/// Joins a multi-line skills block into one comma-separated line.
/// Leading bullet hyphens are dropped; hyphens inside a skill (`scikit-learn`) stay.
fn clean_skills(block: &str) -> String {
    let joined = block
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '\u{2022}']).trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    joined
        .split_whitespace()
        .filter(|token| *token != "-")
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches([',', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CV: &str =
        "Name: John Smith\nContact: john.smith@email.com\nSkills: Python, Go\n\nProjects: ...";

    #[test]
    fn test_extracts_all_three_fields() {
        let result = extract(SAMPLE_CV);
        assert_eq!(result.name.as_deref(), Some("John Smith"));
        assert_eq!(result.email.as_deref(), Some("john.smith@email.com"));
        assert_eq!(result.skills.as_deref(), Some("Python, Go"));
    }

    #[test]
    fn test_extract_is_idempotent() {
        assert_eq!(extract(SAMPLE_CV), extract(SAMPLE_CV));
    }

    #[test]
    fn test_no_matches_yield_absent_fields() {
        let result = extract("Just some prose about nothing in particular.");
        assert!(result.is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_full_name_label_and_case_insensitive_label() {
        let result = extract("FULL NAME: Ada Lovelace\n");
        assert_eq!(result.name.as_deref(), Some("Ada Lovelace"));
        let result = extract("name:   Grace Brewster Hopper");
        assert_eq!(result.name.as_deref(), Some("Grace Brewster Hopper"));
    }

    #[test]
    fn test_name_stops_at_line_end() {
        let result = extract("Name: Jane Doe\nEmail Address: jane@x.com");
        assert_eq!(result.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_requires_capitalized_words() {
        let result = extract("Name: 12345");
        assert_eq!(result.name, None);
    }

    #[test]
    fn test_name_keeps_interior_capitals() {
        let result = extract("Name: John McDonald\nEmail: j@x.com");
        assert_eq!(result.name.as_deref(), Some("John McDonald"));
    }

    #[test]
    fn test_name_accepts_all_caps() {
        let result = extract("Name: JOHN SMITH\n");
        assert_eq!(result.name.as_deref(), Some("JOHN SMITH"));
    }

    #[test]
    fn test_name_keeps_apostrophe() {
        let result = extract("Full Name: Mary O'Brien\n");
        assert_eq!(result.name.as_deref(), Some("Mary O'Brien"));
    }

    #[test]
    fn test_first_email_wins() {
        let result = extract("Reach me at first@one.org or second@two.org");
        assert_eq!(result.email.as_deref(), Some("first@one.org"));
    }

    #[test]
    fn test_email_with_subdomain_and_hyphen() {
        let result = extract("mail: j-d.smith@mail.example-corp.co.uk.");
        assert_eq!(
            result.email.as_deref(),
            Some("j-d.smith@mail.example-corp.co.uk")
        );
    }

    #[test]
    fn test_email_requires_dot_segment() {
        assert_eq!(extract("user@localhost").email, None);
    }

    #[test]
    fn test_skills_bullets_collapse_to_one_line() {
        let text = "Skills:\n- Rust\n- scikit-learn\n-   Kubernetes\n\nExperience: lots";
        let result = extract(text);
        assert_eq!(
            result.skills.as_deref(),
            Some("Rust, scikit-learn, Kubernetes")
        );
    }

    #[test]
    fn test_skills_stop_at_section_label() {
        let text = "SKILLS - Rust, Go\nSQL\nEducation\nMIT";
        let result = extract(text);
        assert_eq!(result.skills.as_deref(), Some("Rust, Go, SQL"));
    }

    #[test]
    fn test_skills_ignore_section_words_inside_skills() {
        let result = extract("Skills: Python, Educational software");
        assert_eq!(
            result.skills.as_deref(),
            Some("Python, Educational software")
        );
    }

    #[test]
    fn test_skills_trailing_comma_is_trimmed() {
        let result = extract("Skills: Rust, Go,\nProjects: x");
        assert_eq!(result.skills.as_deref(), Some("Rust, Go"));
    }

    #[test]
    fn test_skills_run_to_end_of_text() {
        let result = extract("Skills: Rust,   Tokio,\tAxum");
        assert_eq!(result.skills.as_deref(), Some("Rust, Tokio, Axum"));
    }

    #[test]
    fn test_empty_skills_block_is_absent() {
        let result = extract("Skills:\n\nProjects: x");
        assert_eq!(result.skills, None);
    }

    #[test]
    fn test_crlf_input() {
        let result = extract("Name: Jane Doe\r\nSkills: Rust\r\n\r\nProjects");
        assert_eq!(result.name.as_deref(), Some("Jane Doe"));
        assert_eq!(result.skills.as_deref(), Some("Rust"));
    }
}

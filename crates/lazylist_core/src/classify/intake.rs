//! Free-text intake: split pasted text into item drafts and explain
//! uncertain classifications.

use super::{extract_tags, extract_urls};

const BULLETS: [char; 3] = ['-', '*', '•'];
const ACTION_WORDS: [&str; 7] = [
    "need",
    "should",
    "todo",
    "remember",
    "follow up",
    "call",
    "email",
];
const URL_PREVIEW_CHARS: usize = 50;
const MAX_LISTED_OPTIONS: usize = 5;

/// One item candidate extracted from intake text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeDraft {
    pub title: String,
    pub tags: Vec<String>,
}

/// Splits `text` into drafts.
///
/// Multi-line text where at least one line starts with a bullet yields one
/// draft per non-empty line, bullet markers removed. Anything else is a
/// single draft holding the whole trimmed text.
pub fn split_intake(text: &str, max_tags: usize) -> Vec<IntakeDraft> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let lines: Vec<&str> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let bulleted = lines.iter().any(|line| line.starts_with(BULLETS));
    if lines.len() == 1 || !bulleted {
        return vec![draft(trimmed, max_tags)];
    }
    lines
        .into_iter()
        .map(|line| line.trim_start_matches(BULLETS).trim())
        .filter(|line| !line.is_empty())
        .map(|line| draft(line, max_tags))
        .collect()
}

fn draft(title: &str, max_tags: usize) -> IntakeDraft {
    IntakeDraft {
        title: title.to_string(),
        tags: extract_tags(title, max_tags),
    }
}

/// Clarifying questions for a low-confidence classification of `text`.
pub fn diagnostic_questions(text: &str, available: &[String]) -> Vec<String> {
    let has = |slug: &str| available.iter().any(|candidate| candidate == slug);
    let mut questions = Vec::new();

    if let Some(url) = extract_urls(text).first() {
        if available.len() > 2 {
            let preview: String = url.chars().take(URL_PREVIEW_CHARS).collect();
            questions.push(format!("I see a URL ({preview}...). Is this for:"));
            if has("crm") {
                questions.push("- Professional contact/networking (CRM)".to_string());
            }
            if has("reading") {
                questions.push("- Article/content to read later".to_string());
            }
            if has("projects") {
                questions.push("- Project reference/development".to_string());
            }
            if has("social") || has("social-media") {
                questions.push("- Social media content/idea".to_string());
            }
        }
    }

    let lowered = text.to_lowercase();
    if ACTION_WORDS.iter().any(|word| lowered.contains(word)) && (has("tasks") || has("todos")) {
        questions.push("This sounds like a task. Should it go in your task list?".to_string());
    }

    if questions.is_empty() && available.len() > 1 {
        questions.push("Which category best fits this item?".to_string());
        questions.extend(
            available
                .iter()
                .take(MAX_LISTED_OPTIONS)
                .map(|slug| format!("- {}", display_name(slug))),
        );
    }
    questions
}

/// `system-upgrades` -> `System Upgrades`.
fn display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

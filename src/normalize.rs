//! Text normalization for scraped messages.
//!
//! Two character filters (Ethiopic-only, and Ethiopic plus a Latin/digit
//! allow-list), whitespace collapsing and whitespace tokenization. All
//! functions are pure and idempotent; empty input gives empty output.

use std::sync::LazyLock;

use regex::Regex;

/// Anything outside the Ethiopic block or whitespace.
static NON_AMHARIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x{1200}-\x{137F}\s]").unwrap());

/// Anything outside Ethiopic, ASCII letters/digits, whitespace and `.,:-`.
static NOT_ALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x{1200}-\x{137F}A-Za-z0-9\s.,:\-]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Which character filter to apply before tokenizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalizer {
    /// Ethiopic script only.
    Amharic,
    /// Ethiopic, Latin letters, digits and `.,:-`.
    #[default]
    AllowList,
}

impl Normalizer {
    /// Filter and collapse `text` with this variant.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Amharic => clean_amharic(text),
            Self::AllowList => clean_message(text),
        }
    }
}

impl std::fmt::Display for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Amharic => "amharic",
            Self::AllowList => "allow-list",
        };
        write!(f, "{s}")
    }
}

/// Keep only Ethiopic characters, then collapse whitespace.
pub fn clean_amharic(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    collapse_whitespace(&NON_AMHARIC.replace_all(text, ""))
}

/// Keep Ethiopic, ASCII letters, digits and `.,:-`, then collapse whitespace.
pub fn clean_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    collapse_whitespace(&NOT_ALLOWED.replace_all(text, ""))
}

/// Replace every whitespace run with one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}

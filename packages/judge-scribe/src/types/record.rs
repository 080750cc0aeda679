//! The canonical problem record and its JSON artifact form.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a title that could not be read.
pub const TITLE_NOT_FOUND: &str = "Not found";

/// Sentinel for problem number/name when the title has no `.` separator.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel for code that never appeared in the editor.
pub const CODE_NOT_FOUND: &str = "Code not found.";

/// Sentinel for a missing problem statement.
pub const DESCRIPTION_NOT_FOUND: &str = "Description not found.";

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^\w\s\-]").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// The online judge a record was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judge {
    LeetCode,
    Gfg,
}

impl Judge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Judge::LeetCode => "leetcode",
            Judge::Gfg => "gfg",
        }
    }
}

impl fmt::Display for Judge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem difficulty.
///
/// Unrecognized labels keep their original text (e.g. GfG's "Basic").
/// An empty `Unknown` means no difficulty element was found and is
/// serialized as `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unknown(String),
}

impl Difficulty {
    /// Classify a free-text difficulty label.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            "" | "unknown" => Difficulty::Unknown(String::new()),
            _ => Difficulty::Unknown(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unknown(text) if text.is_empty() => "Unknown",
            Difficulty::Unknown(text) => text,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Unknown(String::new())
    }
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        Difficulty::from_label(&label)
    }
}

impl From<Difficulty> for String {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.label().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One worked example from the problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// 1-based, sequential over accepted examples
    pub example_number: usize,
    pub input: String,
    pub output: String,
    /// May be empty
    pub explanation: String,
}

/// Everything extracted from one accepted submission.
///
/// Built once per navigation epoch by the extraction pipeline. Only
/// `ai_response` may change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    pub judge: Judge,
    pub url: String,
    pub full_title: String,
    pub problem_number: String,
    pub problem_name: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub constraints: Vec<String>,
    pub examples: Vec<Example>,
    pub submitted_code: String,
    pub problem_description: String,
    #[serde(default)]
    pub notes: String,
    pub extracted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
}

impl ProblemRecord {
    /// Attach the explanation text once the requester completes.
    pub fn attach_explanation(&mut self, explanation: impl Into<String>) {
        self.ai_response = Some(explanation.into());
    }

    /// Whether the code editor content was actually captured.
    pub fn has_code(&self) -> bool {
        self.submitted_code != CODE_NOT_FOUND
    }

    /// Filename for the downloadable artifact.
    pub fn artifact_filename(&self) -> String {
        format!("{}_{}.json", self.judge, sanitize_title(&self.full_title))
    }

    /// Serialize to the pretty-printed JSON artifact.
    pub fn to_artifact_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a JSON artifact back into a record.
    pub fn from_artifact_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Split `"1. Two Sum"` into `("1", "Two Sum")` on the first `.`.
///
/// Titles without a separator yield `("N/A", "N/A")`; an empty part on
/// either side of the separator is `"N/A"` too.
pub fn split_title(full_title: &str) -> (String, String) {
    let or_sentinel = |part: &str| {
        let part = part.trim();
        if part.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            part.to_string()
        }
    };
    match full_title.split_once('.') {
        Some((number, name)) => (or_sentinel(number), or_sentinel(name)),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    }
}

/// Strip non-word characters and join words with `_`.
pub fn sanitize_title(title: &str) -> String {
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(title, "");
    let joined = WHITESPACE_RUN.replace_all(stripped.trim(), "_");
    if joined.is_empty() {
        "untitled".to_string()
    } else {
        joined.into_owned()
    }
}

//! GeeksforGeeks practice pages.
//!
//! The signal is the "problem solved successfully" banner GfG shows after
//! an accepted submission. It only counts once the statement, the title
//! and the Ace editor are all on the page.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::select::{all_texts, code_lines, element_text, exists, first_element, first_text};
use super::PageAdapter;
use crate::pipeline::parse::strip_examples_section;
use crate::types::record::Judge;

lazy_static! {
    static ref NOTE: Regex = Regex::new(r"(?is)\bNote:(.*?)(?:\bExamples?\s*\d*\s*:|$)").unwrap();
}

const STATEMENT: &[&str] = &[".problem-statement", r#"div[class*="problem_content"]"#];

const TITLE: &[&str] = &["h1", r#"h3[class*="header_content__title"]"#];

const DIFFICULTY: &[&str] = &[
    r#".problem-tags span[class*="difficulty"]"#,
    r#"[class*="difficulty"]"#,
];

const TOPICS: &[&str] = &[".problem-tags a", r#"a[href*="/explore?category"]"#];

const EXAMPLES: &[&str] = &[".problem-statement pre", "pre"];

const CODE: &[(&str, &str)] = &[(".ace_text-layer", ".ace_line"), (".ace_editor", ".ace_line")];

const EDITOR: &[&str] = &[".ace_text-layer", ".ace_content"];

/// Landmarks that must all be present for the page to count as loaded.
const LANDMARKS: &[&[&str]] = &[STATEMENT, &["h1"], &[".ace_editor"]];

/// Banner shown after an accepted submission. The class name carries a
/// build hash suffix, so match on the stable part.
const SOLVED: &[&str] = &[r#"[class*="problem_solved_successfully"]"#];

/// Adapter for `geeksforgeeks.org/problems/*`.
#[derive(Debug, Clone, Default)]
pub struct GfgAdapter;

impl GfgAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Statement text with one line per block element.
    fn statement_text(doc: &Html) -> Option<String> {
        let statement = first_element(doc, STATEMENT)?;
        Some(block_text(&statement))
    }
}

/// Text of each child block on its own line, or the flat text if the
/// element has no element children.
fn block_text(element: &ElementRef<'_>) -> String {
    let blocks: Vec<String> = element
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| element_text(&child).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        element_text(element).trim().to_string()
    } else {
        blocks.join("\n")
    }
}

impl PageAdapter for GfgAdapter {
    fn judge(&self) -> Judge {
        Judge::Gfg
    }

    fn handles(&self, url: &str) -> bool {
        super::is_problem_page(url, &["geeksforgeeks.org"])
    }

    fn is_signal(&self, doc: &Html) -> bool {
        exists(doc, SOLVED) && LANDMARKS.iter().all(|landmark| exists(doc, landmark))
    }

    fn editor_ready(&self, doc: &Html) -> bool {
        exists(doc, EDITOR)
    }

    fn title(&self, doc: &Html) -> Option<String> {
        first_text(doc, TITLE)
    }

    fn difficulty(&self, doc: &Html) -> Option<String> {
        first_text(doc, DIFFICULTY)
    }

    fn topics(&self, doc: &Html) -> Vec<String> {
        all_texts(doc, TOPICS)
    }

    fn description(&self, doc: &Html) -> Option<String> {
        let description = strip_examples_section(&Self::statement_text(doc)?);
        (!description.is_empty()).then_some(description)
    }

    fn example_blocks(&self, doc: &Html) -> Vec<String> {
        all_texts(doc, EXAMPLES)
    }

    fn constraint_candidates(&self, doc: &Html) -> Vec<String> {
        Self::statement_text(doc)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn code(&self, doc: &Html) -> Option<String> {
        code_lines(doc, CODE)
    }

    fn notes(&self, doc: &Html) -> Option<String> {
        let text = Self::statement_text(doc)?;
        let note = NOTE.captures(&text)?.get(1)?.as_str().trim().to_string();
        (!note.is_empty()).then_some(note)
    }
}

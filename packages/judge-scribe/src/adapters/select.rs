//! Selector-strategy helpers shared by the page adapters.
//!
//! Every helper takes an ordered list of CSS selectors and tries them
//! in priority order. An unparsable selector is skipped, never raised.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Parse a selector, logging and skipping it if invalid.
pub fn parse(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(selector, error = ?e, "skipping invalid selector");
            None
        }
    }
}

/// Visible text of an element with non-breaking spaces normalized.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().replace('\u{a0}', " ")
}

/// First element matched by the first strategy that matches anything.
pub fn first_element<'a>(doc: &'a Html, strategies: &[&str]) -> Option<ElementRef<'a>> {
    strategies
        .iter()
        .filter_map(|s| parse(s))
        .find_map(|selector| doc.select(&selector).next())
}

/// Trimmed text of the first non-empty match across strategies.
pub fn first_text(doc: &Html, strategies: &[&str]) -> Option<String> {
    strategies.iter().filter_map(|s| parse(s)).find_map(|selector| {
        doc.select(&selector)
            .map(|el| element_text(&el).trim().to_string())
            .find(|text| !text.is_empty())
    })
}

/// Trimmed texts of every match, in document order.
///
/// Uses the first strategy that yields at least one non-empty text.
pub fn all_texts(doc: &Html, strategies: &[&str]) -> Vec<String> {
    for selector in strategies.iter().filter_map(|s| parse(s)) {
        let texts: Vec<String> = doc
            .select(&selector)
            .map(|el| element_text(&el).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// Whether any strategy matches at least one element.
pub fn exists(doc: &Html, strategies: &[&str]) -> bool {
    first_element(doc, strategies).is_some()
}

/// Code lines under the first container that exists, joined with `\n`.
///
/// Each strategy is a `(container, line)` pair. A container with no
/// line elements still counts as found (empty code).
pub fn code_lines(doc: &Html, strategies: &[(&str, &str)]) -> Option<String> {
    for (container, line) in strategies {
        let (Some(container_sel), Some(line_sel)) = (parse(container), parse(line)) else {
            continue;
        };
        if let Some(root) = doc.select(&container_sel).next() {
            let lines: Vec<String> = root
                .select(&line_sel)
                .map(|el| element_text(&el).trim_end().to_string())
                .collect();
            return Some(lines.join("\n"));
        }
    }
    None
}

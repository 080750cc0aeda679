//! LeetCode problem pages.
//!
//! The signal is the submission result label turning to "Accepted".
//! Code lives in a Monaco editor that often renders after the rest of
//! the page; the legacy CodeMirror editor is kept as a fallback.

use scraper::{ElementRef, Html};
use std::time::Duration;

use super::select::{self, all_texts, code_lines, element_text, exists, first_element, first_text};
use super::PageAdapter;
use crate::pipeline::parse::description_before_examples;
use crate::types::record::Judge;

const SUBMISSION_RESULT: &[&str] = &[r#"span[data-e2e-locator="submission-result"]"#];
const ACCEPTED: &str = "Accepted";

const TITLE: &[&str] = &[
    r#"div.text-title-large a[href^="/problems/"]"#,
    "div.text-title-large",
    r#"div[data-cy="question-title"]"#,
];

const DIFFICULTY: &[&str] = &[
    "div.text-difficulty-easy, div.text-difficulty-medium, div.text-difficulty-hard",
    "div[diff]",
];

const TOPICS: &[&str] = &[r#"a[href^="/tag/"]"#];

const DESCRIPTION: &[&str] = &[
    r#"div[data-track-load="description_content"]"#,
    r#"div[class*="question-content"]"#,
];

const EXAMPLES: &[&str] = &["pre", "div.example-block"];

const CODE: &[(&str, &str)] = &[
    ("div.view-lines", "div.view-line"),
    (".CodeMirror-code", "pre.CodeMirror-line"),
];

const EDITOR: &[&str] = &["div.view-lines", ".CodeMirror-code"];

const INLINE_CODE: &str = "p code, li code, strong code";

/// Adapter for `leetcode.com/problems/*`.
#[derive(Debug, Clone)]
pub struct LeetCodeAdapter {
    settle: Duration,
}

impl Default for LeetCodeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LeetCodeAdapter {
    pub fn new() -> Self {
        Self {
            settle: Duration::from_millis(1000),
        }
    }

    /// Override the pause between "Accepted" and extraction.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// List items of the `<ul>` right after a "Constraints" heading.
    fn constraint_list(doc: &Html) -> Vec<String> {
        let Some(heading_sel) = select::parse("p, h3, h4") else {
            return Vec::new();
        };
        let Some(li_sel) = select::parse("li") else {
            return Vec::new();
        };

        let heading = doc
            .select(&heading_sel)
            .find(|el| element_text(el).to_lowercase().contains("constraints"));

        heading
            .and_then(|h| h.next_siblings().find_map(ElementRef::wrap))
            .filter(|sibling| sibling.value().name() == "ul")
            .map(|ul| {
                ul.select(&li_sel)
                    .map(|li| element_text(&li).trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The paragraph holding a `<strong>Follow-up</strong>` label.
    fn follow_up(doc: &Html) -> Option<ElementRef<'_>> {
        let strong = select::parse("strong")?;
        let label = doc.select(&strong).find(|el| {
            let text = element_text(el).trim().to_lowercase();
            text.starts_with("follow-up") || text.starts_with("follow up")
        })?;

        Some(label.parent().and_then(ElementRef::wrap).unwrap_or(label))
    }

    /// Inline `<code>` texts, skipping those inside `exclude`.
    ///
    /// The follow-up paragraph is kept whole, so its inline code would
    /// otherwise show up twice.
    fn inline_code(doc: &Html, exclude: Option<ElementRef<'_>>) -> Vec<String> {
        let Some(selector) = select::parse(INLINE_CODE) else {
            return Vec::new();
        };
        doc.select(&selector)
            .filter(|code| {
                exclude.map_or(true, |outer| !code.ancestors().any(|node| node.id() == outer.id()))
            })
            .map(|code| element_text(&code).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }
}

impl PageAdapter for LeetCodeAdapter {
    fn judge(&self) -> Judge {
        Judge::LeetCode
    }

    fn handles(&self, url: &str) -> bool {
        super::is_problem_page(url, &["leetcode.com", "leetcode.cn"])
    }

    fn is_signal(&self, doc: &Html) -> bool {
        first_text(doc, SUBMISSION_RESULT).is_some_and(|text| text == ACCEPTED)
    }

    fn signal_settle(&self) -> Duration {
        self.settle
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
        let container = first_element(doc, DESCRIPTION)?;
        let blocks = container
            .children()
            .filter_map(ElementRef::wrap)
            .map(|block| element_text(&block));
        let description = description_before_examples(blocks);
        (!description.is_empty()).then_some(description)
    }

    fn example_blocks(&self, doc: &Html) -> Vec<String> {
        all_texts(doc, EXAMPLES)
    }

    fn constraint_candidates(&self, doc: &Html) -> Vec<String> {
        let follow_up = Self::follow_up(doc);
        let mut candidates = Self::inline_code(doc, follow_up);
        candidates.extend(Self::constraint_list(doc));
        candidates.extend(follow_up.map(|paragraph| element_text(&paragraph).trim().to_string()));
        candidates
    }

    fn code(&self, doc: &Html) -> Option<String> {
        code_lines(doc, CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="text-title-large"><a href="/problems/two-sum/">1. Two Sum</a></div>
        <div class="text-difficulty-easy">Easy</div>
        <a href="/tag/array/">Array</a><a href="/tag/hash-table/">Hash Table</a>
        <div data-track-load="description_content">
            <p>Given an array of integers <code>nums</code>, return indices.</p>
            <p>You may assume exactly one solution.</p>
            <p><strong class="example">Example 1:</strong></p>
            <pre>Input: nums = [2,7,11,15], target = 9
Output: [0,1]
Explanation: Because nums[0] + nums[1] == 9.</pre>
            <p><strong>Constraints:</strong></p>
            <ul><li><code>2 &lt;= nums.length &lt;= 10^4</code></li><li>Only one valid answer exists.</li></ul>
            <p><strong>Follow-up:</strong> Can you do better than <code>O(n^2)</code> time complexity?</p>
        </div>
        <span data-e2e-locator="submission-result"> Accepted </span>
        <div class="view-lines"><div class="view-line">class Solution {</div><div class="view-line">}</div></div>
    </body></html>"#;

    fn doc() -> Html {
        Html::parse_document(PAGE)
    }

    #[test]
    fn test_signal_requires_accepted() {
        let adapter = LeetCodeAdapter::new();
        assert!(adapter.is_signal(&doc()));

        let pending = Html::parse_document(
            r#"<body><span data-e2e-locator="submission-result">Wrong Answer</span></body>"#,
        );
        assert!(!adapter.is_signal(&pending));
        assert!(!adapter.is_signal(&Html::parse_document("<body></body>")));
    }

    #[test]
    fn test_fields() {
        let adapter = LeetCodeAdapter::new();
        let doc = doc();

        assert_eq!(adapter.title(&doc), Some("1. Two Sum".to_string()));
        assert_eq!(adapter.difficulty(&doc), Some("Easy".to_string()));
        assert_eq!(adapter.topics(&doc), vec!["Array", "Hash Table"]);
        assert_eq!(adapter.code(&doc), Some("class Solution {\n}".to_string()));
        assert!(adapter.editor_ready(&doc));

        let description = adapter.description(&doc).unwrap();
        assert!(description.starts_with("Given an array of integers nums"));
        assert!(description.ends_with("exactly one solution."));
        assert!(!description.contains("Input:"));

        assert_eq!(adapter.example_blocks(&doc).len(), 1);
    }

    #[test]
    fn test_constraint_candidates_include_follow_up() {
        let adapter = LeetCodeAdapter::new();
        let candidates = adapter.constraint_candidates(&doc());

        assert!(candidates.iter().any(|c| c == "Only one valid answer exists."));
        assert!(candidates
            .iter()
            .any(|c| c.starts_with("Follow-up:") && c.contains("time complexity")));
    }

    #[test]
    fn test_follow_up_inline_code_not_repeated() {
        let adapter = LeetCodeAdapter::new();
        let candidates = adapter.constraint_candidates(&doc());

        assert!(!candidates.iter().any(|c| c == "O(n^2)"));
        assert!(candidates.iter().any(|c| c == "2 <= nums.length <= 10^4"));
        assert_eq!(
            candidates.iter().filter(|c| c.contains("O(n^2)")).count(),
            1
        );
    }

    #[test]
    fn test_inline_complexity_outside_follow_up_is_kept() {
        let adapter = LeetCodeAdapter::new();
        let doc = Html::parse_document(
            r#"<body><p>Solve it in <code>O(log n)</code> time.</p>
            <p><strong>Follow-up:</strong> Can you reach <code>O(1)</code> space?</p></body>"#,
        );
        let candidates = adapter.constraint_candidates(&doc);

        assert!(candidates.iter().any(|c| c == "O(log n)"));
        assert!(!candidates.iter().any(|c| c == "O(1)"));
    }

    #[test]
    fn test_codemirror_fallback() {
        let adapter = LeetCodeAdapter::new();
        let doc = Html::parse_document(
            r#"<body><div class="CodeMirror-code"><pre class="CodeMirror-line">x = 1</pre></div></body>"#,
        );
        assert!(adapter.editor_ready(&doc));
        assert_eq!(adapter.code(&doc), Some("x = 1".to_string()));
    }

    #[test]
    fn test_missing_elements_yield_none() {
        let adapter = LeetCodeAdapter::new();
        let empty = Html::parse_document("<body></body>");

        assert_eq!(adapter.title(&empty), None);
        assert_eq!(adapter.difficulty(&empty), None);
        assert_eq!(adapter.description(&empty), None);
        assert_eq!(adapter.code(&empty), None);
        assert!(adapter.topics(&empty).is_empty());
        assert!(adapter.constraint_candidates(&empty).is_empty());
        assert!(!adapter.editor_ready(&empty));
    }
}

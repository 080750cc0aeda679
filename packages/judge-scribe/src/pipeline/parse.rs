//! Free-text heuristics for examples, constraints and descriptions.
//!
//! These parse rendered text, not markup, so they work the same for
//! every judge.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::record::Example;

lazy_static! {
    static ref INPUT_LABEL: Regex = Regex::new(r"(?i)\binput\s*:").unwrap();
    static ref OUTPUT_LABEL: Regex = Regex::new(r"(?i)\boutput\s*:").unwrap();
    static ref EXPLANATION_LABEL: Regex = Regex::new(r"(?i)\bexplanation\s*:").unwrap();

    // Big-O / Theta / Omega with a parenthesized argument.
    static ref COMPLEXITY_NOTATION: Regex = Regex::new(r"[OΘΩ]\([^)]*\)").unwrap();
    static ref COMPLEXITY_PHRASE: Regex = Regex::new(r"(?i)(time|space)\s*complexity").unwrap();

    static ref EXAMPLE_HEADING: Regex = Regex::new(r"(?i)^\s*examples?\b").unwrap();
    static ref EXAMPLE_SECTION: Regex = Regex::new(r"(?im)^\s*examples?\s*\d*\s*:?\s*$|^\s*examples?\s*\d*\s*:").unwrap();
}

/// Input/output/explanation fields of one example block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFields {
    pub input: String,
    pub output: String,
    pub explanation: String,
}

/// Parse an `Input: … Output: … Explanation: …` block.
///
/// Returns `None` unless both input and output are non-empty. Input may
/// span several lines up to the first `Output:` label; a later
/// `Output:` inside the explanation stays part of the explanation.
pub fn parse_example_block(text: &str) -> Option<ExampleFields> {
    let input_label = INPUT_LABEL.find(text)?;
    let after_input = &text[input_label.end()..];

    let output_label = OUTPUT_LABEL.find(after_input)?;
    let input = after_input[..output_label.start()].trim();
    let after_output = &after_input[output_label.end()..];

    let (output, explanation) = match EXPLANATION_LABEL.find(after_output) {
        Some(label) => (
            after_output[..label.start()].trim(),
            after_output[label.end()..].trim(),
        ),
        None => (after_output.trim(), ""),
    };

    if input.is_empty() || output.is_empty() {
        return None;
    }

    Some(ExampleFields {
        input: input.to_string(),
        output: output.to_string(),
        explanation: explanation.to_string(),
    })
}

/// Parse every block and number the accepted ones 1..n.
pub fn parse_examples<I, S>(blocks: I) -> Vec<Example>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    blocks
        .into_iter()
        .filter_map(|block| parse_example_block(block.as_ref()))
        .enumerate()
        .map(|(i, fields)| Example {
            example_number: i + 1,
            input: fields.input,
            output: fields.output,
            explanation: fields.explanation,
        })
        .collect()
}

/// Whether a line looks like a complexity constraint.
///
/// Precision over recall: plain bounds like `1 <= n <= 10^5` are rejected.
pub fn is_complexity_constraint(line: &str) -> bool {
    COMPLEXITY_NOTATION.is_match(line) || COMPLEXITY_PHRASE.is_match(line)
}

/// Keep only complexity lines, trimmed, in their original order.
pub fn filter_constraints<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty() && is_complexity_constraint(line))
        .collect()
}

/// Join description blocks up to the first one that opens the examples.
pub fn description_before_examples<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    blocks
        .into_iter()
        .map(|block| block.as_ref().trim().to_string())
        .take_while(|block| !EXAMPLE_HEADING.is_match(block))
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut a flat statement text at its examples section.
pub fn strip_examples_section(text: &str) -> String {
    match EXAMPLE_SECTION.find(text) {
        Some(heading) => text[..heading.start()].trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_example_block() {
        let fields = parse_example_block("Input: a\nOutput: b\nExplanation: c").unwrap();
        assert_eq!(
            fields,
            ExampleFields {
                input: "a".to_string(),
                output: "b".to_string(),
                explanation: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_input_without_output_is_rejected() {
        assert_eq!(parse_example_block("Input: a\nExplanation: c"), None);
        assert_eq!(parse_example_block("Input: a"), None);
    }

    #[test]
    fn test_empty_output_is_rejected() {
        assert_eq!(parse_example_block("Input: a\nOutput:\nExplanation: c"), None);
    }

    #[test]
    fn test_missing_explanation_is_empty() {
        let fields = parse_example_block("Input: nums = [1]\nOutput: 1").unwrap();
        assert_eq!(fields.explanation, "");
    }

    #[test]
    fn test_multiline_input_preserved() {
        let fields =
            parse_example_block("Input:\nn = 3\nedges = [[0,1],[1,2]]\nOutput: 2").unwrap();
        assert_eq!(fields.input, "n = 3\nedges = [[0,1],[1,2]]");
        assert_eq!(fields.output, "2");
    }

    #[test]
    fn test_nested_output_stays_in_explanation() {
        let fields = parse_example_block(
            "Input: x = 1\nOutput: 2\nExplanation: step one gives Output: 2 as well",
        )
        .unwrap();
        assert_eq!(fields.output, "2");
        assert_eq!(fields.explanation, "step one gives Output: 2 as well");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let fields = parse_example_block("input: 5\noutput: 120").unwrap();
        assert_eq!(fields.input, "5");
        assert_eq!(fields.output, "120");
    }

    #[test]
    fn test_examples_are_renumbered_sequentially() {
        let examples = parse_examples([
            "Input: a\nOutput: b",
            "Constraints only",
            "Input: c\nOutput: d\nExplanation: e",
        ]);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].example_number, 1);
        assert_eq!(examples[1].example_number, 2);
        assert_eq!(examples[1].input, "c");
    }

    #[test]
    fn test_constraint_filter() {
        let kept = filter_constraints([
            "1 <= nums.length <= 10^4",
            "Expected Time Complexity: O(n)",
            "Follow-up: Can you come up with an algorithm that is less than O(n2) time complexity?",
            "  ",
            "Space complexity should be constant",
        ]);
        assert_eq!(
            kept,
            vec![
                "Expected Time Complexity: O(n)".to_string(),
                "Follow-up: Can you come up with an algorithm that is less than O(n2) time complexity?"
                    .to_string(),
                "Space complexity should be constant".to_string(),
            ]
        );
    }

    #[test]
    fn test_description_stops_at_examples() {
        let description = description_before_examples([
            "Given an array of integers, for example a sorted one,",
            "return indices.",
            "Example 1:",
            "Input: ...",
        ]);
        assert_eq!(
            description,
            "Given an array of integers, for example a sorted one,\nreturn indices."
        );
    }

    #[test]
    fn test_strip_examples_section() {
        let text = "Find the max.\nFor example, negative values count.\n\nExample 1:\nInput: 1\nOutput: 1";
        assert_eq!(
            strip_examples_section(text),
            "Find the max.\nFor example, negative values count."
        );
        assert_eq!(
            strip_examples_section("Find the max.\nExamples\nInput: 1"),
            "Find the max."
        );
    }

    proptest! {
        #[test]
        fn prop_examples_numbered_one_to_n(valid in proptest::collection::vec(any::<bool>(), 0..20)) {
            let blocks: Vec<String> = valid
                .iter()
                .enumerate()
                .map(|(i, ok)| {
                    if *ok {
                        format!("Input: x = {}\nOutput: {}", i, i * 2)
                    } else {
                        format!("Input: x = {}", i)
                    }
                })
                .collect();

            let examples = parse_examples(&blocks);

            prop_assert_eq!(examples.len(), valid.iter().filter(|ok| **ok).count());
            for (i, example) in examples.iter().enumerate() {
                prop_assert_eq!(example.example_number, i + 1);
                prop_assert!(!example.input.is_empty());
                prop_assert!(!example.output.is_empty());
            }
        }
    }
}

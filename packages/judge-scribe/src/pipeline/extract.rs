//! Field extraction from a page snapshot into a [`ProblemRecord`].
//!
//! Every field is read independently and falls back to its sentinel,
//! so one restructured element never costs the others. Only the code
//! field waits: the editor often renders after the rest of the page,
//! so the pipeline re-reads the page on a bounded retry limit.

use chrono::Utc;
use scraper::Html;
use tracing::{debug, info, warn};

use super::gate::{EpochId, EpochState};
use super::parse::{filter_constraints, parse_examples};
use crate::adapters::PageAdapter;
use crate::error::{ExtractionError, Result};
use crate::page::LivePage;
use crate::types::config::RetryPolicy;
use crate::types::record::{
    split_title, Difficulty, ProblemRecord, CODE_NOT_FOUND, DESCRIPTION_NOT_FOUND,
    TITLE_NOT_FOUND,
};

/// A finished extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: ProblemRecord,
    /// False if the editor never rendered and the code is the sentinel.
    pub code_found: bool,
    /// Editor checks performed.
    pub attempts: u32,
}

/// Builds records from live pages.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    retry: RetryPolicy,
}

impl ExtractionPipeline {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Extract a record for `epoch`, whose page lives at `location`.
    ///
    /// Checks for the editor up to `max_retries + 1` times. Before each
    /// check the epoch must still be current; a navigation in between
    /// ends the run with [`ExtractionError::Superseded`]. A snapshot
    /// taken after the page moved away from `location` ends it with
    /// [`ExtractionError::LocationChanged`], even if the tracker has not
    /// started the next epoch yet. When the limit runs out the record is
    /// built anyway with the code sentinel.
    pub async fn run(
        &self,
        page: &dyn LivePage,
        adapter: &dyn PageAdapter,
        epochs: &EpochState,
        epoch: EpochId,
        location: &str,
    ) -> Result<Extraction> {
        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            if !epochs.is_current(epoch) {
                let current = epochs.current();
                info!(epoch = %epoch, current = %current, "extraction superseded by navigation");
                return Err(ExtractionError::Superseded { current: current.0 });
            }

            attempt += 1;
            // Document before location: a snapshot of a newer page always
            // sees the newer location.
            let html = page.html();
            let url = page.location();
            if url != location {
                info!(epoch = %epoch, expected = %location, found = %url, "page moved before extraction");
                return Err(ExtractionError::LocationChanged {
                    expected: location.to_string(),
                    found: url,
                });
            }
            let out_of_retries = attempt >= attempts;

            let built = {
                let doc = Html::parse_document(&html);
                let ready = adapter.editor_ready(&doc);
                (ready || out_of_retries).then(|| (build_record(adapter, &doc, &url, ready), ready))
            };

            if let Some((record, code_found)) = built {
                if code_found {
                    debug!(attempt, title = %record.full_title, "record extracted");
                } else {
                    warn!(attempts, "editor never rendered; committing code sentinel");
                }
                return Ok(Extraction {
                    record,
                    code_found,
                    attempts: attempt,
                });
            }

            debug!(attempt, delay_ms = self.retry.delay.as_millis() as u64, "editor not ready yet");
            tokio::time::sleep(self.retry.delay).await;
        }
    }

    /// Extract from a static snapshot with no retries.
    pub fn extract_snapshot(adapter: &dyn PageAdapter, html: &str, url: &str) -> Extraction {
        let doc = Html::parse_document(html);
        let ready = adapter.editor_ready(&doc);
        Extraction {
            record: build_record(adapter, &doc, url, ready),
            code_found: ready,
            attempts: 1,
        }
    }
}

/// Run every field extractor against one snapshot.
///
/// `read_code` is false when the editor is absent; the code field then
/// takes its sentinel without consulting the adapter.
pub fn build_record(
    adapter: &dyn PageAdapter,
    doc: &Html,
    url: &str,
    read_code: bool,
) -> ProblemRecord {
    let full_title = adapter
        .title(doc)
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());
    let (problem_number, problem_name) = split_title(&full_title);

    let difficulty = adapter
        .difficulty(doc)
        .map(|label| Difficulty::from_label(&label))
        .unwrap_or_default();

    let submitted_code = read_code
        .then(|| adapter.code(doc))
        .flatten()
        .unwrap_or_else(|| CODE_NOT_FOUND.to_string());

    ProblemRecord {
        judge: adapter.judge(),
        url: url.to_string(),
        full_title,
        problem_number,
        problem_name,
        difficulty,
        topics: adapter.topics(doc),
        constraints: filter_constraints(adapter.constraint_candidates(doc)),
        examples: parse_examples(adapter.example_blocks(doc)),
        submitted_code,
        problem_description: adapter
            .description(doc)
            .unwrap_or_else(|| DESCRIPTION_NOT_FOUND.to_string()),
        notes: adapter.notes(doc).unwrap_or_default(),
        extracted_at: Utc::now(),
        ai_response: None,
    }
}

//! Integration tests for the capture session.
//!
//! These drive a `SyntheticPage` through the states the real judge page
//! goes through and check what the session captures:
//! 1. Signal detection (already accepted, accepted later)
//! 2. Gate idempotence under duplicate signals
//! 3. Navigation epochs
//! 4. Independence of extraction, explanation and sinks

use std::sync::Arc;
use std::time::Duration;

use judge_scribe::testing::{gfg_page, leetcode_page, MemorySink, MockExplainer, RecordingNotifier};
use judge_scribe::{
    AdapterRegistry, CaptureOutcome, Difficulty, EpochId, ExplainError, ExplanationStatus,
    ExtractionError, Judge, LeetCodeAdapter, Notification, RetryPolicy, ScribeConfig, Session, SessionHandle,
    SyntheticPage,
};

const TWO_SUM: &str = "https://leetcode.com/problems/two-sum/";
const THREE_SUM: &str = "https://leetcode.com/problems/3sum/";
const CODE: &[&str] = &["class Solution:", "    def twoSum(self, nums, target):", "        return []"];

struct Harness {
    page: Arc<SyntheticPage>,
    explainer: Arc<MockExplainer>,
    sink: MemorySink,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(url: &str, html: String, explainer: MockExplainer) -> Self {
        Self {
            page: Arc::new(SyntheticPage::new(url, html)),
            explainer: Arc::new(explainer),
            sink: MemorySink::new(),
            notifier: RecordingNotifier::new(),
        }
    }

    fn session(&self, retry: RetryPolicy) -> Session {
        Session::new(self.page.clone())
            .with_adapters(
                AdapterRegistry::new().with_adapter(LeetCodeAdapter::new().with_settle(Duration::ZERO)),
            )
            .with_config(
                ScribeConfig::new()
                    .with_code_retry(retry)
                    .with_navigation_settle(Duration::ZERO),
            )
            .with_explainer(self.explainer.clone())
            .with_sink(Arc::new(self.sink.clone()))
            .with_notifier(Arc::new(self.notifier.clone()))
    }

    fn start(&self) -> SessionHandle {
        Arc::new(self.session(RetryPolicy::new(Duration::from_millis(5), 3))).start()
    }
}

async fn next(handle: &mut SessionHandle) -> Result<CaptureOutcome, ExtractionError> {
    tokio::time::timeout(Duration::from_secs(5), handle.next_outcome())
        .await
        .expect("capture did not finish in time")
        .expect("session closed")
}

fn accepted(title: &str) -> String {
    leetcode_page(title, "Accepted", Some(CODE))
}

fn pending(title: &str) -> String {
    leetcode_page(title, "", Some(CODE))
}

#[tokio::test]
async fn test_page_already_accepted_is_captured_once() {
    let harness = Harness::new(TWO_SUM, accepted("1. Two Sum"), MockExplainer::replying("Use a map."));
    let mut handle = harness.start();

    let outcome = next(&mut handle).await.unwrap();

    assert_eq!(outcome.epoch, EpochId(0));
    assert_eq!(outcome.record.full_title, "1. Two Sum");
    assert!(outcome.code_found);
    assert_eq!(outcome.explanation, ExplanationStatus::Received);
    assert_eq!(outcome.record.ai_response.as_deref(), Some("Use a map."));
    assert_eq!(harness.sink.records().len(), 1);
    assert!(harness.notifier.contains(&Notification::ExtractionSucceeded {
        title: "1. Two Sum".into()
    }));
    assert!(harness.notifier.contains(&Notification::ExplanationReceived));

    let calls = harness.explainer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "1. Two Sum");
    assert_eq!(calls[0].code, CODE.join("\n"));
}

#[tokio::test]
async fn test_duplicate_signals_run_pipeline_once() {
    let harness = Harness::new(TWO_SUM, pending("1. Two Sum"), MockExplainer::replying("ok"));
    let mut handle = harness.start();

    harness.page.set_html(leetcode_page("1. Two Sum", "Judging", Some(CODE)));
    for _ in 0..5 {
        harness.page.set_html(accepted("1. Two Sum"));
        harness.page.touch();
    }

    next(&mut handle).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handle.try_next_outcome().is_none());
    assert_eq!(harness.sink.records().len(), 1);
    assert_eq!(harness.explainer.calls().len(), 1);

    // A direct capture request for the same epoch is absorbed too.
    assert!(handle.session().capture_now().await.unwrap().is_none());
}

#[tokio::test]
async fn test_wrong_answer_is_not_a_signal() {
    let harness = Harness::new(TWO_SUM, pending("1. Two Sum"), MockExplainer::replying("ok"));
    let mut handle = harness.start();

    harness
        .page
        .set_html(leetcode_page("1. Two Sum", "Wrong Answer", Some(CODE)));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handle.try_next_outcome().is_none());
    assert!(harness.sink.records().is_empty());
}

#[tokio::test]
async fn test_navigation_starts_new_epoch() {
    let harness = Harness::new(TWO_SUM, accepted("1. Two Sum"), MockExplainer::replying("ok"));
    let mut handle = harness.start();

    let first = next(&mut handle).await.unwrap();
    assert_eq!(first.epoch, EpochId(0));

    harness.page.navigate(THREE_SUM, pending("15. 3Sum"));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.epoch(), EpochId(1));

    harness.page.set_html(accepted("15. 3Sum"));
    let second = next(&mut handle).await.unwrap();

    assert_eq!(second.epoch, EpochId(1));
    assert_eq!(second.record.full_title, "15. 3Sum");
    assert_eq!(second.record.url, THREE_SUM);
    assert_eq!(harness.sink.records().len(), 2);
}

#[tokio::test]
async fn test_navigation_supersedes_pending_retry_loop() {
    // Accepted, but the editor never renders: the pipeline keeps retrying.
    let harness = Harness::new(
        TWO_SUM,
        leetcode_page("1. Two Sum", "Accepted", None),
        MockExplainer::replying("ok"),
    );
    let mut handle =
        Arc::new(harness.session(RetryPolicy::new(Duration::from_millis(20), 50))).start();

    tokio::time::sleep(Duration::from_millis(30)).await;
    harness.page.navigate(THREE_SUM, pending("15. 3Sum"));

    let outcome = next(&mut handle).await;

    assert!(matches!(outcome, Err(ExtractionError::Superseded { current: 1 })));
    assert!(harness.sink.records().is_empty());
    assert!(harness.explainer.calls().is_empty());
}

#[tokio::test]
async fn test_explanation_failure_keeps_record_and_artifact() {
    let harness = Harness::new(
        TWO_SUM,
        accepted("1. Two Sum"),
        MockExplainer::failing(ExplainError::Network("connection reset".into())),
    );
    let mut handle = harness.start();

    let outcome = next(&mut handle).await.unwrap();

    assert!(matches!(
        outcome.explanation,
        ExplanationStatus::Failed(ExplainError::Network(_))
    ));
    assert!(outcome.record.ai_response.is_none());
    assert_eq!(outcome.artifacts.len(), 1);

    let saved = harness.sink.records();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].full_title, "1. Two Sum");
    assert_eq!(saved[0].submitted_code, CODE.join("\n"));

    assert!(harness.notifier.contains(&Notification::ExtractionSucceeded {
        title: "1. Two Sum".into()
    }));
    assert!(harness
        .notifier
        .notifications()
        .iter()
        .any(|n| matches!(n, Notification::ExplanationFailed { .. })));
}

#[tokio::test]
async fn test_missing_credential_is_notified() {
    let harness = Harness::new(
        TWO_SUM,
        accepted("1. Two Sum"),
        MockExplainer::failing(ExplainError::MissingCredential),
    );
    let mut handle = harness.start();

    let outcome = next(&mut handle).await.unwrap();

    assert_eq!(
        outcome.explanation,
        ExplanationStatus::Failed(ExplainError::MissingCredential)
    );
    assert!(harness.notifier.contains(&Notification::CredentialMissing));
    assert_eq!(harness.sink.records().len(), 1);
}

#[tokio::test]
async fn test_failing_sink_does_not_affect_others() {
    let harness = Harness::new(TWO_SUM, accepted("1. Two Sum"), MockExplainer::replying("ok"));
    let session = harness
        .session(RetryPolicy::new(Duration::from_millis(5), 3))
        .with_sink(Arc::new(MemorySink::failing()));
    let mut handle = Arc::new(session).start();

    let outcome = next(&mut handle).await.unwrap();

    assert_eq!(outcome.artifacts.len(), 1);
    assert_eq!(outcome.sink_failures.len(), 1);
    assert_eq!(outcome.sink_failures[0].sink, "memory");
    assert_eq!(harness.sink.records().len(), 1);
    assert!(harness
        .notifier
        .notifications()
        .iter()
        .any(|n| matches!(n, Notification::ArtifactFailed { .. })));
}

#[tokio::test]
async fn test_unsupported_start_page_then_navigation() {
    let harness = Harness::new(
        "https://leetcode.com/problemset/",
        "<html><body>Problem list</body></html>".to_string(),
        MockExplainer::replying("ok"),
    );
    let mut handle = harness.start();

    harness.page.navigate(TWO_SUM, accepted("1. Two Sum"));
    let outcome = next(&mut handle).await.unwrap();

    assert_eq!(outcome.epoch, EpochId(1));
    assert_eq!(outcome.record.full_title, "1. Two Sum");
}

#[tokio::test]
async fn test_shutdown_disconnects_page_observers() {
    let harness = Harness::new(TWO_SUM, pending("1. Two Sum"), MockExplainer::replying("ok"));
    let handle = harness.start();
    assert!(harness.page.observer_count() >= 1);

    handle.shutdown();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(harness.page.observer_count(), 0);
    harness.page.set_html(accepted("1. Two Sum"));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.sink.records().is_empty());
}

#[tokio::test]
async fn test_gfg_solved_banner_triggers_capture() {
    let url = "https://www.geeksforgeeks.org/problems/kadanes-algorithm-1587115620/1";
    let page = Arc::new(SyntheticPage::new(url, gfg_page("Kadane's Algorithm", false, false)));
    let sink = MemorySink::new();
    let session = Session::new(page.clone())
        .with_adapters(AdapterRegistry::with_builtin())
        .with_config(
            ScribeConfig::new()
                .with_code_retry(RetryPolicy::new(Duration::from_millis(5), 3))
                .with_explain(false),
        )
        .with_sink(Arc::new(sink.clone()));
    let mut handle = Arc::new(session).start();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(handle.try_next_outcome().is_none());

    // A fully loaded page is not a solved one.
    page.set_html(gfg_page("Kadane's Algorithm", true, false));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(handle.try_next_outcome().is_none());

    page.set_html(gfg_page("Kadane's Algorithm", true, true));
    let outcome = next(&mut handle).await.unwrap();
    let record = outcome.record;

    assert_eq!(record.judge, Judge::Gfg);
    assert_eq!(record.full_title, "Kadane's Algorithm");
    assert_eq!(record.difficulty, Difficulty::Medium);
    assert_eq!(record.topics, vec!["Arrays"]);
    assert_eq!(record.constraints, vec!["Expected Time Complexity: O(n)"]);
    assert_eq!(record.examples.len(), 1);
    assert_eq!(record.examples[0].output, "9");
    assert!(outcome.code_found);
    assert_eq!(outcome.explanation, ExplanationStatus::Skipped);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_navigation_racing_old_watcher_captures_new_page_once() {
    const PROBLEM_A: &str = "https://www.geeksforgeeks.org/problems/problem-a/1";
    const PROBLEM_B: &str = "https://www.geeksforgeeks.org/problems/problem-b/1";

    for _ in 0..100 {
        let page = Arc::new(SyntheticPage::new(PROBLEM_A, gfg_page("Problem A", true, false)));
        let sink = MemorySink::new();
        let session = Session::new(page.clone())
            .with_adapters(AdapterRegistry::with_builtin())
            .with_config(
                ScribeConfig::new()
                    .with_code_retry(RetryPolicy::new(Duration::from_millis(1), 3))
                    .with_navigation_settle(Duration::ZERO)
                    .with_explain(false),
            )
            .with_sink(Arc::new(sink.clone()));
        let mut handle = Arc::new(session).start();

        // Solved on arrival: the old epoch's watcher and the navigation
        // tracker see the same mutation batch.
        page.navigate(PROBLEM_B, gfg_page("Problem B", true, true));

        let outcome = next(&mut handle).await.unwrap();
        assert_eq!(outcome.epoch, EpochId(1));
        assert_eq!(outcome.record.full_title, "Problem B");
        assert_eq!(outcome.record.url, PROBLEM_B);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.try_next_outcome().is_none());
        assert_eq!(sink.records().len(), 1);
    }
}

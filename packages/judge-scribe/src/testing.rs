//! Testing utilities including mock collaborators and page fixtures.
//!
//! These let applications exercise a full session without a browser,
//! a generative-AI key, or network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::error::{ExplainError, ExplainResult, PersistError};
use crate::page::{LivePage, MutationBatch};
use crate::traits::{
    explainer::ExplanationRequester,
    notifier::{Notification, Notifier},
    sink::{ArtifactSink, PersistedArtifact},
};
use crate::types::record::ProblemRecord;

/// A page that serves a fixed sequence of snapshots.
///
/// Each `html()` call returns the next snapshot; the last one repeats.
/// It never publishes mutations.
pub struct ScriptedPage {
    url: String,
    snapshots: Vec<String>,
    reads: AtomicUsize,
    mutations: broadcast::Sender<MutationBatch>,
}

impl ScriptedPage {
    pub fn new(url: impl Into<String>, snapshots: Vec<String>) -> Self {
        let (mutations, _) = broadcast::channel(1);
        Self {
            url: url.into(),
            snapshots,
            reads: AtomicUsize::new(0),
            mutations,
        }
    }

    /// Number of `html()` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl LivePage for ScriptedPage {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn html(&self) -> String {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        let index = read.min(self.snapshots.len().saturating_sub(1));
        self.snapshots.get(index).cloned().unwrap_or_default()
    }

    fn observe(&self) -> broadcast::Receiver<MutationBatch> {
        self.mutations.subscribe()
    }
}

/// Record of a call made to the mock explainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainCall {
    pub code: String,
    pub title: String,
}

/// A mock explanation requester with a canned result.
#[derive(Clone)]
pub struct MockExplainer {
    result: ExplainResult<String>,
    delay: Duration,
    calls: Arc<RwLock<Vec<ExplainCall>>>,
}

impl MockExplainer {
    /// Always succeed with `explanation`.
    pub fn replying(explanation: impl Into<String>) -> Self {
        Self {
            result: Ok(explanation.into()),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: ExplainError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<ExplainCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ExplanationRequester for MockExplainer {
    async fn explain(&self, code: &str, title: &str) -> ExplainResult<String> {
        self.calls.write().unwrap().push(ExplainCall {
            code: code.to_string(),
            title: title.to_string(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Notifier that keeps every notification for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().unwrap().clone()
    }

    pub fn contains(&self, notification: &Notification) -> bool {
        self.notifications.read().unwrap().contains(notification)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.write().unwrap().push(notification);
    }
}

/// Sink that keeps persisted records in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<RwLock<Vec<ProblemRecord>>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ProblemRecord> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn persist(&self, record: &ProblemRecord) -> Result<PersistedArtifact, PersistError> {
        if self.fail {
            return Err(PersistError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory sink configured to fail",
            )));
        }
        self.records.write().unwrap().push(record.clone());
        Ok(PersistedArtifact::new("memory", record.artifact_filename()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A LeetCode problem page.
///
/// `result` is the submission-result label ("Accepted", "Wrong Answer",
/// or empty for none). `code` adds a Monaco editor with these lines.
pub fn leetcode_page(title: &str, result: &str, code: Option<&[&str]>) -> String {
    let result_label = if result.is_empty() {
        String::new()
    } else {
        format!(r#"<span data-e2e-locator="submission-result">{}</span>"#, result)
    };
    let editor = code
        .map(|lines| {
            let lines: String = lines
                .iter()
                .map(|line| format!(r#"<div class="view-line">{}</div>"#, line))
                .collect();
            format!(r#"<div class="view-lines">{}</div>"#, lines)
        })
        .unwrap_or_default();

    format!(
        r#"<html><body>
<div class="text-title-large"><a href="/problems/two-sum/">{title}</a></div>
<div class="text-difficulty-easy">Easy</div>
<a href="/tag/array/">Array</a><a href="/tag/hash-table/">Hash Table</a>
<div data-track-load="description_content">
<p>Given an array of integers <code>nums</code> and an integer <code>target</code>, return indices of the two numbers such that they add up to <code>target</code>.</p>
<p><strong class="example">Example 1:</strong></p>
<pre>Input: nums = [2,7,11,15], target = 9
Output: [0,1]
Explanation: Because nums[0] + nums[1] == 9, we return [0, 1].</pre>
<p><strong>Constraints:</strong></p>
<ul><li><code>2 &lt;= nums.length &lt;= 10^4</code></li><li>Only one valid answer exists.</li></ul>
<p><strong>Follow-up:</strong> Can you come up with an algorithm that is less than O(n^2) time complexity?</p>
</div>
{result_label}
{editor}
</body></html>"#
    )
}

/// A GeeksforGeeks problem page, optionally with its Ace editor and the
/// solved banner.
pub fn gfg_page(title: &str, with_editor: bool, solved: bool) -> String {
    let editor = if with_editor {
        r#"<div class="ace_editor"><div class="ace_text-layer"><div class="ace_line">int maxSubarraySum(vector&lt;int&gt; &amp;arr) {</div><div class="ace_line">}</div></div></div>"#
    } else {
        ""
    };
    let banner = if solved {
        r#"<div class="problems_problem_solved_successfully__Zb4yG">Problem Solved Successfully</div>"#
    } else {
        ""
    };

    format!(
        r#"<html><body>
<h1>{title}</h1>
<div class="problem-tags"><span class="difficulty-medium">Medium</span><a>Arrays</a></div>
<div class="problem-statement">
<p>Given an integer array arr[], find the maximum sum of a subarray.</p>
<p><strong>Examples:</strong></p>
<pre>Input: arr[] = [1, 2, 3, -2, 5]
Output: 9</pre>
<p>Expected Time Complexity: O(n)</p>
</div>
{editor}
{banner}
</body></html>"#
    )
}

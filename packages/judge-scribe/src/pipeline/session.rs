//! Session orchestration.
//!
//! A [`Session`] owns one page for its whole lifetime. It tracks
//! navigation epochs, keeps a signal watcher armed for the current
//! epoch, and on the signal runs the capture chain:
//!
//! ```text
//! signal -> gate -> extraction -> explanation -> sinks
//! ```
//!
//! Each step strictly follows the previous one within an epoch. The
//! explanation step and every sink are independent outcomes: a failure
//! in one never undoes the extraction or the other sinks.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::epoch::NavigationEpochTracker;
use super::extract::ExtractionPipeline;
use super::gate::EpochId;
use super::watcher::{SignalWatcher, WatchHandle};
use crate::adapters::{AdapterRegistry, PageAdapter};
use crate::error::{ExplainError, ExtractionError, Result};
use crate::notify::TracingNotifier;
use crate::page::{LivePage, MutationBatch};
use crate::traits::{
    explainer::ExplanationRequester,
    notifier::{Notification, Notifier},
    sink::{ArtifactSink, PersistedArtifact},
};
use crate::types::config::ScribeConfig;
use crate::types::record::ProblemRecord;

/// How the explanation step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationStatus {
    /// Explanation attached to the record
    Received,
    /// The requester failed or timed out
    Failed(ExplainError),
    /// Not attempted (disabled, no requester, or no code)
    Skipped,
}

/// A sink that could not persist the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink: String,
    pub reason: String,
}

/// Everything one capture produced.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub epoch: EpochId,
    pub record: ProblemRecord,
    pub code_found: bool,
    pub explanation: ExplanationStatus,
    pub artifacts: Vec<PersistedArtifact>,
    pub sink_failures: Vec<SinkFailure>,
}

struct Signal {
    epoch: EpochId,
    /// Location the watcher was armed for.
    location: String,
    adapter: Arc<dyn PageAdapter>,
}

/// Watches one page and captures one record per navigation epoch.
pub struct Session {
    page: Arc<dyn LivePage>,
    adapters: AdapterRegistry,
    pipeline: ExtractionPipeline,
    tracker: NavigationEpochTracker,
    explainer: Option<Arc<dyn ExplanationRequester>>,
    sinks: Vec<Arc<dyn ArtifactSink>>,
    notifier: Arc<dyn Notifier>,
    config: ScribeConfig,
    watcher: Mutex<Option<WatchHandle>>,
    pending_arm: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session for `page` with the built-in adapters.
    pub fn new(page: Arc<dyn LivePage>) -> Self {
        let config = ScribeConfig::default();
        Self {
            tracker: NavigationEpochTracker::new(page.location()),
            page,
            adapters: AdapterRegistry::with_builtin(),
            pipeline: ExtractionPipeline::new(config.code_retry),
            explainer: None,
            sinks: Vec::new(),
            notifier: Arc::new(TracingNotifier::new()),
            config,
            watcher: Mutex::new(None),
            pending_arm: Mutex::new(None),
        }
    }

    /// Replace the adapter registry.
    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    /// Set the explanation requester.
    pub fn with_explainer(mut self, explainer: Arc<dyn ExplanationRequester>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Add an artifact sink. Sinks run in registration order.
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Set the notification surface.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set timing and retry configuration.
    pub fn with_config(mut self, config: ScribeConfig) -> Self {
        self.pipeline = ExtractionPipeline::new(config.code_retry);
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// The current navigation epoch.
    pub fn epoch(&self) -> EpochId {
        self.tracker.state().current()
    }

    /// Start watching the page.
    ///
    /// The watcher for the current epoch is armed before this returns,
    /// so a page that is already in the signal state is captured
    /// without waiting for another mutation.
    pub fn start(self: Arc<Self>) -> SessionHandle {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        // Subscribe before arming so no navigation slips between them.
        let mutations = self.page.observe();
        self.arm(self.epoch(), &signal_tx);

        let catch_up = signal_tx.downgrade();
        let navigation = tokio::spawn(self.clone().navigation_loop(mutations, signal_tx));
        let signals = tokio::spawn(self.clone().signal_loop(signal_rx, catch_up, outcome_tx));

        info!(url = %self.page.location(), "session started");
        SessionHandle {
            session: self,
            outcomes: outcome_rx,
            tasks: vec![navigation, signals],
        }
    }

    /// Capture the current epoch immediately, without waiting for a signal.
    ///
    /// Claims the epoch's gate like a signal would. Returns `Ok(None)` if
    /// the epoch was already captured.
    pub async fn capture_now(&self) -> Result<Option<CaptureOutcome>> {
        let location = self.page.location();
        let adapter = self
            .adapters
            .for_url(&location)
            .ok_or_else(|| ExtractionError::UnsupportedPage {
                url: location.clone(),
            })?;

        // The current epoch belongs to the last location the tracker saw.
        let tracked = self.tracker.last_url();
        if tracked != location {
            return Err(ExtractionError::LocationChanged {
                expected: tracked,
                found: location,
            });
        }

        let epoch = self.epoch();
        if !self.tracker.state().try_enter(epoch) {
            debug!(epoch = %epoch, "epoch already captured");
            return Ok(None);
        }
        self.capture(epoch, adapter, &location).await.map(Some)
    }

    fn lock_watcher(&self) -> MutexGuard<'_, Option<WatchHandle>> {
        self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_pending_arm(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_arm
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Arm a fresh watcher for `epoch`, replacing any previous one.
    fn arm(&self, epoch: EpochId, signals: &mpsc::UnboundedSender<Signal>) {
        let url = self.page.location();
        let Some(adapter) = self.adapters.for_url(&url) else {
            debug!(url = %url, "no adapter for page; watcher not armed");
            self.disarm();
            return;
        };

        let predicate_adapter = adapter.clone();
        let page = self.page.clone();
        let armed_url = url.clone();
        let tx = signals.clone();
        let location = url.clone();
        let handle = SignalWatcher::new(self.page.clone()).start(
            // The watcher reads the document before calling this, so a
            // document from a newer page always fails the location check.
            move |doc| page.location() == armed_url && predicate_adapter.is_signal(doc),
            move || {
                // A closed channel means the session shut down.
                let _ = tx.send(Signal {
                    epoch,
                    location,
                    adapter,
                });
            },
        );

        debug!(epoch = %epoch, url = %url, fired = handle.fired(), "watcher armed");
        *self.lock_watcher() = Some(handle);
    }

    fn disarm(&self) {
        if let Some(mut handle) = self.lock_watcher().take() {
            handle.disconnect();
        }
    }

    async fn navigation_loop(
        self: Arc<Self>,
        mut mutations: broadcast::Receiver<MutationBatch>,
        signals: mpsc::UnboundedSender<Signal>,
    ) {
        loop {
            match mutations.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => {
                    debug!("page mutation feed closed; navigation tracking stopped");
                    return;
                }
            }

            self.follow_location(&signals);
        }
    }

    /// Start a new epoch if the page moved since the tracker last looked.
    ///
    /// Disarms the old watcher and re-arms after `navigation_settle`.
    fn follow_location(self: &Arc<Self>, signals: &mpsc::UnboundedSender<Signal>) -> Option<EpochId> {
        let epoch = self.tracker.observe_location(&self.page.location())?;

        self.disarm();

        let session = self.clone();
        let signals = signals.clone();
        let rearm = tokio::spawn(async move {
            tokio::time::sleep(session.config.navigation_settle).await;
            if session.tracker.state().is_current(epoch) {
                session.arm(epoch, &signals);
            }
        });
        if let Some(previous) = self.lock_pending_arm().replace(rearm) {
            previous.abort();
        }
        Some(epoch)
    }

    async fn signal_loop(
        self: Arc<Self>,
        mut signals: mpsc::UnboundedReceiver<Signal>,
        catch_up: mpsc::WeakUnboundedSender<Signal>,
        outcomes: mpsc::UnboundedSender<Result<CaptureOutcome>>,
    ) {
        while let Some(Signal {
            epoch,
            location,
            adapter,
        }) = signals.recv().await
        {
            // The navigation loop may not have seen the mutation batch that
            // produced this signal yet. Catch up first so a signal from the
            // old epoch cannot claim its gate.
            if let Some(sender) = catch_up.upgrade() {
                if let Some(current) = self.follow_location(&sender) {
                    debug!(epoch = %epoch, current = %current, "navigation seen before signal");
                }
            }

            if !self.tracker.state().try_enter(epoch) {
                debug!(epoch = %epoch, "signal absorbed by gate");
                continue;
            }

            info!(epoch = %epoch, judge = %adapter.judge(), "signal reached; capturing");
            let session = self.clone();
            let outcomes = outcomes.clone();
            tokio::spawn(async move {
                tokio::time::sleep(adapter.signal_settle()).await;
                let outcome = session.capture(epoch, adapter, &location).await;
                if let Err(e) = &outcome {
                    info!(epoch = %epoch, error = %e, "capture ended without a record");
                }
                let _ = outcomes.send(outcome);
            });
        }
    }

    async fn capture(
        &self,
        epoch: EpochId,
        adapter: Arc<dyn PageAdapter>,
        location: &str,
    ) -> Result<CaptureOutcome> {
        let extraction = self
            .pipeline
            .run(
                self.page.as_ref(),
                adapter.as_ref(),
                self.tracker.state(),
                epoch,
                location,
            )
            .await?;
        let mut record = extraction.record;

        self.notifier.notify(Notification::ExtractionSucceeded {
            title: record.full_title.clone(),
        });
        if !extraction.code_found {
            self.notifier.notify(Notification::CodeNotLoaded);
        }

        let explanation = self.explain(&mut record).await;
        let (artifacts, sink_failures) = self.persist(&record).await;

        Ok(CaptureOutcome {
            epoch,
            record,
            code_found: extraction.code_found,
            explanation,
            artifacts,
            sink_failures,
        })
    }

    async fn explain(&self, record: &mut ProblemRecord) -> ExplanationStatus {
        let Some(explainer) = self.explainer.as_ref().filter(|_| self.config.explain) else {
            return ExplanationStatus::Skipped;
        };
        if !record.has_code() {
            info!("no submitted code; skipping explanation");
            return ExplanationStatus::Skipped;
        }

        let request = explainer.explain(&record.submitted_code, &record.full_title);
        let result = match tokio::time::timeout(self.config.explain_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ExplainError::Network(format!(
                "timed out after {}s",
                self.config.explain_timeout.as_secs_f32()
            ))),
        };

        match result {
            Ok(text) => {
                record.attach_explanation(text);
                self.notifier.notify(Notification::ExplanationReceived);
                ExplanationStatus::Received
            }
            Err(ExplainError::MissingCredential) => {
                warn!(provider = explainer.name(), "explanation credential missing");
                self.notifier.notify(Notification::CredentialMissing);
                ExplanationStatus::Failed(ExplainError::MissingCredential)
            }
            Err(e) => {
                warn!(provider = explainer.name(), error = %e, "explanation failed");
                self.notifier.notify(Notification::ExplanationFailed {
                    reason: e.to_string(),
                });
                ExplanationStatus::Failed(e)
            }
        }
    }

    async fn persist(&self, record: &ProblemRecord) -> (Vec<PersistedArtifact>, Vec<SinkFailure>) {
        let mut artifacts = Vec::new();
        let mut failures = Vec::new();

        for sink in &self.sinks {
            match sink.persist(record).await {
                Ok(artifact) => {
                    debug!(sink = %artifact.sink, location = %artifact.location, "artifact saved");
                    self.notifier.notify(Notification::ArtifactSaved {
                        location: artifact.location.clone(),
                    });
                    artifacts.push(artifact);
                }
                Err(e) => {
                    warn!(sink = sink.name(), error = %e, "artifact sink failed");
                    self.notifier.notify(Notification::ArtifactFailed {
                        sink: sink.name().to_string(),
                        reason: e.to_string(),
                    });
                    failures.push(SinkFailure {
                        sink: sink.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (artifacts, failures)
    }
}

/// A running session. Dropping it stops all background work.
pub struct SessionHandle {
    session: Arc<Session>,
    outcomes: mpsc::UnboundedReceiver<Result<CaptureOutcome>>,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionHandle {
    /// Wait for the next finished capture.
    ///
    /// Superseded captures are reported as
    /// [`ExtractionError::Superseded`].
    pub async fn next_outcome(&mut self) -> Option<Result<CaptureOutcome>> {
        self.outcomes.recv().await
    }

    /// A capture that already finished, if any.
    pub fn try_next_outcome(&mut self) -> Option<Result<CaptureOutcome>> {
        self.outcomes.try_recv().ok()
    }

    pub fn epoch(&self) -> EpochId {
        self.session.epoch()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Stop watching. Captures already in flight are abandoned.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(pending) = self.session.lock_pending_arm().take() {
            pending.abort();
        }
        self.session.disarm();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LeetCodeAdapter;
    use crate::page::SyntheticPage;
    use crate::testing::{leetcode_page, MemorySink, MockExplainer, RecordingNotifier};
    use crate::types::config::RetryPolicy;
    use std::time::Duration;

    const URL: &str = "https://leetcode.com/problems/two-sum/";

    fn session(page: SyntheticPage) -> Session {
        Session::new(Arc::new(page))
            .with_adapters(
                AdapterRegistry::new().with_adapter(LeetCodeAdapter::new().with_settle(Duration::ZERO)),
            )
            .with_config(
                ScribeConfig::new()
                    .with_code_retry(RetryPolicy::new(Duration::from_millis(1), 2))
                    .with_navigation_settle(Duration::ZERO),
            )
    }

    #[tokio::test]
    async fn test_capture_now_claims_gate_once() {
        let page = SyntheticPage::new(URL, leetcode_page("1. Two Sum", "", Some(&["return []"])));
        let sink = MemorySink::new();
        let session = session(page).with_sink(Arc::new(sink.clone()));

        let outcome = session.capture_now().await.unwrap().unwrap();
        assert_eq!(outcome.record.full_title, "1. Two Sum");
        assert_eq!(outcome.explanation, ExplanationStatus::Skipped);
        assert_eq!(sink.records().len(), 1);

        assert!(session.capture_now().await.unwrap().is_none());
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_capture_now_rejects_unknown_page() {
        let page = SyntheticPage::new("https://example.com/", "<body></body>");
        let result = session(page).capture_now().await;
        assert!(matches!(result, Err(ExtractionError::UnsupportedPage { .. })));
    }

    #[tokio::test]
    async fn test_capture_now_waits_for_tracker_after_navigation() {
        let page = Arc::new(SyntheticPage::new(
            URL,
            leetcode_page("1. Two Sum", "", Some(&["return []"])),
        ));
        let session = Session::new(page.clone())
            .with_adapters(AdapterRegistry::new().with_adapter(LeetCodeAdapter::new()));

        page.navigate(
            "https://leetcode.com/problems/3sum/",
            leetcode_page("15. 3Sum", "", Some(&["return []"])),
        );
        let result = session.capture_now().await;

        assert!(matches!(result, Err(ExtractionError::LocationChanged { .. })));
        assert!(session.tracker.state().gate_open());
    }

    #[tokio::test]
    async fn test_missing_code_skips_explanation() {
        let page = SyntheticPage::new(URL, leetcode_page("1. Two Sum", "Accepted", None));
        let explainer = Arc::new(MockExplainer::replying("unused"));
        let notifier = RecordingNotifier::new();
        let session = session(page)
            .with_explainer(explainer.clone())
            .with_notifier(Arc::new(notifier.clone()));

        let outcome = session.capture_now().await.unwrap().unwrap();

        assert!(!outcome.code_found);
        assert_eq!(outcome.explanation, ExplanationStatus::Skipped);
        assert!(explainer.calls().is_empty());
        assert!(notifier.contains(&Notification::CodeNotLoaded));
    }

    #[tokio::test]
    async fn test_slow_explainer_times_out() {
        let page = SyntheticPage::new(URL, leetcode_page("1. Two Sum", "", Some(&["return []"])));
        let explainer =
            Arc::new(MockExplainer::replying("late").with_delay(Duration::from_millis(200)));
        let sink = MemorySink::new();
        let session = session(page)
            .with_config(
                ScribeConfig::new()
                    .with_code_retry(RetryPolicy::new(Duration::from_millis(1), 0))
                    .with_explain_timeout(Duration::from_millis(10)),
            )
            .with_explainer(explainer)
            .with_sink(Arc::new(sink.clone()));

        let outcome = session.capture_now().await.unwrap().unwrap();

        assert!(matches!(
            outcome.explanation,
            ExplanationStatus::Failed(ExplainError::Network(_))
        ));
        assert!(outcome.record.ai_response.is_none());
        assert_eq!(sink.records().len(), 1);
    }
}

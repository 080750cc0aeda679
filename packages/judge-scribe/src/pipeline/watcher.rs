//! Single-fire page signal watcher.
//!
//! Watches a [`LivePage`]'s mutation feed and fires a callback the first
//! time a predicate over the current document becomes true. The watcher
//! unsubscribes before invoking the callback, so the callback runs at
//! most once per [`SignalWatcher::start`].

use scraper::Html;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::page::LivePage;

/// Watches one page for a target condition.
pub struct SignalWatcher {
    page: Arc<dyn LivePage>,
}

impl SignalWatcher {
    pub fn new(page: Arc<dyn LivePage>) -> Self {
        Self { page }
    }

    /// Begin watching.
    ///
    /// The predicate is checked synchronously before returning, so a
    /// condition that is already true fires without waiting for another
    /// mutation. Otherwise it is re-checked on every mutation batch.
    /// If the condition never becomes true the watcher stays inert until
    /// disconnected.
    pub fn start<P, F>(&self, predicate: P, on_signal: F) -> WatchHandle
    where
        P: Fn(&Html) -> bool + Send + Sync + 'static,
        F: FnOnce() + Send + 'static,
    {
        let fired = Arc::new(AtomicBool::new(false));

        // Subscribe before the first check so no batch slips between them.
        let mut mutations = self.page.observe();

        if evaluate(self.page.as_ref(), &predicate) {
            drop(mutations);
            fired.store(true, Ordering::Release);
            debug!("signal condition already true at start");
            on_signal();
            return WatchHandle { task: None, fired };
        }

        let page = self.page.clone();
        let task_fired = fired.clone();
        let task = tokio::spawn(async move {
            loop {
                match mutations.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if evaluate(page.as_ref(), &predicate) {
                            drop(mutations);
                            task_fired.store(true, Ordering::Release);
                            debug!("signal condition reached");
                            on_signal();
                            return;
                        }
                    }
                    Err(RecvError::Closed) => {
                        trace!("mutation feed closed before signal");
                        return;
                    }
                }
            }
        });

        WatchHandle {
            task: Some(task),
            fired,
        }
    }
}

fn evaluate<P>(page: &dyn LivePage, predicate: &P) -> bool
where
    P: Fn(&Html) -> bool,
{
    predicate(&page.snapshot())
}

/// Handle to a running watcher. Dropping it disconnects the watcher.
#[derive(Debug)]
pub struct WatchHandle {
    task: Option<JoinHandle<()>>,
    fired: Arc<AtomicBool>,
}

impl WatchHandle {
    /// Whether the signal has fired.
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Whether the watcher is still observing.
    pub fn is_watching(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop observing without firing.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

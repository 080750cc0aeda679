//! In-memory page used by tests and snapshot replay.

use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use super::{LivePage, MutationBatch};

const MUTATION_CHANNEL_CAPACITY: usize = 64;

struct PageState {
    url: String,
    html: String,
    seq: u64,
}

/// A page whose document is replaced wholesale by the caller.
///
/// Every change publishes one [`MutationBatch`], mirroring how a
/// mutation observer sees a render pass on the real host page.
///
/// # Example
///
/// ```rust
/// use judge_scribe::page::{LivePage, SyntheticPage};
///
/// let page = SyntheticPage::new("https://leetcode.com/problems/two-sum/", "<body></body>");
/// page.replace_body("<span>Accepted</span>");
/// assert!(page.html().contains("Accepted"));
/// ```
#[derive(Clone)]
pub struct SyntheticPage {
    state: Arc<RwLock<PageState>>,
    mutations: broadcast::Sender<MutationBatch>,
}

impl SyntheticPage {
    /// Create a page at `url` with the given document.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(PageState {
                url: url.into(),
                html: html.into(),
                seq: 0,
            })),
            mutations,
        }
    }

    /// Replace the whole document and publish a mutation batch.
    pub fn set_html(&self, html: impl Into<String>) {
        let seq = {
            let mut state = self.state.write().unwrap();
            state.html = html.into();
            state.seq += 1;
            state.seq
        };
        self.publish(seq);
    }

    /// Replace the document with `<html><body>{body}</body></html>`.
    pub fn replace_body(&self, body: &str) {
        self.set_html(format!("<html><body>{}</body></html>", body));
    }

    /// Client-side navigation: change location and document in one batch.
    pub fn navigate(&self, url: impl Into<String>, html: impl Into<String>) {
        let seq = {
            let mut state = self.state.write().unwrap();
            state.url = url.into();
            state.html = html.into();
            state.seq += 1;
            state.seq
        };
        self.publish(seq);
    }

    /// Publish a mutation batch without changing the document.
    pub fn touch(&self) {
        let seq = {
            let mut state = self.state.write().unwrap();
            state.seq += 1;
            state.seq
        };
        self.publish(seq);
    }

    /// Number of active observers.
    pub fn observer_count(&self) -> usize {
        self.mutations.receiver_count()
    }

    fn publish(&self, seq: u64) {
        // No observers is fine; the batch is simply unobserved.
        if self.mutations.send(MutationBatch { seq }).is_err() {
            debug!(seq, "mutation batch had no observers");
        }
    }
}

impl LivePage for SyntheticPage {
    fn location(&self) -> String {
        self.state.read().unwrap().url.clone()
    }

    fn html(&self) -> String {
        self.state.read().unwrap().html.clone()
    }

    fn observe(&self) -> broadcast::Receiver<MutationBatch> {
        self.mutations.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mutations_are_published() {
        let page = SyntheticPage::new("https://example.com/a", "<html></html>");
        let mut rx = page.observe();

        page.replace_body("<p>one</p>");
        page.navigate("https://example.com/b", "<html></html>");

        assert_eq!(rx.recv().await.unwrap().seq, 1);
        assert_eq!(rx.recv().await.unwrap().seq, 2);
        assert_eq!(page.location(), "https://example.com/b");
    }

    #[test]
    fn test_dropping_receiver_unsubscribes() {
        let page = SyntheticPage::new("https://example.com", "<html></html>");
        let rx = page.observe();
        assert_eq!(page.observer_count(), 1);
        drop(rx);
        assert_eq!(page.observer_count(), 0);
    }
}

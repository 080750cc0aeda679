//! Host-page abstraction.
//!
//! The judge page is owned by a third party and mutates on its own
//! schedule. [`LivePage`] exposes just enough of it for the pipeline:
//! the current location, a serialized snapshot of the document, and a
//! feed of mutation batches.

pub mod synthetic;

pub use synthetic::SyntheticPage;

use scraper::Html;
use tokio::sync::broadcast;

/// Notification that the document changed structurally.
///
/// Carries no payload: observers re-read the page on every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationBatch {
    /// Monotonic batch counter for the page
    pub seq: u64,
}

/// A live, externally mutated document.
pub trait LivePage: Send + Sync {
    /// Current location (changes on client-side navigation).
    fn location(&self) -> String;

    /// Serialized HTML of the current document.
    fn html(&self) -> String;

    /// Subscribe to mutation batches (subtree + child-list granularity).
    ///
    /// Dropping the receiver unsubscribes.
    fn observe(&self) -> broadcast::Receiver<MutationBatch>;

    /// Parse the current document.
    ///
    /// `Html` is not `Send`; keep the snapshot out of `.await` points.
    fn snapshot(&self) -> Html {
        Html::parse_document(&self.html())
    }
}

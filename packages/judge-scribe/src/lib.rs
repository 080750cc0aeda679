//! Online-Judge Submission Scribe
//!
//! Watches an online-judge problem page, waits for a submission to be
//! accepted, and captures the problem into a structured record: title,
//! difficulty, topics, constraints, examples, description and the
//! submitted code. The record can then be explained by a generative-AI
//! provider and saved as a JSON artifact locally or in a repository.
//!
//! # Usage
//!
//! ```rust,ignore
//! use judge_scribe::{Session, SyntheticPage, FileArtifactSink};
//! use judge_scribe::testing::MockExplainer;
//!
//! let page = Arc::new(SyntheticPage::new(url, html));
//! let handle = Arc::new(
//!     Session::new(page.clone())
//!         .with_explainer(Arc::new(MockExplainer::replying("...")))
//!         .with_sink(Arc::new(FileArtifactSink::new("artifacts"))),
//! )
//! .start();
//!
//! // Render the accepted state; the session captures it once.
//! page.set_html(accepted_html);
//! let outcome = handle.next_outcome().await;
//! ```
//!
//! # Modules
//!
//! - [`page`] - Live page abstraction and the in-memory `SyntheticPage`
//! - [`adapters`] - Per-judge selector strategies (LeetCode, GeeksforGeeks)
//! - [`pipeline`] - Watcher, gate, navigation epochs, extraction, session
//! - [`traits`] - Collaborator traits (explainer, sink, notifier, store)
//! - [`ai`] - Gemini explanation requester
//! - [`hosting`] - GitHub REST client
//! - [`sinks`] - Artifact sinks (local file, repository)
//! - [`stores`] - Credential stores (memory, JSON file)
//! - [`security`] - Secret handling
//! - [`testing`] - Mock collaborators and page fixtures

pub mod adapters;
pub mod ai;
pub mod config;
pub mod error;
pub mod hosting;
pub mod notify;
pub mod page;
pub mod pipeline;
pub mod security;
pub mod sinks;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{ExplainError, ExtractionError, HostingError, PersistError, StoreError};
pub use traits::{
    explainer::ExplanationRequester,
    notifier::{Notification, Notifier, Tone},
    sink::{ArtifactSink, PersistedArtifact},
    store::CredentialStore,
};
pub use types::{
    config::{RetryPolicy, ScribeConfig},
    record::{Difficulty, Example, Judge, ProblemRecord},
};

pub use adapters::{AdapterRegistry, GfgAdapter, LeetCodeAdapter, PageAdapter};
pub use ai::GeminiExplainer;
pub use hosting::{GithubClient, Repository};
pub use notify::TracingNotifier;
pub use page::{LivePage, MutationBatch, SyntheticPage};
pub use pipeline::{
    CaptureOutcome, EpochId, EpochState, ExplanationStatus, Extraction, ExtractionGate,
    ExtractionPipeline, NavigationEpochTracker, Session, SessionHandle, SignalWatcher,
    SinkFailure, WatchHandle,
};
pub use security::SecretString;
pub use sinks::{FileArtifactSink, RepositorySink};
pub use stores::{JsonFileStore, MemoryCredentialStore};

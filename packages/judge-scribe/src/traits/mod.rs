//! Core trait abstractions for the scribe library.
//!
//! These traits define the collaborators a session hands records to:
//! explanation, persistence, notification, and credential storage.

pub mod explainer;
pub mod notifier;
pub mod sink;
pub mod store;

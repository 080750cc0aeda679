//! Transient user-visible notifications.

use std::fmt;

/// Terminal states worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A record was extracted
    ExtractionSucceeded { title: String },
    /// The editor never rendered; the record carries the code sentinel
    CodeNotLoaded,
    /// The explanation arrived and was attached
    ExplanationReceived,
    /// The explanation step failed; extraction is unaffected
    ExplanationFailed { reason: String },
    /// No credential for the explanation step
    CredentialMissing,
    /// An artifact was written
    ArtifactSaved { location: String },
    /// A sink failed to write the artifact
    ArtifactFailed { sink: String, reason: String },
}

/// Success or failure coloring of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
}

impl Notification {
    pub fn tone(&self) -> Tone {
        match self {
            Notification::ExtractionSucceeded { .. }
            | Notification::ExplanationReceived
            | Notification::ArtifactSaved { .. } => Tone::Success,
            Notification::CodeNotLoaded
            | Notification::ExplanationFailed { .. }
            | Notification::CredentialMissing
            | Notification::ArtifactFailed { .. } => Tone::Failure,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ExtractionSucceeded { title } => {
                write!(f, "Problem data extracted successfully: {}", title)
            }
            Notification::CodeNotLoaded => f.write_str("Code not loaded in time"),
            Notification::ExplanationReceived => f.write_str("Explanation received"),
            Notification::ExplanationFailed { reason } => {
                write!(f, "Explanation failed: {}", reason)
            }
            Notification::CredentialMissing => {
                f.write_str("Generative-AI key missing; set it in the settings")
            }
            Notification::ArtifactSaved { location } => write!(f, "Saved {}", location),
            Notification::ArtifactFailed { sink, reason } => {
                write!(f, "Saving to {} failed: {}", sink, reason)
            }
        }
    }
}

/// Surface for transient notifications.
///
/// Must not block and must not fail: notifications are best-effort.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

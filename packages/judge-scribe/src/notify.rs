//! Notifier that writes notifications to the log.

use tracing::{info, warn};

use crate::traits::notifier::{Notification, Notifier, Tone};

/// Logs every notification: successes at info, failures at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.tone() {
            Tone::Success => info!(target: "judge_scribe::notify", "{}", notification),
            Tone::Failure => warn!(target: "judge_scribe::notify", "{}", notification),
        }
    }
}

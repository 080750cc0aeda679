//! One-shot extraction latch and the navigation epoch it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Identifier of a navigation epoch. The first epoch is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpochId(pub u64);

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A boolean latch, initially open.
///
/// `try_enter` atomically closes it and reports whether the caller won.
#[derive(Debug)]
pub struct ExtractionGate {
    open: AtomicBool,
}

impl Default for ExtractionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionGate {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    /// Transition open → closed. Returns `false` if already closed.
    pub fn try_enter(&self) -> bool {
        self.open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Reopen the latch for a new epoch.
    pub fn reset(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct Epoch {
    id: u64,
    gate: ExtractionGate,
}

/// Current epoch id and its gate, changed together.
///
/// Owned by the navigation tracker and shared by reference with the
/// watcher callbacks and the pipeline. The id check and the gate
/// transition happen under one lock, so a signal from a superseded
/// epoch can never consume the gate of the current one.
#[derive(Debug, Default)]
pub struct EpochState {
    inner: Mutex<Epoch>,
}

impl EpochState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Epoch> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current epoch.
    pub fn current(&self) -> EpochId {
        EpochId(self.lock().id)
    }

    /// Whether `epoch` is still the current epoch.
    pub fn is_current(&self, epoch: EpochId) -> bool {
        self.lock().id == epoch.0
    }

    /// Whether the current epoch's gate is still open.
    pub fn gate_open(&self) -> bool {
        self.lock().gate.is_open()
    }

    /// Claim the single extraction of `epoch`.
    ///
    /// Returns `false` for a stale epoch or an already-closed gate.
    pub fn try_enter(&self, epoch: EpochId) -> bool {
        let state = self.lock();
        if state.id != epoch.0 {
            debug!(epoch = %epoch, current = state.id, "signal from stale epoch");
            return false;
        }
        state.gate.try_enter()
    }

    /// Start the next epoch and reopen its gate.
    pub(crate) fn begin_next(&self) -> EpochId {
        let mut state = self.lock();
        state.id += 1;
        state.gate.reset();
        EpochId(state.id)
    }
}

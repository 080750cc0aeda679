//! The capture pipeline: watcher, gate, epochs, extraction, session.

pub mod epoch;
pub mod extract;
pub mod gate;
pub mod parse;
pub mod session;
pub mod watcher;

pub use epoch::NavigationEpochTracker;
pub use extract::{build_record, Extraction, ExtractionPipeline};
pub use gate::{EpochId, EpochState, ExtractionGate};
pub use session::{CaptureOutcome, ExplanationStatus, Session, SessionHandle, SinkFailure};
pub use watcher::{SignalWatcher, WatchHandle};

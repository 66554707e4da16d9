//! Recording and playback session state machines
//!
//! Each controller enforces its single-active-session invariant as mutually
//! exclusive state behind an async mutex, not as a lock over shared data.
//! Callers serialize operations by awaiting them; there is no internal
//! queueing and no mid-flight cancellation.

mod playback;
mod recorder;

pub use playback::{PlaybackController, PlaybackEvent};
pub use recorder::{RecordingLifecycle, SessionInfo};

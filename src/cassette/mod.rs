//! Cassettes: recorded filesystem interactions that can be replayed.
//!
//! Recording is enabled by setting `PROMPTLINK_RECORD=<file>`. Replay is
//! used by tests to reproduce failures (permission errors, racing writers)
//! that are awkward to stage on a real disk.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;

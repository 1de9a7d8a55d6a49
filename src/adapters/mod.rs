//! Adapters implementing the filesystem port.
//!
//! `live` talks to the real disk, `recording` captures every call into a
//! cassette, and `replaying` serves a cassette back.

pub mod live;
pub mod recording;
pub mod replaying;

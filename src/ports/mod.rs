//! Port traits defining external boundaries.
//!
//! The filesystem is the only external system the reconciler touches.
//! Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::{EntryType, FileSystem, FsResult};

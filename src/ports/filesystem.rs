//! Filesystem port for link inspection and mutation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Result type shared by all filesystem port methods.
pub type FsResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// What sits at a path, observed without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// A symbolic link (possibly dangling).
    Symlink,
    /// Sockets, FIFOs, devices.
    Other,
}

impl EntryType {
    /// Human-readable label used in conflict messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "regular file",
            Self::Dir => "directory",
            Self::Symlink => "symlink",
            Self::Other => "special file",
        }
    }
}

/// Provides the filesystem operations the reconciler needs.
///
/// Abstracting the filesystem allows deterministic replay and testing
/// without touching a real home directory.
pub trait FileSystem: Send + Sync {
    /// Returns the type of the entry at `path` without following symlinks,
    /// or `None` if nothing exists there.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be inspected (permissions, etc.).
    fn entry_type(&self, path: &Path) -> FsResult<Option<EntryType>>;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>>;

    /// Returns the literal value stored in a symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a symlink.
    fn read_link(&self, path: &Path) -> FsResult<PathBuf>;

    /// Resolves a path to its absolute canonical form, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the path (or a link along it) does not resolve.
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf>;

    /// Creates a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a component exists as a non-directory or on
    /// permission failure.
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Creates a symlink at `link` whose value is `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or cannot be created.
    fn symlink(&self, source: &Path, link: &Path) -> FsResult<()>;

    /// Removes the symlink at `path`. Never removes regular files or
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be removed.
    fn remove_link(&self, path: &Path) -> FsResult<()>;
}

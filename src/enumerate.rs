//! Directory enumeration: discovers the agents and skills to link.
//!
//! Agents are flat Markdown files, skills are directories:
//!
//! ```text
//! <repo>/<code>/
//!   ├── agents/<name>.md
//!   └── skills/<name>/
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LinkError;
use crate::ports::{EntryType, FileSystem};

/// Suffix an agent file must carry.
pub const AGENT_SUFFIX: &str = ".md";

/// The two kinds of linkable entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A Markdown agent definition, linked as a file.
    Agent,
    /// A skill directory, linked as a directory.
    Skill,
}

impl EntryKind {
    /// Every kind, in processing order.
    pub const ALL: [EntryKind; 2] = [EntryKind::Agent, EntryKind::Skill];

    /// Directory name used under both the source and target roots.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Skill => "skills",
        }
    }

    fn accepts_name(self, name: &str) -> bool {
        match self {
            Self::Agent => name.ends_with(AGENT_SUFFIX),
            Self::Skill => true,
        }
    }

    fn accepts_type(self, resolved: EntryType) -> bool {
        match self {
            Self::Agent => resolved == EntryType::File,
            Self::Skill => resolved == EntryType::Dir,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One discovered source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Entry name, mirrored as the link name in the target directory.
    pub name: String,
    /// Absolute path of the entry inside the repository.
    pub path: PathBuf,
    /// Agent or skill.
    pub kind: EntryKind,
}

/// A candidate entry whose type could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableEntry {
    /// The entry, typed by the directory it was found in.
    pub entry: SourceEntry,
    /// Why it could not be inspected.
    pub error: LinkError,
}

/// Lists the linkable entries of `dir` for one kind, in name order.
///
/// A missing directory yields an empty sequence. Hidden entries are
/// skipped; symlinked entries are classified by what they point at and
/// dropped when dangling. Entry types are resolved lazily as the iterator
/// is consumed. Candidates that cannot be inspected are yielded as
/// [`UnreadableEntry`] so the failure can be reported against them.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if `dir` exists but cannot be listed.
pub fn enumerate<'a>(
    fs: &'a dyn FileSystem,
    dir: &Path,
    kind: EntryKind,
) -> Result<impl Iterator<Item = Result<SourceEntry, UnreadableEntry>> + 'a, LinkError> {
    let names = match fs.entry_type(dir) {
        Ok(None) => {
            debug!(dir = %dir.display(), "source directory absent");
            Vec::new()
        }
        Ok(Some(_)) => fs.list_dir(dir).map_err(|e| LinkError::io("list", dir, e.as_ref()))?,
        Err(e) => return Err(LinkError::io("inspect", dir, e.as_ref())),
    };

    let dir = dir.to_path_buf();
    Ok(names
        .into_iter()
        .filter(move |name| !name.starts_with('.') && kind.accepts_name(name))
        .filter_map(move |name| {
            let path = dir.join(&name);
            let entry = SourceEntry { name, path, kind };
            match resolved_type(fs, &entry.path) {
                Ok(Some(resolved)) if kind.accepts_type(resolved) => Some(Ok(entry)),
                Ok(resolved) => {
                    debug!(path = %entry.path.display(), ?resolved, "skipping entry");
                    None
                }
                Err(error) => {
                    warn!(path = %entry.path.display(), %error, "cannot inspect source entry");
                    Some(Err(UnreadableEntry { entry, error }))
                }
            }
        }))
}

/// Type of `path`, following one symlink. `None` when absent or dangling.
fn resolved_type(fs: &dyn FileSystem, path: &Path) -> Result<Option<EntryType>, LinkError> {
    let entry = fs.entry_type(path).map_err(|e| LinkError::io("inspect", path, e.as_ref()))?;
    match entry {
        Some(EntryType::Symlink) => {
            let Ok(target) = fs.canonicalize(path) else {
                debug!(path = %path.display(), "dangling symlink");
                return Ok(None);
            };
            fs.entry_type(&target).map_err(|e| LinkError::io("inspect", &target, e.as_ref()))
        }
        other => Ok(other),
    }
}

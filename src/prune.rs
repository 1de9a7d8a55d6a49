//! Removal of stale links left behind by renamed or deleted sources.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::ports::{EntryType, FileSystem};

/// A stale link found in a target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOutcome {
    /// The link path.
    pub target: PathBuf,
    /// Literal value the link held.
    pub previous: PathBuf,
    /// `Ok` once removed (or, in a dry run, once identified).
    pub result: Result<(), LinkError>,
}

/// Finds and removes symlinks in `target_dir` whose source inside
/// `source_dir` no longer exists and whose name is not in `linked`.
///
/// Only symlinks are considered. Regular files, directories, links pointing
/// anywhere else, and links to sources that still exist (such as aliases a
/// user made by hand) are never touched.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if the target directory exists but cannot be
/// listed. Failures on individual links are carried in each outcome.
pub fn prune_stale(
    fs: &dyn FileSystem,
    target_dir: &Path,
    source_dir: &Path,
    linked: &HashSet<String>,
    dry_run: bool,
) -> Result<Vec<PruneOutcome>, LinkError> {
    match fs.entry_type(target_dir) {
        Ok(Some(EntryType::Dir)) => {}
        Ok(_) => return Ok(Vec::new()),
        Err(e) => return Err(LinkError::io("inspect", target_dir, e.as_ref())),
    }
    let names =
        fs.list_dir(target_dir).map_err(|e| LinkError::io("list", target_dir, e.as_ref()))?;
    let base = fs.canonicalize(target_dir).unwrap_or_else(|e| {
        debug!(dir = %target_dir.display(), error = %e, "cannot canonicalize target directory");
        target_dir.to_path_buf()
    });

    let mut outcomes = Vec::new();
    for name in names.into_iter().filter(|n| !linked.contains(n)) {
        let target = target_dir.join(&name);
        if !matches!(fs.entry_type(&target), Ok(Some(EntryType::Symlink))) {
            continue;
        }
        let previous = match fs.read_link(&target) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(link = %target.display(), error = %e, "cannot read link, keeping");
                continue;
            }
        };
        if !normalize(&base.join(&previous)).starts_with(source_dir) {
            debug!(link = %target.display(), "link points outside the source tree, keeping");
            continue;
        }
        match fs.entry_type(&target_dir.join(&previous)) {
            Ok(None) => {}
            Ok(Some(_)) => {
                debug!(link = %target.display(), "link source still exists, keeping");
                continue;
            }
            Err(e) => {
                warn!(link = %target.display(), error = %e, "cannot inspect link source, keeping");
                continue;
            }
        }

        let result = if dry_run {
            Ok(())
        } else {
            fs.remove_link(&target).map_err(|e| LinkError::io("remove link", &target, e.as_ref()))
        };
        match &result {
            Ok(()) => info!(link = %target.display(), dry_run, "pruned stale link"),
            Err(err) => warn!(error = %err, "failed to prune link"),
        }
        outcomes.push(PruneOutcome { target, previous, result });
    }
    Ok(outcomes)
}

/// Drops `.` and resolves `..` components without touching the disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

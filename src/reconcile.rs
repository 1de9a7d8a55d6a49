//! Link reconciliation: make each target a symlink to its source.
//!
//! Idempotent: re-running against an unchanged filesystem performs no
//! mutation. Targets occupied by anything other than a symlink are never
//! touched.
//!
//! Reconciliation is split in two steps. [`plan`] inspects the target and
//! decides a [`LinkAction`] without side effects; [`apply`] executes it.
//! Dry runs stop after planning.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::enumerate::{EntryKind, SourceEntry};
use crate::error::LinkError;
use crate::ports::{EntryType, FileSystem};

/// One desired link: `target` should be a symlink whose value is `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSpec {
    /// Entry name, identical for source and target.
    pub name: String,
    /// Agent or skill.
    pub kind: EntryKind,
    /// Absolute source path inside the repository. Never modified.
    pub source: PathBuf,
    /// Absolute path of the link to maintain.
    pub target: PathBuf,
}

impl LinkSpec {
    /// Builds the spec linking `entry` into `target_dir` under the same name.
    #[must_use]
    pub fn new(entry: SourceEntry, target_dir: &Path) -> Self {
        let target = target_dir.join(&entry.name);
        Self { name: entry.name, kind: entry.kind, source: entry.path, target }
    }
}

/// What currently sits at a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing exists at the target.
    Absent,
    /// A symlink with the given literal value.
    Linked(PathBuf),
    /// A regular file, directory, or special file.
    Occupied(EntryType),
}

/// The mutation planned for a single spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Create the symlink (and missing parent directories).
    Create,
    /// The symlink is already correct.
    Keep,
    /// Replace a symlink that points elsewhere.
    Relink {
        /// Current literal link value.
        previous: PathBuf,
    },
    /// Leave an occupied target alone.
    Refuse {
        /// What occupies the target.
        occupant: EntryType,
    },
}

/// Outcome of reconciling one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationResult {
    /// The link did not exist and was created.
    Created,
    /// The link already pointed at the source.
    AlreadyLinked,
    /// The link pointed elsewhere and was replaced.
    Relinked {
        /// Value the link held before.
        previous: PathBuf,
    },
    /// The target is occupied; nothing was changed.
    Conflict {
        /// Human-readable description of the occupant.
        reason: String,
    },
}

impl ReconciliationResult {
    /// Status label used in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyLinked => "already-linked",
            Self::Relinked { .. } => "relinked",
            Self::Conflict { .. } => "conflict",
        }
    }

    /// The result applying `action` produces, used to report dry runs.
    #[must_use]
    pub fn expected(action: &LinkAction, spec: &LinkSpec) -> Self {
        match action {
            LinkAction::Create => Self::Created,
            LinkAction::Keep => Self::AlreadyLinked,
            LinkAction::Relink { previous } => Self::Relinked { previous: previous.clone() },
            LinkAction::Refuse { occupant } => Self::Conflict {
                reason: LinkError::Conflict {
                    target: spec.target.clone(),
                    occupant: occupant.label().to_string(),
                }
                .to_string(),
            },
        }
    }
}

/// A spec together with what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// The reconciled spec.
    pub spec: LinkSpec,
    /// The result, or the IO error that prevented it.
    pub result: Result<ReconciliationResult, LinkError>,
}

/// Observes the target without following it.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if the target cannot be inspected or its link
/// value cannot be read.
pub fn inspect(fs: &dyn FileSystem, spec: &LinkSpec) -> Result<TargetState, LinkError> {
    let entry = fs
        .entry_type(&spec.target)
        .map_err(|e| LinkError::io("inspect", &spec.target, e.as_ref()))?;
    match entry {
        None => Ok(TargetState::Absent),
        Some(EntryType::Symlink) => {
            let value = fs
                .read_link(&spec.target)
                .map_err(|e| LinkError::io("read link", &spec.target, e.as_ref()))?;
            Ok(TargetState::Linked(value))
        }
        Some(other) => Ok(TargetState::Occupied(other)),
    }
}

/// Decides what to do for `spec`. Performs no mutation.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if the target cannot be inspected.
pub fn plan(fs: &dyn FileSystem, spec: &LinkSpec) -> Result<LinkAction, LinkError> {
    let action = match inspect(fs, spec)? {
        TargetState::Absent => LinkAction::Create,
        TargetState::Linked(value) if points_at(fs, &spec.target, &value, &spec.source) => {
            LinkAction::Keep
        }
        TargetState::Linked(previous) => LinkAction::Relink { previous },
        TargetState::Occupied(occupant) => LinkAction::Refuse { occupant },
    };
    Ok(action)
}

/// Executes a planned action.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if creating directories, removing the old link
/// or creating the new one fails. A failed relink can leave the target
/// absent; running again creates it.
pub fn apply(
    fs: &dyn FileSystem,
    spec: &LinkSpec,
    action: &LinkAction,
) -> Result<ReconciliationResult, LinkError> {
    match action {
        LinkAction::Create => {
            if let Some(parent) = spec.target.parent() {
                fs.create_dir_all(parent)
                    .map_err(|e| LinkError::io("create directory", parent, e.as_ref()))?;
            }
            create_link(fs, spec)?;
        }
        LinkAction::Relink { .. } => {
            fs.remove_link(&spec.target)
                .map_err(|e| LinkError::io("remove link", &spec.target, e.as_ref()))?;
            create_link(fs, spec)?;
        }
        LinkAction::Keep | LinkAction::Refuse { .. } => {}
    }
    Ok(ReconciliationResult::expected(action, spec))
}

/// Plans and, unless `dry_run`, applies the action for one spec.
///
/// # Errors
///
/// Returns [`LinkError::Io`] on filesystem failure. Conflicts are not
/// errors; they are reported as [`ReconciliationResult::Conflict`].
pub fn reconcile(
    fs: &dyn FileSystem,
    spec: &LinkSpec,
    dry_run: bool,
) -> Result<ReconciliationResult, LinkError> {
    let action = plan(fs, spec)?;
    debug!(target = %spec.target.display(), ?action, dry_run, "planned link");
    if dry_run {
        Ok(ReconciliationResult::expected(&action, spec))
    } else {
        apply(fs, spec, &action)
    }
}

/// Reconciles every spec in order. A failure on one entry never stops the
/// remaining ones.
pub fn reconcile_all(
    fs: &dyn FileSystem,
    specs: impl IntoIterator<Item = LinkSpec>,
    dry_run: bool,
) -> Vec<EntryOutcome> {
    specs
        .into_iter()
        .map(|spec| {
            let result = reconcile(fs, &spec, dry_run);
            match &result {
                Ok(ReconciliationResult::Conflict { reason }) => warn!(%reason, "link conflict"),
                Err(err) => warn!(error = %err, "link failed"),
                Ok(_) => {}
            }
            EntryOutcome { spec, result }
        })
        .collect()
}

fn create_link(fs: &dyn FileSystem, spec: &LinkSpec) -> Result<(), LinkError> {
    fs.symlink(&spec.source, &spec.target)
        .map_err(|e| LinkError::io("create symlink", &spec.target, e.as_ref()))
}

/// Whether a link holding `value` at `link` already points at `source`.
///
/// Exact equality of the literal value wins. Otherwise the value is
/// resolved (relative to the link's directory) and both sides are
/// canonicalized; a dangling link never matches.
pub(crate) fn points_at(fs: &dyn FileSystem, link: &Path, value: &Path, source: &Path) -> bool {
    if value == source {
        return true;
    }
    let resolved = match link.parent() {
        Some(parent) if value.is_relative() => parent.join(value),
        _ => value.to_path_buf(),
    };
    match (fs.canonicalize(&resolved), fs.canonicalize(source)) {
        (Ok(actual), Ok(expected)) => actual == expected,
        _ => false,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::adapters::live::LiveFileSystem;
    use crate::adapters::replaying::ReplayingFileSystem;
    use crate::cassette::{Cassette, CassetteReplayer, Interaction};
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Fixture {
        source: TempDir,
        target: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self { source: TempDir::new().unwrap(), target: TempDir::new().unwrap() }
        }

        fn agent(&self, name: &str) -> LinkSpec {
            let path = self.source.path().join(name);
            if !path.exists() {
                std::fs::write(&path, name).unwrap();
            }
            LinkSpec {
                name: name.into(),
                kind: EntryKind::Agent,
                source: path,
                target: self.target.path().join("agents").join(name),
            }
        }
    }

    #[test]
    fn absent_target_is_created_with_parents() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(result, ReconciliationResult::Created);
        assert_eq!(std::fs::read_link(&spec.target).unwrap(), spec.source);
    }

    #[test]
    fn second_run_is_already_linked() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");

        reconcile(&LiveFileSystem, &spec, false).unwrap();
        let again = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(again, ReconciliationResult::AlreadyLinked);
    }

    #[test]
    fn drifted_link_is_relinked() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");
        let elsewhere = fx.source.path().join("other.md");
        std::fs::write(&elsewhere, "other").unwrap();
        std::fs::create_dir_all(spec.target.parent().unwrap()).unwrap();
        symlink(&elsewhere, &spec.target).unwrap();

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(result, ReconciliationResult::Relinked { previous: elsewhere });
        assert_eq!(std::fs::read_link(&spec.target).unwrap(), spec.source);
    }

    #[test]
    fn dangling_link_is_relinked() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");
        let moved = PathBuf::from("/old/checkout/en/agents/a.md");
        std::fs::create_dir_all(spec.target.parent().unwrap()).unwrap();
        symlink(&moved, &spec.target).unwrap();

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(result, ReconciliationResult::Relinked { previous: moved });
    }

    #[test]
    fn relative_link_to_the_same_file_is_kept() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");
        let parent = spec.target.parent().unwrap();
        std::fs::create_dir_all(parent).unwrap();
        let relative = pathdiff(parent, &spec.source);
        symlink(&relative, &spec.target).unwrap();

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(result, ReconciliationResult::AlreadyLinked);
        assert_eq!(std::fs::read_link(&spec.target).unwrap(), relative);
    }

    #[test]
    fn regular_file_is_a_conflict_and_left_untouched() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");
        std::fs::create_dir_all(spec.target.parent().unwrap()).unwrap();
        std::fs::write(&spec.target, "hello").unwrap();

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert!(matches!(result, ReconciliationResult::Conflict { ref reason }
            if reason.contains("regular file")));
        assert_eq!(std::fs::read(&spec.target).unwrap(), b"hello");
    }

    #[test]
    fn directory_is_a_conflict() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");
        std::fs::create_dir_all(&spec.target).unwrap();
        std::fs::write(spec.target.join("inner"), "keep").unwrap();

        let result = reconcile(&LiveFileSystem, &spec, false).unwrap();
        assert_eq!(result.label(), "conflict");
        assert_eq!(std::fs::read_to_string(spec.target.join("inner")).unwrap(), "keep");
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let fx = Fixture::new();
        let spec = fx.agent("a.md");

        let result = reconcile(&LiveFileSystem, &spec, true).unwrap();
        assert_eq!(result, ReconciliationResult::Created);
        assert!(!spec.target.parent().unwrap().exists());
    }

    #[test]
    fn failure_on_one_entry_does_not_stop_the_rest() {
        let fx = Fixture::new();
        let blocked = fx.agent("a.md");
        let mut fine = fx.agent("b.md");
        // A file where the parent directory should go makes a.md fail.
        std::fs::write(fx.target.path().join("agents"), "not a dir").unwrap();
        fine.target = fx.target.path().join("other").join("b.md");

        let outcomes = reconcile_all(&LiveFileSystem, vec![blocked, fine], false);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[1].result, Ok(ReconciliationResult::Created));
    }

    #[test]
    fn replayed_permission_error_is_reported_per_entry() {
        let interactions = vec![
            Interaction {
                seq: 0,
                method: "entry_type".into(),
                input: serde_json::json!({"path": "/t/agents/a.md"}),
                output: serde_json::json!({"ok": null}),
            },
            Interaction {
                seq: 1,
                method: "create_dir_all".into(),
                input: serde_json::json!({"path": "/t/agents"}),
                output: serde_json::json!({"ok": null}),
            },
            Interaction {
                seq: 2,
                method: "symlink".into(),
                input: serde_json::json!({"source": "/s/a.md", "link": "/t/agents/a.md"}),
                output: serde_json::json!({"err": "Permission denied (os error 13)"}),
            },
        ];
        let cassette =
            Cassette { name: "denied".into(), recorded_at: chrono::Utc::now(), interactions };
        let fs = ReplayingFileSystem::new(CassetteReplayer::new(&cassette));
        let spec = LinkSpec {
            name: "a.md".into(),
            kind: EntryKind::Agent,
            source: PathBuf::from("/s/a.md"),
            target: PathBuf::from("/t/agents/a.md"),
        };

        let err = reconcile(&fs, &spec, false).unwrap_err();
        assert_eq!(
            err,
            LinkError::Io {
                op: "create symlink",
                path: PathBuf::from("/t/agents/a.md"),
                message: "Permission denied (os error 13)".into(),
            }
        );
    }

    // Relative path from `base` to `path`, both absolute.
    fn pathdiff(base: &Path, path: &Path) -> PathBuf {
        let base: Vec<_> = base.components().collect();
        let path: Vec<_> = path.components().collect();
        let common = base.iter().zip(&path).take_while(|(a, b)| a == b).count();
        let mut out = PathBuf::new();
        for _ in common..base.len() {
            out.push("..");
        }
        for part in &path[common..] {
            out.push(part.as_os_str());
        }
        out
    }
}

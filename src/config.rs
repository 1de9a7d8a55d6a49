//! Run configuration: category allow-list, source and target roots.
//!
//! Values come from CLI flags, which fall back to `PROMPTLINK_*`
//! environment variables (optionally loaded from `.env`). The invoking
//! user's home directory is injectable so runs can be pointed at a
//! scratch directory.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::enumerate::EntryKind;
use crate::error::LinkError;
use crate::ports::{EntryType, FileSystem};

/// Directory under the home directory holding the assistant's config.
pub const DEFAULT_TARGET_DIR: &str = ".claude";

/// Supported category (language) codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// English prompt set.
    En,
    /// Simplified Chinese prompt set.
    ZhCn,
}

impl Category {
    /// Every supported category, in the order they are listed to users.
    pub const ALL: [Category; 2] = [Category::En, Category::ZhCn];

    /// The code used on the command line and as the source directory name.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::ZhCn => "zh-cn",
        }
    }

    /// Codes accepted by [`Category::parse`].
    #[must_use]
    pub fn supported_codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.code()).collect()
    }

    /// Validates a code against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnsupportedCategory`] for unknown codes.
    pub fn parse(code: &str) -> Result<Self, LinkError> {
        Self::ALL.into_iter().find(|c| c.code() == code).ok_or_else(|| {
            LinkError::UnsupportedCategory {
                code: code.to_string(),
                supported: Self::supported_codes(),
            }
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Unvalidated settings as collected from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    /// Requested category code.
    pub lang: String,
    /// Repository root; defaults to the current directory.
    pub repo: Option<PathBuf>,
    /// Home directory override.
    pub home: Option<PathBuf>,
    /// Target root override; defaults to `<home>/.claude`.
    pub target: Option<PathBuf>,
    /// Plan only, do not mutate.
    pub dry_run: bool,
    /// Remove stale links into the source tree.
    pub prune: bool,
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Selected category.
    pub category: Category,
    /// Canonical repository root.
    pub repo_root: PathBuf,
    /// Root holding the `agents/` and `skills/` target directories.
    pub target_root: PathBuf,
    /// Plan only, do not mutate.
    pub dry_run: bool,
    /// Remove stale links into the source tree.
    pub prune: bool,
}

impl LinkConfig {
    /// Validates raw settings. Performs no filesystem mutation.
    ///
    /// The category is checked first, then the repository root and the
    /// category root must exist as directories.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`LinkError`] for an unsupported category, a missing
    /// home directory, or a missing repository or category root.
    pub fn resolve(fs: &dyn FileSystem, raw: RawSettings) -> Result<Self, LinkError> {
        let category = Category::parse(&raw.lang)?;

        let target_root = match raw.target {
            Some(target) => target,
            None => {
                let home = raw.home.or_else(dirs::home_dir).ok_or_else(|| {
                    LinkError::Configuration(
                        "could not determine home directory; pass --home or set PROMPTLINK_HOME"
                            .into(),
                    )
                })?;
                home.join(DEFAULT_TARGET_DIR)
            }
        };
        let target_root = absolute(&target_root)?;

        let repo = raw.repo.unwrap_or_else(|| PathBuf::from("."));
        let repo_root = fs.canonicalize(&repo).map_err(|e| {
            LinkError::Configuration(format!("repository root {} not found: {e}", repo.display()))
        })?;

        let config =
            Self { category, repo_root, target_root, dry_run: raw.dry_run, prune: raw.prune };

        let category_root = config.category_root();
        match fs.entry_type(&category_root) {
            Ok(Some(EntryType::Dir)) => {}
            Ok(None) => return Err(LinkError::MissingSourceRoot { path: category_root }),
            Ok(Some(other)) => {
                return Err(LinkError::Configuration(format!(
                    "source root {} is a {}, not a directory",
                    category_root.display(),
                    other.label()
                )))
            }
            Err(e) => return Err(LinkError::io("inspect", category_root, e.as_ref())),
        }

        debug!(
            category = %config.category,
            repo = %config.repo_root.display(),
            target = %config.target_root.display(),
            "resolved configuration"
        );
        Ok(config)
    }

    /// `<repo>/<code>`: the root of the selected category.
    #[must_use]
    pub fn category_root(&self) -> PathBuf {
        self.repo_root.join(self.category.code())
    }

    /// Source directory for one entry kind.
    #[must_use]
    pub fn source_dir(&self, kind: EntryKind) -> PathBuf {
        self.category_root().join(kind.dir_name())
    }

    /// Target directory for one entry kind.
    #[must_use]
    pub fn target_dir(&self, kind: EntryKind) -> PathBuf {
        self.target_root.join(kind.dir_name())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, LinkError> {
    std::path::absolute(path)
        .map_err(|e| LinkError::Configuration(format!("cannot resolve {}: {e}", path.display())))
}

//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawSettings;

/// Top-level CLI parser for `promptlink`.
#[derive(Debug, Parser)]
#[command(
    name = "promptlink",
    version,
    about = "Symlink agent and skill prompts into your assistant config directory"
)]
pub struct Cli {
    /// Language set to link (en, zh-cn).
    #[arg(long, default_value = "en", value_name = "CODE")]
    pub lang: String,

    /// Repository root containing `<lang>/agents` and `<lang>/skills`.
    #[arg(long, env = "PROMPTLINK_REPO", value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Home directory used to locate the default target.
    #[arg(long, env = "PROMPTLINK_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Target root holding `agents/` and `skills/` [default: <home>/.claude].
    #[arg(long, env = "PROMPTLINK_TARGET", value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Report what would change without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Remove stale links that point into the source tree.
    #[arg(long)]
    pub prune: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

/// How the run report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Cli {
    /// Settings for [`crate::config::LinkConfig::resolve`].
    #[must_use]
    pub fn settings(&self) -> RawSettings {
        RawSettings {
            lang: self.lang.clone(),
            repo: self.repo.clone(),
            home: self.home.clone(),
            target: self.target.clone(),
            dry_run: self.dry_run,
            prune: self.prune,
        }
    }
}

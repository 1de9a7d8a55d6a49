//! The link command: enumerate, reconcile, optionally prune, report.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::config::{LinkConfig, RawSettings};
use crate::context::ServiceContext;
use crate::enumerate::{enumerate, EntryKind, UnreadableEntry};
use crate::error::LinkError;
use crate::prune::prune_stale;
use crate::reconcile::{reconcile_all, EntryOutcome, LinkSpec};
use crate::report::{KindSection, Report};

/// Execute the link command and print its report.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, or once the report
/// is printed, if any entry conflicted or failed.
pub fn run_with_context(
    ctx: &ServiceContext,
    settings: RawSettings,
    format: OutputFormat,
) -> Result<(), String> {
    let config = LinkConfig::resolve(ctx.fs.as_ref(), settings).map_err(|e| e.to_string())?;
    let report = execute(ctx, &config).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => {
            let json = report.to_json().map_err(|e| format!("Failed to render report: {e}"))?;
            println!("{json}");
        }
    }

    let summary = report.summary();
    if summary.is_clean() {
        Ok(())
    } else {
        Err(format!(
            "finished with {} conflict(s) and {} error(s)",
            summary.conflicts, summary.errors
        ))
    }
}

/// Runs reconciliation for a validated configuration.
///
/// Both kinds are enumerated before anything is mutated, so enumeration
/// failures abort the run with the filesystem untouched. Per-entry
/// failures are collected in the report.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if a source directory cannot be listed. A
/// target directory that cannot be scanned for pruning is recorded in the
/// report instead, since links may already have been created by then.
pub fn execute(ctx: &ServiceContext, config: &LinkConfig) -> Result<Report, LinkError> {
    let fs = ctx.fs.as_ref();

    let mut planned = Vec::new();
    for kind in EntryKind::ALL {
        let source_dir = config.source_dir(kind);
        let target_dir = config.target_dir(kind);
        let mut specs = Vec::new();
        let mut unreadable = Vec::new();
        for item in enumerate(fs, &source_dir, kind)? {
            match item {
                Ok(entry) => specs.push(LinkSpec::new(entry, &target_dir)),
                Err(UnreadableEntry { entry, error }) => unreadable.push(EntryOutcome {
                    spec: LinkSpec::new(entry, &target_dir),
                    result: Err(error),
                }),
            }
        }
        planned.push((kind, source_dir, specs, unreadable));
    }

    let mut sections = Vec::new();
    let mut pruned = Vec::new();
    let mut run_errors = Vec::new();
    for (kind, source_dir, specs, unreadable) in planned {
        let names: HashSet<String> = specs
            .iter()
            .chain(unreadable.iter().map(|o| &o.spec))
            .map(|s| s.name.clone())
            .collect();
        let mut outcomes = reconcile_all(fs, specs, config.dry_run);
        outcomes.extend(unreadable);
        outcomes.sort_by(|a, b| a.spec.name.cmp(&b.spec.name));

        if config.prune {
            let target_dir = config.target_dir(kind);
            match prune_stale(fs, &target_dir, &source_dir, &names, config.dry_run) {
                Ok(found) => pruned.extend(found),
                Err(err) => {
                    warn!(error = %err, "prune skipped");
                    run_errors.push(err);
                }
            }
        }
        sections.push(KindSection { kind, source_dir, outcomes });
    }

    let report = Report {
        category: config.category,
        target_root: config.target_root.clone(),
        dry_run: config.dry_run,
        generated_at: Utc::now(),
        sections,
        pruned,
        run_errors,
    };
    let summary = report.summary();
    info!(
        created = summary.created,
        already_linked = summary.already_linked,
        relinked = summary.relinked,
        conflicts = summary.conflicts,
        errors = summary.errors,
        pruned = summary.pruned,
        "link run complete"
    );
    Ok(report)
}

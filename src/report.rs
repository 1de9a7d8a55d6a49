//! Run reports: per-entry results, summary counts, and their rendering.
//!
//! Rendering carries no domain logic; it only presents what the
//! reconciler decided.

use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Category;
use crate::enumerate::EntryKind;
use crate::error::LinkError;
use crate::prune::PruneOutcome;
use crate::reconcile::{EntryOutcome, ReconciliationResult};

/// Results for one entry kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSection {
    /// Agents or skills.
    pub kind: EntryKind,
    /// Directory the entries were discovered in.
    pub source_dir: PathBuf,
    /// One outcome per discovered entry, in name order.
    pub outcomes: Vec<EntryOutcome>,
}

/// Everything a run did (or, in a dry run, would do).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Selected category.
    pub category: Category,
    /// Root holding the target directories.
    pub target_root: PathBuf,
    /// Whether mutations were skipped.
    pub dry_run: bool,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Agents first, then skills.
    pub sections: Vec<KindSection>,
    /// Stale links found by `--prune`.
    pub pruned: Vec<PruneOutcome>,
    /// Failures not tied to a single entry, such as an unreadable target
    /// directory during pruning.
    pub run_errors: Vec<LinkError>,
}

/// Counts per result kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// New links.
    pub created: usize,
    /// Links that were already correct.
    pub already_linked: usize,
    /// Links replaced because they pointed elsewhere.
    pub relinked: usize,
    /// Occupied targets left untouched.
    pub conflicts: usize,
    /// IO failures, including failed prunes and run-level errors.
    pub errors: usize,
    /// Stale links removed.
    pub pruned: usize,
}

impl Summary {
    /// `true` when there were no conflicts and no IO errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0 && self.errors == 0
    }

    /// Entries that ended up (or would end up) correctly linked.
    #[must_use]
    pub fn linked(&self) -> usize {
        self.created + self.already_linked + self.relinked
    }
}

impl Report {
    /// Tallies the outcomes.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in self.outcomes() {
            match &outcome.result {
                Ok(ReconciliationResult::Created) => summary.created += 1,
                Ok(ReconciliationResult::AlreadyLinked) => summary.already_linked += 1,
                Ok(ReconciliationResult::Relinked { .. }) => summary.relinked += 1,
                Ok(ReconciliationResult::Conflict { .. }) => summary.conflicts += 1,
                Err(_) => summary.errors += 1,
            }
        }
        for pruned in &self.pruned {
            match pruned.result {
                Ok(()) => summary.pruned += 1,
                Err(_) => summary.errors += 1,
            }
        }
        summary.errors += self.run_errors.len();
        summary
    }

    /// All entry outcomes across sections.
    pub fn outcomes(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.sections.iter().flat_map(|section| section.outcomes.iter())
    }

    /// Targets that were left alone because something else occupies them.
    #[must_use]
    pub fn conflicting_paths(&self) -> Vec<&PathBuf> {
        self.outcomes()
            .filter(|o| matches!(o.result, Ok(ReconciliationResult::Conflict { .. })))
            .map(|o| &o.spec.target)
            .collect()
    }

    /// Renders the human-readable report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.dry_run {
            out.push_str("Dry run: no changes will be made.\n");
        }
        let _ = writeln!(
            out,
            "Linking {} prompts into {}",
            self.category,
            self.target_root.display()
        );

        for section in &self.sections {
            let _ = writeln!(out, "{}:", section.kind);
            if section.outcomes.is_empty() {
                let _ = writeln!(out, "  nothing to link in {}", section.source_dir.display());
                continue;
            }
            for outcome in &section.outcomes {
                let name = &outcome.spec.name;
                let line = match &outcome.result {
                    Ok(ReconciliationResult::Relinked { previous }) => {
                        format!("relinked        {name} (was {})", previous.display())
                    }
                    Ok(ReconciliationResult::Conflict { reason }) => {
                        format!("conflict        {name}: {reason}")
                    }
                    Ok(result) => format!("{:<15} {name}", result.label()),
                    Err(err) => format!("error           {name}: {err}"),
                };
                let _ = writeln!(out, "  {line}");
            }
        }

        if !self.pruned.is_empty() {
            out.push_str("pruned:\n");
            for pruned in &self.pruned {
                let line = match &pruned.result {
                    Ok(()) => format!(
                        "removed         {} (was {})",
                        pruned.target.display(),
                        pruned.previous.display()
                    ),
                    Err(err) => format!("error           {err}"),
                };
                let _ = writeln!(out, "  {line}");
            }
        }

        if !self.run_errors.is_empty() {
            out.push_str("errors:\n");
            for err in &self.run_errors {
                let _ = writeln!(out, "  {err}");
            }
        }

        let summary = self.summary();
        let _ = write!(
            out,
            "Summary: {} created, {} already linked, {} relinked, {}, {}",
            summary.created,
            summary.already_linked,
            summary.relinked,
            plural(summary.conflicts, "conflict"),
            plural(summary.errors, "error"),
        );
        if summary.pruned > 0 {
            let _ = write!(out, ", {} pruned", summary.pruned);
        }
        out.push('\n');

        let conflicts = self.conflicting_paths();
        if !conflicts.is_empty() {
            out.push_str("Conflicting paths were left untouched. ");
            out.push_str("Remove or back them up manually, then re-run:\n");
            for path in conflicts {
                let _ = writeln!(out, "  {}", path.display());
            }
        }
        out
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let view = JsonReport {
            category: self.category.code(),
            target_root: &self.target_root,
            dry_run: self.dry_run,
            generated_at: self.generated_at,
            entries: self.outcomes().map(JsonEntry::from).collect(),
            pruned: self.pruned.iter().map(JsonPruned::from).collect(),
            run_errors: self.run_errors.iter().map(ToString::to_string).collect(),
            summary: self.summary(),
        };
        serde_json::to_string_pretty(&view)
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    category: &'static str,
    target_root: &'a PathBuf,
    dry_run: bool,
    generated_at: DateTime<Utc>,
    entries: Vec<JsonEntry<'a>>,
    pruned: Vec<JsonPruned<'a>>,
    run_errors: Vec<String>,
    summary: Summary,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    kind: EntryKind,
    source: &'a PathBuf,
    target: &'a PathBuf,
    #[serde(flatten)]
    result: JsonResult<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonResult<'a> {
    Done(&'a ReconciliationResult),
    Failed { status: &'static str, error: String },
}

impl<'a> From<&'a EntryOutcome> for JsonEntry<'a> {
    fn from(outcome: &'a EntryOutcome) -> Self {
        let result = match &outcome.result {
            Ok(result) => JsonResult::Done(result),
            Err(err) => JsonResult::Failed { status: "error", error: err.to_string() },
        };
        Self {
            name: &outcome.spec.name,
            kind: outcome.spec.kind,
            source: &outcome.spec.source,
            target: &outcome.spec.target,
            result,
        }
    }
}

#[derive(Serialize)]
struct JsonPruned<'a> {
    target: &'a PathBuf,
    previous: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a PruneOutcome> for JsonPruned<'a> {
    fn from(outcome: &'a PruneOutcome) -> Self {
        Self {
            target: &outcome.target,
            previous: &outcome.previous,
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::LinkSpec;

    fn outcome(name: &str, result: Result<ReconciliationResult, LinkError>) -> EntryOutcome {
        EntryOutcome {
            spec: LinkSpec {
                name: name.into(),
                kind: EntryKind::Agent,
                source: PathBuf::from("/repo/en/agents").join(name),
                target: PathBuf::from("/home/u/.claude/agents").join(name),
            },
            result,
        }
    }

    fn report(outcomes: Vec<EntryOutcome>) -> Report {
        Report {
            category: Category::En,
            target_root: PathBuf::from("/home/u/.claude"),
            dry_run: false,
            generated_at: Utc::now(),
            sections: vec![
                KindSection {
                    kind: EntryKind::Agent,
                    source_dir: PathBuf::from("/repo/en/agents"),
                    outcomes,
                },
                KindSection {
                    kind: EntryKind::Skill,
                    source_dir: PathBuf::from("/repo/en/skills"),
                    outcomes: vec![],
                },
            ],
            pruned: vec![],
            run_errors: vec![],
        }
    }

    #[test]
    fn clean_run_summary() {
        let report = report(vec![
            outcome("a.md", Ok(ReconciliationResult::Created)),
            outcome("b.md", Ok(ReconciliationResult::Created)),
        ]);
        let summary = report.summary();
        assert!(summary.is_clean());
        assert_eq!(summary.linked(), 2);

        let text = report.to_text();
        assert!(text.contains("  created         a.md"));
        assert!(text.contains("nothing to link in /repo/en/skills"));
        assert!(text.contains("2 created"));
        assert!(text.contains("0 conflicts"));
        assert!(!text.contains("left untouched"));
    }

    #[test]
    fn conflicts_and_errors_are_listed_with_remediation() {
        let report = report(vec![
            outcome(
                "a.md",
                Ok(ReconciliationResult::Conflict { reason: "occupied (regular file)".into() }),
            ),
            outcome(
                "b.md",
                Err(LinkError::Io {
                    op: "create symlink",
                    path: PathBuf::from("/home/u/.claude/agents/b.md"),
                    message: "Permission denied".into(),
                }),
            ),
        ]);
        let summary = report.summary();
        assert!(!summary.is_clean());
        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.errors, 1);

        let text = report.to_text();
        assert!(text.contains("1 conflict,"));
        assert!(text.contains("1 error"));
        assert!(text.contains("error           b.md: failed to create symlink"));
        assert!(text.contains("Remove or back them up manually"));
        assert!(text.contains("  /home/u/.claude/agents/a.md"));
    }

    #[test]
    fn relinked_shows_previous_target() {
        let report = report(vec![outcome(
            "a.md",
            Ok(ReconciliationResult::Relinked { previous: PathBuf::from("/old/a.md") }),
        )]);
        assert!(report.to_text().contains("relinked        a.md (was /old/a.md)"));
    }

    #[test]
    fn json_report_carries_status_and_summary() {
        let report = report(vec![
            outcome("a.md", Ok(ReconciliationResult::AlreadyLinked)),
            outcome(
                "b.md",
                Err(LinkError::Io {
                    op: "inspect",
                    path: PathBuf::from("/x"),
                    message: "boom".into(),
                }),
            ),
        ]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["category"], "en");
        assert_eq!(json["entries"][0]["status"], "already_linked");
        assert_eq!(json["entries"][0]["kind"], "agent");
        assert_eq!(json["entries"][1]["status"], "error");
        assert_eq!(json["summary"]["already_linked"], 1);
        assert_eq!(json["summary"]["errors"], 1);
    }

    #[test]
    fn run_errors_count_and_render() {
        let mut report = report(vec![outcome("a.md", Ok(ReconciliationResult::Created))]);
        report.run_errors.push(LinkError::Io {
            op: "list",
            path: PathBuf::from("/home/u/.claude/agents"),
            message: "Permission denied".into(),
        });

        let summary = report.summary();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.errors, 1);
        assert!(!summary.is_clean());

        let message = "failed to list /home/u/.claude/agents: Permission denied";
        assert!(report.to_text().contains(&format!("errors:\n  {message}")));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["run_errors"][0], message);
    }
}

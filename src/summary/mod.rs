pub mod diffs;
pub mod report;
pub mod tree;

use std::collections::HashSet;

use anyhow::Result;

use crate::git::{self, Change, ChangeStats};

/// Size and shape limits for one summarization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLimits {
    /// Ceiling for the whole agent input, summary and diffs included.
    pub max_input_size: usize,
    /// Ceiling for the literal diff section alone.
    pub max_diff_size: usize,
    /// Path depth at which files collapse into directory groups.
    pub tree_depth: usize,
    /// Largest file count still listed verbatim, one line per file.
    pub compression_threshold: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_input_size: 30_000,
            max_diff_size: 15_000,
            tree_depth: 3,
            compression_threshold: 10,
        }
    }
}

/// Everything one pipeline run learned about the pending changes.
#[derive(Debug)]
pub struct ChangeAnalysis {
    pub branch: String,
    pub changes: Vec<Change>,
    pub stats: ChangeStats,
    pub tree_summary: String,
    pub diff_content: String,
    /// Paths an agent may legitimately reference in its reply.
    pub valid_files: HashSet<String>,
}

/// Run the whole pipeline against the current working tree.
///
/// With no pending changes this short-circuits: summary and diff text stay
/// empty and `stats.total` is zero. Callers check the total before handing
/// anything to an agent.
pub fn analyze_repository(limits: &SummaryLimits, include_diffs: bool) -> Result<ChangeAnalysis> {
    git::ensure_repository()?;

    let branch = git::current_branch()?;
    let (changes, stats) = git::collect_changes()?;

    if stats.total == 0 {
        return Ok(ChangeAnalysis {
            branch,
            changes,
            stats,
            tree_summary: String::new(),
            diff_content: String::new(),
            valid_files: HashSet::new(),
        });
    }

    let tree_summary = report::assemble_report(&branch, &changes, limits);

    let mut diff_content = String::new();
    if include_diffs {
        let budget = diffs::diff_budget(tree_summary.len(), limits);
        if budget > 0 {
            let files = git::eligible_modified_files()?;
            diff_content = diffs::extract_diffs(&files, budget, &git::WorkTreeDiffs);
        }
    }

    let valid_files = changes.iter().map(|c| c.path.clone()).collect();

    Ok(ChangeAnalysis {
        branch,
        changes,
        stats,
        tree_summary,
        diff_content,
        valid_files,
    })
}

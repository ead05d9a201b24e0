use std::collections::HashSet;

use crate::jira;
use crate::response::CommitPlan;

/// Longest commit title git tooling renders comfortably.
pub const MAX_TITLE_LENGTH: usize = 72;

const COMMIT_TYPES: [&str; 10] = [
    "feat", "fix", "docs", "style", "refactor", "test", "chore", "perf", "ci", "build",
];

/// Warn about titles over the length ceiling; returns the warning count.
pub fn warn_long_titles(plan: &CommitPlan) -> usize {
    let mut warned = 0;
    for (index, commit) in plan.commits.iter().enumerate() {
        let length = commit.title.chars().count();
        if length > MAX_TITLE_LENGTH {
            log::warn!(
                "commit {} title is {length} chars (limit {MAX_TITLE_LENGTH}): {}",
                index + 1,
                commit.title
            );
            warned += 1;
        }
    }
    warned
}

/// Warn when a commit references a path outside the collected change set,
/// usually an agent hallucination or a file someone touched since the
/// summary was generated.
pub fn warn_unknown_files(plan: &CommitPlan, valid_files: &HashSet<String>) -> usize {
    let mut warned = 0;
    for commit in &plan.commits {
        for file in &commit.files {
            if !valid_files.contains(file) {
                log::warn!("file '{file}' is not in the current change list");
                warned += 1;
            }
        }
    }
    warned
}

/// Warn about titles that do not parse as `type(scope)?: subject`.
pub fn warn_unconventional_titles(plan: &CommitPlan) -> usize {
    let mut warned = 0;
    for (index, commit) in plan.commits.iter().enumerate() {
        if !is_conventional(&commit.title) {
            log::warn!(
                "commit {} title is not a conventional commit: {}",
                index + 1,
                commit.title
            );
            warned += 1;
        }
    }
    warned
}

/// Warn when the agent embedded ticket keys on its own; keys are assigned
/// afterwards through `--jira` and would end up duplicated.
pub fn warn_embedded_keys(plan: &CommitPlan) -> usize {
    let mut warned = 0;
    for (index, commit) in plan.commits.iter().enumerate() {
        if jira::has_jira_keys(&commit.title) || jira::has_jira_keys(&commit.message) {
            log::warn!(
                "commit {} already mentions a ticket key; prefer --jira assignments",
                index + 1
            );
            warned += 1;
        }
    }
    warned
}

/// `type(scope)?: subject` with a known type, a non-empty scope when one is
/// given, and a space plus non-empty subject after the colon.
pub fn is_conventional(title: &str) -> bool {
    let Some(kind) = COMMIT_TYPES.iter().find(|t| title.starts_with(**t)) else {
        return false;
    };

    let mut rest = &title[kind.len()..];
    if let Some(scoped) = rest.strip_prefix('(') {
        let Some(close) = scoped.find(')') else {
            return false;
        };
        if close == 0 {
            return false;
        }
        rest = &scoped[close + 1..];
    }

    let Some(subject) = rest.strip_prefix(':') else {
        return false;
    };
    let mut chars = subject.chars();
    matches!(chars.next(), Some(c) if c.is_whitespace()) && chars.next().is_some()
}

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::Command as GitCommand;

use crate::response::Commit;
use crate::summary::diffs::DiffSource;

/// One file's state relative to the baseline revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

impl ChangeStatus {
    /// Single-character marker used in tree summary lines.
    pub fn symbol(self) -> &'static str {
        match self {
            ChangeStatus::Added => "A",
            ChangeStatus::Modified => "M",
            ChangeStatus::Deleted => "D",
            ChangeStatus::Renamed => "R",
            ChangeStatus::Untracked => "?",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeStatus::Added => "Added",
            ChangeStatus::Modified => "Modified",
            ChangeStatus::Deleted => "Deleted",
            ChangeStatus::Renamed => "Renamed",
            ChangeStatus::Untracked => "Untracked",
        }
    }
}

/// A single changed file, as collected from the working tree.
#[derive(Debug, Clone)]
pub struct Change {
    pub path: String,
    pub status: ChangeStatus,
}

/// Per-status counts for one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub untracked: usize,
    pub total: usize,
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Fail early when the current directory is not inside a git working tree.
pub fn ensure_repository() -> Result<()> {
    git_output(&["rev-parse", "--is-inside-work-tree"])
        .map(|_| ())
        .map_err(|_| anyhow!("not a git repository (run commitsum inside a working tree)"))
}

/// Get the current branch name.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string();
    Ok(name)
}

/// Collect the pending changes and their per-status counts.
///
/// The merge order is fixed: staged additions, staged modifications, staged
/// deletions, staged renames (listed under the destination path), then
/// working-tree modifications whose exact path is not already listed, then
/// untracked files. `stats.total` always equals the number of changes.
pub fn collect_changes() -> Result<(Vec<Change>, ChangeStats)> {
    let raw = git_output(&["status", "--porcelain"])?;
    Ok(parse_status_output(&raw))
}

/// A parsed `git status --porcelain` line.
struct StatusEntry {
    index: char,
    worktree: char,
    path: String,
}

fn parse_porcelain(raw: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();

    for line in raw.lines() {
        let bytes = line.as_bytes();
        if bytes.len() < 4 || bytes[2] != b' ' {
            continue;
        }
        let index = bytes[0] as char;
        let worktree = bytes[1] as char;
        let rest = &line[3..];

        // Renames and copies are reported as "old -> new"; keep the
        // destination, the path that exists on disk now.
        let path = match rest.split_once(" -> ") {
            Some((_, dest)) if index == 'R' || index == 'C' => unquote_path(dest),
            _ => unquote_path(rest),
        };

        entries.push(StatusEntry {
            index,
            worktree,
            path,
        });
    }

    entries
}

fn parse_status_output(raw: &str) -> (Vec<Change>, ChangeStats) {
    let entries = parse_porcelain(raw);
    let mut changes: Vec<Change> = Vec::new();
    let mut stats = ChangeStats::default();

    for entry in entries.iter().filter(|e| e.index == 'A') {
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Added,
        });
        stats.added += 1;
    }

    for entry in entries.iter().filter(|e| e.index == 'M') {
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Modified,
        });
        stats.modified += 1;
    }

    for entry in entries.iter().filter(|e| e.index == 'D') {
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Deleted,
        });
        stats.deleted += 1;
    }

    for entry in entries.iter().filter(|e| e.index == 'R') {
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Renamed,
        });
        stats.renamed += 1;
    }

    // Working-tree modifications merge in only when the exact path is not
    // already listed; the staged entry wins. Membership is a plain path
    // comparison, nothing status-aware.
    for entry in entries.iter().filter(|e| e.worktree == 'M') {
        if changes.iter().any(|c| c.path == entry.path) {
            continue;
        }
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Modified,
        });
        stats.modified += 1;
    }

    for entry in entries.iter().filter(|e| e.index == '?' && e.worktree == '?') {
        changes.push(Change {
            path: entry.path.clone(),
            status: ChangeStatus::Untracked,
        });
        stats.untracked += 1;
    }

    stats.total = stats.added + stats.modified + stats.deleted + stats.renamed + stats.untracked;

    (changes, stats)
}

/// Undo git's C-style path quoting (`"caf\303\251.txt"` and friends).
fn unquote_path(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return raw.to_string();
    }

    let inner = &bytes[1..bytes.len() - 1];
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut i = 0;

    while i < inner.len() {
        if inner[i] != b'\\' || i + 1 >= inner.len() {
            out.push(inner[i]);
            i += 1;
            continue;
        }
        i += 1;
        match inner[i] {
            b'n' => {
                out.push(b'\n');
                i += 1;
            }
            b't' => {
                out.push(b'\t');
                i += 1;
            }
            b'r' => {
                out.push(b'\r');
                i += 1;
            }
            b'0'..=b'7' => {
                let mut value: u8 = 0;
                let mut digits = 0;
                while digits < 3 && i < inner.len() && (b'0'..=b'7').contains(&inner[i]) {
                    value = value.wrapping_mul(8).wrapping_add(inner[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value);
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Tracked files whose diff against HEAD has textual changes.
///
/// Binary files and entries with zero changed lines are filtered here so
/// the extraction loop only ever sees diff-worthy paths.
pub fn eligible_modified_files() -> Result<Vec<String>> {
    let raw = git_output(&["diff", "--numstat", "HEAD"])?;
    Ok(parse_numstat(&raw))
}

fn parse_numstat(raw: &str) -> Vec<String> {
    let mut files = Vec::new();

    for line in raw.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(insertions), Some(deletions), Some(path)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        // Binary files show "-" in both count columns.
        let (Ok(added), Ok(removed)) = (insertions.parse::<u64>(), deletions.parse::<u64>())
        else {
            continue;
        };
        if added + removed == 0 {
            continue;
        }
        files.push(rename_destination(&unquote_path(path)));
    }

    files
}

/// Resolve numstat's rename notation (`src/{old => new}/x.rs` or
/// `old.rs => b.rs`) to the destination path.
fn rename_destination(path: &str) -> String {
    if let (Some(open), Some(close)) = (path.find('{'), path.find('}')) {
        if open < close {
            if let Some((_, to)) = path[open + 1..close].split_once(" => ") {
                let joined = format!("{}{}{}", &path[..open], to, &path[close + 1..]);
                return joined.replace("//", "/");
            }
        }
    }
    match path.split_once(" => ") {
        Some((_, to)) => to.to_string(),
        None => path.to_string(),
    }
}

/// Get one file's unified diff against HEAD.
pub fn diff_for_file(path: &str) -> Result<String> {
    git_output(&["diff", "HEAD", "--", path])
}

/// One-line insertion/deletion totals; empty when nothing can be diffed.
pub fn short_stat() -> String {
    git_output(&["diff", "--shortstat", "HEAD"])
        .map(|out| out.trim().to_string())
        .unwrap_or_default()
}

/// Serves per-file diffs straight from the working tree.
pub struct WorkTreeDiffs;

impl DiffSource for WorkTreeDiffs {
    fn file_diff(&self, path: &str) -> Result<String> {
        diff_for_file(path)
    }
}

/// Stage the given paths, falling back to `git rm` for deleted files.
///
/// Staging failures are warnings, not errors; the commit itself fails
/// loudly if nothing usable ends up staged.
pub fn stage_files(files: &[String]) {
    for file in files {
        let staged = if Path::new(file).exists() {
            git_output(&["add", "--", file]).map(|_| ())
        } else {
            git_output(&["rm", "--", file])
                .or_else(|_| git_output(&["add", "-A", "--", file]))
                .map(|_| ())
        };
        if let Err(error) = staged {
            log::warn!("failed to stage {file}: {error}");
        }
    }
}

/// Create each commit from the plan in order, aborting on the first failure.
pub fn execute_commits(commits: &[Commit]) -> Result<()> {
    let bar = ProgressBar::new(commits.len() as u64);
    bar.set_style(ProgressStyle::with_template("{pos}/{len} {msg}").expect("valid progress template"));

    for commit in commits {
        let mut title = commit.title.clone();
        if let Some(key) = &commit.jira_key {
            if !title.contains(&format!("({key})")) {
                title = format!("{title} ({key})");
            }
        }

        bar.set_message(title.clone());
        stage_files(&commit.files);

        let mut args = vec!["commit", "-m", title.as_str()];
        if !commit.message.is_empty() {
            args.push("-m");
            args.push(commit.message.as_str());
        }
        git_output(&args).with_context(|| format!("commit failed: {title}"))?;
        bar.inc(1);
    }

    bar.finish_with_message("all commits created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_of(changes: &[Change], status: ChangeStatus) -> Vec<&str> {
        changes
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.path.as_str())
            .collect()
    }

    #[test]
    fn merges_statuses_in_stable_order() {
        let raw = "M  src/lib.rs\nA  src/new.rs\n M README.md\nD  old.txt\nR  from.rs -> to.rs\n?? notes/scratch.md\n";
        let (changes, stats) = parse_status_output(raw);

        assert_eq!(stats.total, changes.len());
        assert_eq!(stats.added, 1);
        assert_eq!(stats.modified, 2);
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.untracked, 1);

        // Staged categories first, then the unstaged edit, then untracked.
        let order: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "src/new.rs",
                "src/lib.rs",
                "old.txt",
                "to.rs",
                "README.md",
                "notes/scratch.md"
            ]
        );
    }

    #[test]
    fn staged_entry_wins_over_worktree_modification() {
        let raw = "MM both.rs\nAM fresh.rs\n M plain.rs\n";
        let (changes, stats) = parse_status_output(raw);

        assert_eq!(stats.added, 1);
        assert_eq!(stats.modified, 2);
        assert_eq!(
            paths_of(&changes, ChangeStatus::Modified),
            vec!["both.rs", "plain.rs"]
        );
        assert_eq!(paths_of(&changes, ChangeStatus::Added), vec!["fresh.rs"]);
    }

    #[test]
    fn rename_records_destination_and_absorbs_worktree_edit() {
        let raw = "RM old_name.rs -> new_name.rs\n";
        let (changes, stats) = parse_status_output(raw);

        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.modified, 0);
        assert_eq!(changes[0].path, "new_name.rs");
        assert_eq!(changes[0].status, ChangeStatus::Renamed);
    }

    #[test]
    fn ignores_codes_outside_the_five_statuses() {
        let raw = "UU conflicted.rs\n D worktree_deleted.rs\n";
        let (changes, stats) = parse_status_output(raw);

        assert!(changes.is_empty());
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn unquotes_escaped_paths() {
        assert_eq!(unquote_path("plain/path.rs"), "plain/path.rs");
        assert_eq!(unquote_path("\"a\\\"b.rs\""), "a\"b.rs");
        assert_eq!(unquote_path("\"tab\\there\""), "tab\there");
        assert_eq!(unquote_path("\"caf\\303\\251.txt\""), "café.txt");
    }

    #[test]
    fn numstat_skips_binary_and_untouched_entries() {
        let raw = "3\t1\tsrc/a.rs\n-\t-\tassets/logo.png\n0\t0\tuntouched.rs\n12\t0\tsrc/b.rs\n";
        assert_eq!(parse_numstat(raw), vec!["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn numstat_resolves_rename_notation() {
        assert_eq!(
            parse_numstat("1\t0\tsrc/{old => new}/mod.rs\n"),
            vec!["src/new/mod.rs"]
        );
        assert_eq!(parse_numstat("2\t2\ta.rs => b.rs\n"), vec!["b.rs"]);
        assert_eq!(
            parse_numstat("1\t0\tsrc/{nested => }/x.rs\n"),
            vec!["src/x.rs"]
        );
    }
}

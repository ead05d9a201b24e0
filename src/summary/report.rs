use crate::git::{Change, ChangeStatus};
use crate::summary::{tree, SummaryLimits};

/// Render the full change report: count header plus per-status file trees.
///
/// Sections appear in a fixed order (Modified, Added, Deleted, Renamed,
/// Untracked) and statuses with no files are skipped entirely. The header
/// always lists all five counts, zeros included.
pub fn assemble_report(branch: &str, changes: &[Change], limits: &SummaryLimits) -> String {
    let files_with = |status: ChangeStatus| -> Vec<String> {
        changes
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.path.clone())
            .collect()
    };

    let modified = files_with(ChangeStatus::Modified);
    let added = files_with(ChangeStatus::Added);
    let deleted = files_with(ChangeStatus::Deleted);
    let renamed = files_with(ChangeStatus::Renamed);
    let untracked = files_with(ChangeStatus::Untracked);
    let total = modified.len() + added.len() + deleted.len() + renamed.len() + untracked.len();

    let mut out = String::new();
    out.push_str("=== CHANGE SUMMARY ===\n");
    out.push_str(&format!("Branch: {branch}\n"));
    out.push_str(&format!("Total: {total} files\n"));
    out.push_str(&format!("  - Added (A): {}\n", added.len()));
    out.push_str(&format!("  - Modified (M): {}\n", modified.len()));
    out.push_str(&format!("  - Deleted (D): {}\n", deleted.len()));
    out.push_str(&format!("  - Renamed (R): {}\n", renamed.len()));
    out.push_str(&format!("  - Untracked (?): {}\n", untracked.len()));
    out.push_str("\n=== FILE TREE ===\n");

    for (status, files) in [
        (ChangeStatus::Modified, &modified),
        (ChangeStatus::Added, &added),
        (ChangeStatus::Deleted, &deleted),
        (ChangeStatus::Renamed, &renamed),
        (ChangeStatus::Untracked, &untracked),
    ] {
        if files.is_empty() {
            continue;
        }
        out.push_str(&format!("\n--- {} ({}) ---\n", status.label(), files.len()));
        out.push_str(&tree::summarize_files(files, status, limits));
        out.push('\n');
    }

    out
}

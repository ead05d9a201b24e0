use anyhow::Result;

use crate::summary::SummaryLimits;

/// Bytes reserved for the language header and other framing around the
/// payload.
const FRAMING_RESERVE: i64 = 500;
/// Leftover room at or below this is not worth a diff section at all.
const MIN_USEFUL_BUDGET: i64 = 1000;
/// Per-file formatting allowance applied before a block is admitted.
const BLOCK_ALLOWANCE: usize = 100;

/// Serves unified diff text for a single file.
pub trait DiffSource {
    fn file_diff(&self, path: &str) -> Result<String>;
}

/// How many bytes of literal diff text may follow a tree summary.
pub fn diff_budget(tree_summary_len: usize, limits: &SummaryLimits) -> usize {
    let remaining = limits.max_input_size as i64 - tree_summary_len as i64 - FRAMING_RESERVE;
    if remaining <= MIN_USEFUL_BUDGET {
        return 0;
    }
    remaining.min(limits.max_diff_size as i64) as usize
}

/// Concatenate per-file diffs, in the given order, until the budget runs
/// out.
///
/// Diffs are fetched strictly one at a time so the cut-off point, and the
/// file count in the truncation notice, are reproducible for a given input
/// order. A file whose diff cannot be retrieved is skipped without charging
/// the budget.
pub fn extract_diffs(files: &[String], budget: usize, source: &dyn DiffSource) -> String {
    if files.is_empty() {
        return String::new();
    }

    let mut out = format!("\n=== MODIFIED FILE DIFFS ({} files) ===", files.len());
    let mut used = out.len();

    for (index, file) in files.iter().enumerate() {
        let diff = match source.file_diff(file) {
            Ok(diff) => diff,
            Err(error) => {
                log::debug!("no diff for {file}: {error}");
                continue;
            }
        };

        if used + diff.len() + BLOCK_ALLOWANCE > budget {
            let remaining = files.len() - index;
            out.push_str(&format!(
                "\n\n[... {remaining} more files truncated due to size limit]"
            ));
            break;
        }

        if !diff.is_empty() {
            out.push_str(&format!("\n\n--- {file} ---\n{diff}"));
            used += diff.len() + file.len() + 10;
        }
    }

    out
}

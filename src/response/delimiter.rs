use anyhow::{anyhow, Result};

use super::{preview, Commit, CommitPlan};

const COMMIT_DELIMITER: &str = "===COMMIT===";

/// Parse the delimiter reply shape: one `===COMMIT===` line per commit,
/// followed by `FILES:`, `TITLE:`, and `MESSAGE:` lines.
///
/// Text before the first delimiter is agent preamble and is ignored.
/// Blocks missing files or a title are dropped; a reply with no usable
/// block at all is an error carrying a preview of what came back.
pub fn parse_delimiter_response(raw: &str) -> Result<CommitPlan> {
    let mut commits = Vec::new();

    for block in raw.split(COMMIT_DELIMITER).skip(1) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        if let Some(commit) = parse_commit_block(block) {
            commits.push(commit);
        }
    }

    if commits.is_empty() {
        return Err(anyhow!(
            "no valid commits found in response; reply started with: {}...",
            preview(raw, 500)
        ));
    }

    Ok(CommitPlan { commits })
}

/// The format is line-oriented and single-line per field; a later MESSAGE
/// line overwrites an earlier one rather than extending it.
fn parse_commit_block(block: &str) -> Option<Commit> {
    let mut files_line = "";
    let mut title = "";
    let mut message = "";

    for line in block.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("FILES:") {
            files_line = rest.trim();
        } else if let Some(rest) = line.strip_prefix("TITLE:") {
            title = rest.trim();
        } else if let Some(rest) = line.strip_prefix("MESSAGE:") {
            message = rest.trim();
        }
    }

    if files_line.is_empty() || title.is_empty() {
        return None;
    }

    let files: Vec<String> = files_line
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if files.is_empty() {
        return None;
    }

    Some(Commit {
        files,
        title: title.to_string(),
        message: message.to_string(),
        jira_key: None,
    })
}

/// Render a plan back into delimiter format, used for debug output.
pub fn to_delimiter_format(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(|commit| {
            format!(
                "{COMMIT_DELIMITER}\nFILES: {}\nTITLE: {}\nMESSAGE: {}",
                commit.files.join(", "),
                commit.title,
                commit.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

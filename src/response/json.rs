use anyhow::{anyhow, Result};
use serde_json::Value;

use super::{preview, Commit, CommitPlan};

/// Parse the JSON reply shape:
/// `{"commits": [{"files": [...], "title": "...", "message": "...",
/// "jira_key": "..."}]}`.
///
/// Fields are read leniently the way agents actually emit them. A commit
/// with no files or no title is dropped rather than failing the whole
/// reply; an empty `jira_key` string counts as absent.
pub fn parse_json_response(raw: &str) -> Result<CommitPlan> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|_| anyhow!("invalid JSON response: {}...", preview(raw, 200)))?;

    let entries = value
        .get("commits")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("response does not contain a commits array"))?;

    let commits: Vec<Commit> = entries
        .iter()
        .map(commit_from_value)
        .filter(|c| !c.files.is_empty() && !c.title.is_empty())
        .collect();

    if commits.is_empty() {
        return Err(anyhow!("no valid commits found in response"));
    }

    Ok(CommitPlan { commits })
}

fn commit_from_value(value: &Value) -> Commit {
    let files = value
        .get("files")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let jira_key = value
        .get("jira_key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    Commit {
        files,
        title: string_field(value, "title"),
        message: string_field(value, "message"),
        jira_key,
    }
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_reply() {
        let raw = r#"{"commits": [
            {"files": ["src/a.rs", "src/b.rs"], "title": "feat(core): add parser", "message": "details here", "jira_key": "PROJ-12"},
            {"files": ["README.md"], "title": "docs: update readme", "message": ""}
        ]}"#;
        let plan = parse_json_response(raw).unwrap();

        assert_eq!(plan.commits.len(), 2);
        assert_eq!(plan.commits[0].files, vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(plan.commits[0].title, "feat(core): add parser");
        assert_eq!(plan.commits[0].jira_key.as_deref(), Some("PROJ-12"));
        assert_eq!(plan.commits[1].message, "");
        assert_eq!(plan.commits[1].jira_key, None);
    }

    #[test]
    fn drops_commits_missing_files_or_title() {
        let raw = r#"{"commits": [
            {"files": [], "title": "feat: nothing staged"},
            {"files": ["a.rs"], "title": ""},
            {"files": ["b.rs"], "title": "fix: keep me"}
        ]}"#;
        let plan = parse_json_response(raw).unwrap();

        assert_eq!(plan.commits.len(), 1);
        assert_eq!(plan.commits[0].title, "fix: keep me");
    }

    #[test]
    fn empty_jira_key_reads_as_absent() {
        let raw = r#"{"commits": [{"files": ["a.rs"], "title": "fix: x", "jira_key": ""}]}"#;
        let plan = parse_json_response(raw).unwrap();
        assert_eq!(plan.commits[0].jira_key, None);
    }

    #[test]
    fn non_string_file_entries_are_ignored() {
        let raw = r#"{"commits": [{"files": ["a.rs", 42, null], "title": "fix: x"}]}"#;
        let plan = parse_json_response(raw).unwrap();
        assert_eq!(plan.commits[0].files, vec!["a.rs"]);
    }

    #[test]
    fn missing_commits_array_is_a_distinct_error() {
        let err = parse_json_response(r#"{"not_commits": []}"#).unwrap_err();
        assert!(err.to_string().contains("commits array"));
    }

    #[test]
    fn malformed_json_error_previews_the_reply() {
        let err = parse_json_response("I think you should...").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("invalid JSON response"));
        assert!(text.contains("I think you should"));
    }

    #[test]
    fn multibyte_reply_previews_without_panicking() {
        let raw = "한".repeat(300);
        let err = parse_json_response(&raw).unwrap_err();
        assert!(err.to_string().contains("invalid JSON response"));
    }

    #[test]
    fn all_commits_invalid_is_an_error() {
        let raw = r#"{"commits": [{"files": [], "title": ""}]}"#;
        assert!(parse_json_response(raw).is_err());
    }
}

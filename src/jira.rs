use anyhow::{anyhow, Result};

use crate::response::CommitPlan;

/// A ticket assignment for one commit in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraAssignment {
    /// Zero-based position in the plan; the CLI takes 1-based numbers.
    pub commit_index: usize,
    pub keys: Vec<String>,
}

/// Scan text, usually a pasted browse URL, for ticket keys like `PROJ-123`.
///
/// A key is an uppercase-letter run, a dash, and a digit run. Duplicates
/// keep their first occurrence. When a dash is not followed by digits the
/// scan resumes after the dash, so `ABC-QQ-12` yields `QQ-12`.
pub fn extract_jira_keys(input: &str) -> Vec<String> {
    let bytes = input.as_bytes();
    let mut keys: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_uppercase() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_uppercase() {
            i += 1;
        }

        if i < bytes.len() && bytes[i] == b'-' {
            let digit_start = i + 1;
            let mut j = digit_start;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digit_start {
                let key = &input[start..j];
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
                i = j;
            }
        }
    }

    keys
}

/// `true` when the text contains at least one ticket key.
pub fn has_jira_keys(input: &str) -> bool {
    !extract_jira_keys(input).is_empty()
}

/// `PROJ-123` shape with nothing before or after.
pub fn is_valid_jira_key(key: &str) -> bool {
    let Some(dash) = key.find('-') else {
        return false;
    };
    let letters = &key[..dash];
    let digits = &key[dash + 1..];
    !letters.is_empty()
        && letters.bytes().all(|b| b.is_ascii_uppercase())
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Comma-join for display and title tags.
pub fn format_jira_keys(keys: &[String]) -> String {
    keys.join(", ")
}

/// Parse one `--jira` argument: `<1-based commit number>=<key or URL>`.
pub fn parse_assignment(raw: &str, commit_count: usize) -> Result<JiraAssignment> {
    let (index_part, key_part) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected N=KEY, got '{raw}'"))?;

    let number: usize = index_part
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{}' is not a commit number", index_part.trim()))?;
    if number == 0 || number > commit_count {
        return Err(anyhow!(
            "commit number {number} is out of range (plan has {commit_count})"
        ));
    }

    let key_part = key_part.trim();
    let keys = if is_valid_jira_key(key_part) {
        vec![key_part.to_string()]
    } else {
        extract_jira_keys(key_part)
    };
    if keys.is_empty() {
        return Err(anyhow!("no ticket key found in '{key_part}'"));
    }

    Ok(JiraAssignment {
        commit_index: number - 1,
        keys,
    })
}

/// Collapse repeated assignments aimed at the same commit into one entry,
/// deduping keys in first-seen order. Duplicate detection expects at most
/// one assignment per commit, so it only ever counts cross-commit sharing.
pub fn merge_assignments(assignments: Vec<JiraAssignment>) -> Vec<JiraAssignment> {
    let mut merged: Vec<JiraAssignment> = Vec::new();

    for assignment in assignments {
        match merged
            .iter_mut()
            .find(|m| m.commit_index == assignment.commit_index)
        {
            Some(existing) => {
                for key in assignment.keys {
                    if !existing.keys.contains(&key) {
                        existing.keys.push(key);
                    }
                }
            }
            None => merged.push(assignment),
        }
    }

    merged
}

/// Keys assigned to more than one commit, in first-seen order. Those
/// commits describe one ticket's work and should be merged before anything
/// is applied.
pub fn find_duplicate_keys(assignments: &[JiraAssignment]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for assignment in assignments {
        for key in &assignment.keys {
            match counts.iter_mut().find(|(k, _)| k == key) {
                Some((_, count)) => *count += 1,
                None => counts.push((key.clone(), 1)),
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key)
        .collect()
}

/// Tag each assigned commit's title with its keys and record them on the
/// commit.
pub fn apply_assignments(plan: &mut CommitPlan, assignments: &[JiraAssignment]) {
    for assignment in assignments {
        if assignment.keys.is_empty() {
            continue;
        }
        let Some(commit) = plan.commits.get_mut(assignment.commit_index) else {
            continue;
        };
        let keys = format_jira_keys(&assignment.keys);
        commit.title = format!("{} ({keys})", commit.title);
        commit.jira_key = Some(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Commit;

    fn plan_of(titles: &[&str]) -> CommitPlan {
        CommitPlan {
            commits: titles
                .iter()
                .map(|title| Commit {
                    files: vec!["a.rs".to_string()],
                    title: title.to_string(),
                    message: String::new(),
                    jira_key: None,
                })
                .collect(),
        }
    }

    #[test]
    fn extracts_keys_from_free_text_and_urls() {
        assert_eq!(extract_jira_keys("PROJ-123"), vec!["PROJ-123"]);
        assert_eq!(
            extract_jira_keys("https://example.atlassian.net/browse/TEAM-42?focus=1"),
            vec!["TEAM-42"]
        );
        assert_eq!(
            extract_jira_keys("fix AB-1 and AB-2, then AB-1 again"),
            vec!["AB-1", "AB-2"]
        );
        assert!(extract_jira_keys("nothing here").is_empty());
        assert!(extract_jira_keys("lower-123").is_empty());
    }

    #[test]
    fn scanner_resumes_after_a_barren_dash() {
        assert_eq!(extract_jira_keys("ABC-QQ-12"), vec!["QQ-12"]);
        assert!(extract_jira_keys("ABC-").is_empty());
    }

    #[test]
    fn validates_exact_key_shape() {
        assert!(is_valid_jira_key("PROJ-1"));
        assert!(is_valid_jira_key("A-123456"));
        assert!(!is_valid_jira_key("proj-1"));
        assert!(!is_valid_jira_key("PROJ-"));
        assert!(!is_valid_jira_key("-123"));
        assert!(!is_valid_jira_key("PROJ-12a"));
        assert!(!is_valid_jira_key("PROJ_12"));
        assert!(!is_valid_jira_key("AB-CD-12"));
    }

    #[test]
    fn parses_bare_key_assignments() {
        let assignment = parse_assignment("2=PROJ-7", 3).unwrap();
        assert_eq!(assignment.commit_index, 1);
        assert_eq!(assignment.keys, vec!["PROJ-7"]);
    }

    #[test]
    fn parses_url_assignments() {
        let assignment =
            parse_assignment("1=https://example.atlassian.net/browse/OPS-91", 1).unwrap();
        assert_eq!(assignment.commit_index, 0);
        assert_eq!(assignment.keys, vec!["OPS-91"]);
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!(parse_assignment("PROJ-7", 3).is_err());
        assert!(parse_assignment("x=PROJ-7", 3).is_err());
        assert!(parse_assignment("0=PROJ-7", 3).is_err());
        assert!(parse_assignment("4=PROJ-7", 3).is_err());
        assert!(parse_assignment("1=no key here", 3).is_err());
    }

    #[test]
    fn merges_repeated_flags_for_one_commit() {
        let assignments = vec![
            JiraAssignment {
                commit_index: 0,
                keys: vec!["A-1".to_string()],
            },
            JiraAssignment {
                commit_index: 0,
                keys: vec!["A-1".to_string()],
            },
            JiraAssignment {
                commit_index: 0,
                keys: vec!["B-2".to_string()],
            },
            JiraAssignment {
                commit_index: 1,
                keys: vec!["C-3".to_string()],
            },
        ];
        let merged = merge_assignments(assignments);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].commit_index, 0);
        assert_eq!(merged[0].keys, vec!["A-1", "B-2"]);
        assert_eq!(merged[1].commit_index, 1);
        assert_eq!(merged[1].keys, vec!["C-3"]);
    }

    #[test]
    fn repeated_assignment_of_one_key_is_not_cross_commit_sharing() {
        let merged = merge_assignments(vec![
            JiraAssignment {
                commit_index: 0,
                keys: vec!["A-1".to_string()],
            },
            JiraAssignment {
                commit_index: 0,
                keys: vec!["A-1".to_string()],
            },
        ]);

        assert!(find_duplicate_keys(&merged).is_empty());
    }

    #[test]
    fn finds_keys_shared_across_assignments() {
        let assignments = vec![
            JiraAssignment {
                commit_index: 0,
                keys: vec!["A-1".to_string()],
            },
            JiraAssignment {
                commit_index: 1,
                keys: vec!["B-2".to_string(), "A-1".to_string()],
            },
            JiraAssignment {
                commit_index: 2,
                keys: vec!["B-2".to_string()],
            },
        ];
        assert_eq!(find_duplicate_keys(&assignments), vec!["A-1", "B-2"]);
    }

    #[test]
    fn applies_keys_to_titles_and_records_them() {
        let mut plan = plan_of(&["feat: one", "fix: two"]);
        let assignments = vec![JiraAssignment {
            commit_index: 1,
            keys: vec!["OPS-3".to_string(), "OPS-4".to_string()],
        }];

        apply_assignments(&mut plan, &assignments);

        assert_eq!(plan.commits[0].title, "feat: one");
        assert_eq!(plan.commits[0].jira_key, None);
        assert_eq!(plan.commits[1].title, "fix: two (OPS-3, OPS-4)");
        assert_eq!(plan.commits[1].jira_key.as_deref(), Some("OPS-3, OPS-4"));
    }
}

use crate::config::Config;
use crate::response::{Commit, ResponseFormat};
use crate::summary::ChangeAnalysis;

/// What the agent is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTask {
    /// Draft a commit plan from a change summary.
    Commit,
    /// Merge commits that share one ticket into a single commit.
    Regroup,
}

pub const COMMIT_RULES: &str = r#"You are a commit message generator. Read the change summary and propose one or more commits:
- Follow Conventional Commits: type(scope): description.
- Allowed types: feat, fix, docs, style, refactor, test, chore, perf, ci, build.
- Keep every title under 72 characters.
- Group related files into one commit; split unrelated changes into separate commits.
- Only reference files listed in the summary, never invent paths.
- Do not put ticket numbers (like ABC-123) in titles or messages; tickets are assigned afterwards.
- TITLE_LANG and MESSAGE_LANG at the top of the input select the language for titles and messages."#;

pub const REGROUP_RULES: &str = r#"You are a commit message regrouper. The listed commits belong to one ticket and must become a single commit:
- Combine all their files, dropping duplicates.
- Write one title covering the merged changes, ending with the ticket key in parentheses.
- Write one message summarizing everything the merged commit does.
- Follow Conventional Commits: type(scope): description, title under 72 characters.
- TITLE_LANG and MESSAGE_LANG at the top of the input select the language for titles and messages."#;

pub const JSON_CONTRACT: &str = r#"Reply with ONLY a JSON document, no other text:
{"commits": [{"files": ["path/one", "path/two"], "title": "type(scope): description", "message": "one line of detail", "jira_key": ""}]}"#;

pub const DELIMITER_CONTRACT: &str = r#"Reply with ONLY blocks in this exact form, no other text:
===COMMIT===
FILES: path/one, path/two
TITLE: type(scope): description
MESSAGE: one line of detail

Repeat the ===COMMIT=== block for each separate commit."#;

/// Instruction preamble for a task and the reply format the parser expects.
pub fn instructions(task: PromptTask, format: ResponseFormat) -> String {
    let rules = match task {
        PromptTask::Commit => COMMIT_RULES,
        PromptTask::Regroup => REGROUP_RULES,
    };
    let contract = match format {
        ResponseFormat::Json => JSON_CONTRACT,
        ResponseFormat::Delimiter => DELIMITER_CONTRACT,
    };
    format!("{rules}\n\n{contract}")
}

/// A ready-to-send request: instruction preamble plus input payload.
#[derive(Debug)]
pub struct AgentPrompt {
    pub instructions: String,
    pub input: String,
}

/// Frame one analysis as agent input. The language header is part of the
/// framing the diff budget's reserve leaves room for.
pub fn build_commit_prompt(
    analysis: &ChangeAnalysis,
    config: &Config,
    format: ResponseFormat,
) -> AgentPrompt {
    let input = format!(
        "TITLE_LANG: {}\nMESSAGE_LANG: {}\n\n{}{}",
        config.title_lang.as_str(),
        config.message_lang.as_str(),
        analysis.tree_summary,
        analysis.diff_content
    );

    AgentPrompt {
        instructions: instructions(PromptTask::Commit, format),
        input,
    }
}

/// Frame a merge request for commits that share one ticket key.
pub fn build_regroup_input(key: &str, commits: &[&Commit], config: &Config) -> String {
    let mut combined: Vec<&str> = Vec::new();
    for commit in commits {
        for file in &commit.files {
            if !combined.contains(&file.as_str()) {
                combined.push(file);
            }
        }
    }

    let mut input = format!(
        "TITLE_LANG: {}\nMESSAGE_LANG: {}\nJIRA_KEY: {key}\n\nMerge these commits into ONE commit, ending the title with ({key}):\n\n",
        config.title_lang.as_str(),
        config.message_lang.as_str()
    );
    for commit in commits {
        input.push_str(&format!(
            "- Title: {}\n  Files: {}\n  Message: {}\n\n",
            commit.title,
            commit.files.join(", "),
            commit.message
        ));
    }
    input.push_str(&format!("Combined files: {}\n", combined.join(", ")));

    input
}

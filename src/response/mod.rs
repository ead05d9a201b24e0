pub mod delimiter;
pub mod json;

use anyhow::Result;
use clap::ValueEnum;

/// One commit proposed by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub files: Vec<String>,
    pub title: String,
    pub message: String,
    pub jira_key: Option<String>,
}

/// A parsed agent reply.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    pub commits: Vec<Commit>,
}

/// Wire shape the agent is asked to reply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponseFormat {
    /// A `{"commits": [...]}` JSON document.
    Json,
    /// `===COMMIT===` delimited plain-text blocks.
    Delimiter,
}

/// Parse a raw agent reply in the given format.
pub fn parse_response(format: ResponseFormat, raw: &str) -> Result<CommitPlan> {
    match format {
        ResponseFormat::Json => json::parse_json_response(raw),
        ResponseFormat::Delimiter => delimiter::parse_delimiter_response(raw),
    }
}

/// First `max` characters of a reply, for error messages. Cuts on a char
/// boundary so multi-byte replies cannot panic the error path.
pub(crate) fn preview(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

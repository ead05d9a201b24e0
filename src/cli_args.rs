use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::Language;
use crate::response::ResponseFormat;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "commitsum",
    version,
    about = "Summarizes pending Git changes into size-budgeted input for a commit message agent"
)]
pub struct Cli {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ceiling for the whole agent input, in bytes
    #[arg(long, env = "COMMITSUM_MAX_INPUT_SIZE", global = true)]
    pub max_input_size: Option<usize>,

    /// Ceiling for the literal diff section, in bytes
    #[arg(long, env = "COMMITSUM_MAX_DIFF_SIZE", global = true)]
    pub max_diff_size: Option<usize>,

    /// Path depth at which large change sets collapse into directory groups
    #[arg(long, env = "COMMITSUM_TREE_DEPTH", global = true)]
    pub tree_depth: Option<usize>,

    /// Largest file count still listed one line per file
    #[arg(long, env = "COMMITSUM_COMPRESSION_THRESHOLD", global = true)]
    pub compression_threshold: Option<usize>,

    /// Language for generated commit titles
    #[arg(long, value_enum, global = true)]
    pub title_lang: Option<Language>,

    /// Language for generated commit messages
    #[arg(long, value_enum, global = true)]
    pub message_lang: Option<Language>,

    /// Reply format the agent is asked for (and `parse` expects)
    #[arg(long, value_enum, default_value_t = ResponseFormat::Json, global = true)]
    pub format: ResponseFormat,

    /// Skip the per-file diff section even when it would fit
    #[arg(long)]
    pub no_diff: bool,

    /// Print the instruction preamble along with the input payload
    #[arg(long)]
    pub instructions: bool,

    /// Write the agent input to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Subcommand (e.g. 'parse')
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `commitsum parse reply.json`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse an agent reply into a commit plan, validate it, and optionally commit
    Parse {
        /// File holding the agent reply; reads stdin when omitted
        file: Option<PathBuf>,

        /// Assign a ticket to a commit, e.g. `2=PROJ-123` or `1=<browse URL>`
        #[arg(long = "jira", value_name = "N=KEY")]
        jira: Vec<String>,

        /// Stage and create each commit in the plan
        #[arg(long)]
        apply: bool,
    },
}

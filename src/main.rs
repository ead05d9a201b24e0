mod cli_args;
mod config;
mod git;
mod jira;
mod logging;
mod prompts;
mod response;
mod summary;
mod validate;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use crate::cli_args::{Cli, Command};
use crate::config::Config;
use crate::jira::JiraAssignment;
use crate::prompts::PromptTask;
use crate::response::CommitPlan;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let config = Config::from_sources(&cli);

    match &cli.command {
        Some(Command::Parse { file, jira, apply }) => {
            run_parse(&cli, &config, file.as_deref(), jira, *apply)
        }
        None => run_generate(&cli, &config),
    }
}

/// Default mode: summarize the working tree and emit the agent input.
fn run_generate(cli: &Cli, config: &Config) -> Result<()> {
    let analysis = summary::analyze_repository(&config.limits, !cli.no_diff)?;

    if analysis.stats.total == 0 {
        println!("No changes to commit.");
        return Ok(());
    }

    log::info!(
        "{} changed files on branch {} ({} added, {} modified, {} deleted, {} renamed, {} untracked)",
        analysis.stats.total,
        analysis.branch,
        analysis.stats.added,
        analysis.stats.modified,
        analysis.stats.deleted,
        analysis.stats.renamed,
        analysis.stats.untracked
    );
    log::debug!("collected changes: {:?}", analysis.changes);
    let stat = git::short_stat();
    if !stat.is_empty() {
        log::info!("{stat}");
    }
    log::info!(
        "input sizes: tree summary {} bytes, diffs {} bytes",
        analysis.tree_summary.len(),
        analysis.diff_content.len()
    );
    if analysis.diff_content.is_empty() && !cli.no_diff {
        log::info!("diff section is empty (over budget, or nothing diffable)");
    }

    let prompt = prompts::build_commit_prompt(&analysis, config, cli.format);

    match &cli.out {
        Some(path) => {
            fs::write(path, &prompt.input)
                .with_context(|| format!("failed to write agent input to {}", path.display()))?;
            println!(
                "Wrote {} bytes of agent input to {}",
                prompt.input.len(),
                path.display()
            );
            if cli.instructions {
                println!("\n{}", prompt.instructions);
            }
        }
        None => {
            if cli.instructions {
                println!("{}\n", prompt.instructions);
            }
            print!("{}", prompt.input);
            if !prompt.input.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

/// `parse` mode: turn an agent reply into a validated commit plan.
fn run_parse(
    cli: &Cli,
    config: &Config,
    file: Option<&Path>,
    jira_args: &[String],
    apply: bool,
) -> Result<()> {
    let raw = read_reply(file)?;
    let mut plan = response::parse_response(cli.format, &raw)?;
    log::debug!(
        "normalized plan:\n{}",
        response::delimiter::to_delimiter_format(&plan.commits)
    );

    validate::warn_long_titles(&plan);
    validate::warn_unconventional_titles(&plan);
    validate::warn_embedded_keys(&plan);

    match summary::analyze_repository(&config.limits, false) {
        Ok(analysis) => {
            validate::warn_unknown_files(&plan, &analysis.valid_files);
        }
        Err(error) => log::warn!("skipping file validation: {error}"),
    }

    let assignments = jira_args
        .iter()
        .map(|raw| jira::parse_assignment(raw, plan.commits.len()))
        .collect::<Result<Vec<JiraAssignment>>>()?;
    let assignments = jira::merge_assignments(assignments);

    let duplicates = jira::find_duplicate_keys(&assignments);
    if !duplicates.is_empty() {
        show_commits(&plan);
        for key in &duplicates {
            let count = assignments
                .iter()
                .filter(|a| a.keys.contains(key))
                .count();
            log::warn!("{key} is assigned to {count} commits");
        }
        println!(
            "{}",
            "Commits sharing a ticket should be merged into one. Feed the request below to your agent, then re-run parse on its reply:"
                .yellow()
        );
        if cli.instructions {
            println!("\n{}", prompts::instructions(PromptTask::Regroup, cli.format));
        }
        for key in &duplicates {
            let shared: Vec<&response::Commit> = assignments
                .iter()
                .filter(|a| a.keys.contains(key))
                .map(|a| &plan.commits[a.commit_index])
                .collect();
            println!("\n{}", prompts::build_regroup_input(key, &shared, config));
        }
        if apply {
            bail!(
                "refusing to apply while {} ticket(s) span multiple commits",
                duplicates.len()
            );
        }
        return Ok(());
    }

    jira::apply_assignments(&mut plan, &assignments);
    show_commits(&plan);

    if apply {
        git::execute_commits(&plan.commits)?;
        println!("{}", "All commits created.".green());
    }

    Ok(())
}

/// Read the agent reply from a file or stdin.
fn read_reply(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read agent reply from {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read agent reply from stdin")?;
            Ok(raw)
        }
    }
}

/// Print the proposed commits the way they will be created.
fn show_commits(plan: &CommitPlan) {
    println!("\n{}\n", "=== Proposed Commits ===".green());
    for (index, commit) in plan.commits.iter().enumerate() {
        println!(
            "{} {}",
            format!("[{}]", index + 1).cyan(),
            commit.title.green()
        );
        println!("    Files: {}", commit.files.join(", "));
        if !commit.message.is_empty() {
            println!("    Message: {}", commit.message);
        }
        if let Some(key) = &commit.jira_key {
            println!("    {}", format!("Jira: {key}").magenta());
        }
        println!();
    }
}

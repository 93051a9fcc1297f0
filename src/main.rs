//! git-assist - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_assist::ai::AiGateway;
use git_assist::commit::{CommitWorkflow, PushOutcome, WorkflowOutcome};
use git_assist::config::{Config, load_config};
use git_assist::git::{
    GitCli, RepositoryBackend, RepositoryStatus, check_git_installed, get_status,
};
use git_assist::prompt::TerminalPrompter;
use git_assist::stage::{RelevanceSource, StagingOutcome, StagingReport, stage_changes};

/// Exit code for a cancelled run.
const EXIT_CANCELLED: u8 = 130;

/// Guided git commits with optional AI-generated messages.
#[derive(Parser, Debug)]
#[command(name = "git-assist")]
#[command(about = "Guided git commits with optional AI-generated messages")]
#[command(version)]
struct Cli {
    /// Path to a config file (default: ./git-assist.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Stage, compose and commit (default)
    Commit,
    /// Stage changes only
    Stage,
    /// Show working-tree status
    Status,
    /// Print the effective configuration with credentials masked
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    check_git_installed()?;
    let cwd = std::env::current_dir().context("Cannot read the current directory")?;
    let git = GitCli::discover(&cwd)
        .context("Run git-assist from within a git repository")?;

    let config = load_config(cli.config.as_deref(), Some(git.workdir()))
        .context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Commit) {
        Command::Commit => run_commit(&config, &git).await,
        Command::Stage => run_stage(&config, &git).await,
        Command::Status => run_status(&git),
        Command::Config => print_config(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "git_assist=debug" } else { "git_assist=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_commit(config: &Config, git: &GitCli) -> Result<ExitCode> {
    let gateway = AiGateway::new();
    let prompter = TerminalPrompter;
    let workflow = CommitWorkflow::new(config, git, &gateway, &prompter);

    let outcome = workflow.run().await.context("Commit failed")?;
    match outcome {
        WorkflowOutcome::Committed(summary) => {
            if let Some(report) = &summary.staging {
                print_staging_report(report);
            }
            println!("✓ Committed: {}", summary.message.lines().next().unwrap_or_default());
            // Hook and push failures were already shown by the prompter.
            if summary.push == PushOutcome::Pushed {
                println!("✓ Pushed to remote");
            }
            Ok(ExitCode::SUCCESS)
        }
        WorkflowOutcome::NothingToCommit => {
            println!("Nothing to commit.");
            Ok(ExitCode::SUCCESS)
        }
        WorkflowOutcome::Cancelled => {
            println!("Commit cancelled.");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

async fn run_stage(config: &Config, git: &GitCli) -> Result<ExitCode> {
    let status = get_status(git).context("Failed to read repository status")?;
    if status.is_empty() {
        println!("No changes to stage.");
        return Ok(ExitCode::SUCCESS);
    }
    print_files(&status);

    let gateway = AiGateway::new();
    let relevance = RelevanceSource {
        gateway: &gateway,
        ai: &config.ai,
    };
    let outcome = stage_changes(
        &config.stage_options,
        &status,
        git,
        &TerminalPrompter,
        Some(relevance),
    )
    .await
    .context("Staging failed")?;

    match outcome {
        StagingOutcome::Applied(report) => {
            print_staging_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        StagingOutcome::NothingToStage | StagingOutcome::NothingSelected => {
            println!("Nothing staged.");
            Ok(ExitCode::SUCCESS)
        }
        StagingOutcome::Cancelled => {
            println!("Staging cancelled.");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}

fn run_status(git: &GitCli) -> Result<ExitCode> {
    let status = get_status(git).context("Failed to read repository status")?;
    if status.is_empty() {
        println!("Working tree clean.");
        return Ok(ExitCode::SUCCESS);
    }

    if let Ok(Some(branch)) = git.current_branch() {
        println!("On branch {}", branch);
    }
    println!(
        "{} changed: {} staged, {} unstaged, {} untracked",
        status.len(),
        status.staged_count(),
        status.unstaged_count(),
        status.untracked_count()
    );
    print_files(&status);
    Ok(ExitCode::SUCCESS)
}

fn print_config(config: &Config) -> Result<ExitCode> {
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(ExitCode::SUCCESS)
}

fn print_files(status: &RepositoryStatus) {
    for file in status.files() {
        let marker = if file.staged { "+" } else { " " };
        println!("  {} {:<22} {}", marker, file.status, file.path);
    }
}

fn print_staging_report(report: &StagingReport) {
    if !report.staged.is_empty() {
        println!("Staged: {}", report.staged.join(", "));
    }
    if !report.failures.is_empty() {
        eprintln!("{} staging operation(s) failed", report.failures.len());
    }
}

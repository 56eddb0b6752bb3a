//! rune - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rune::config::ConfigStore;
use rune::editor::ExternalEditor;
use rune::error::SessionError;
use rune::git::{Git, check_git_installed};
use rune::llm::{build_generator, format_model_list, resolve_model};
use rune::session::{CommitSession, SessionOptions, SessionOutcome};
use rune::setup::run_setup;
use rune::ui::TerminalReviewer;

/// Generate a commit message for your changes with an LLM.
#[derive(Parser, Debug)]
#[command(name = "rune")]
#[command(about = "Generate git commit messages from your changes using an LLM")]
#[command(version)]
struct Cli {
    /// Offer to edit the message before committing (--edit=false to disable)
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    edit: bool,

    /// Include unstaged changes (stages everything when auto-stage is on)
    #[arg(short, long)]
    all: bool,

    /// Only use changes that are already staged
    #[arg(long, conflicts_with = "all")]
    staged: bool,

    /// Model to use for this run (id, short name, or alias)
    #[arg(short, long)]
    model: Option<String>,

    /// Show the generated message without committing
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Run the setup wizard
    #[arg(long)]
    setup: bool,

    /// List available models and exit
    #[arg(long)]
    list_models: bool,

    /// Make a model the default and exit
    #[arg(long, value_name = "MODEL")]
    set_default_model: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output for rune.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "rune=debug" } else { "rune=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}

fn report(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);

    let suggestions = err
        .downcast_ref::<SessionError>()
        .map(SessionError::suggestions)
        .unwrap_or_default();
    if !suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.list_models {
        print!("{}", format_model_list());
        return Ok(());
    }

    let store = ConfigStore::default_location()?;

    if let Some(query) = cli.set_default_model.as_deref() {
        let (provider, model) = resolve_model(query).map_err(SessionError::from)?;
        store.set_default_model(provider, &model)?;
        println!("Default model set to {} ({})", model, provider);
        return Ok(());
    }

    if cli.setup {
        run_setup(&store)?;
        return Ok(());
    }

    check_git_installed().map_err(SessionError::from)?;
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let git = Git::discover(&cwd).map_err(SessionError::from)?;

    let (config, credentials) = match store.load()? {
        Some(config) => (config, store.load_credentials()?),
        None => {
            println!("No configuration found. Let's set one up.\n");
            run_setup(&store)?
        }
    };
    debug!("Loaded config: {:?}", config);

    let generator =
        build_generator(&config, &credentials, cli.model.as_deref()).map_err(SessionError::from)?;

    let options = SessionOptions {
        dry_run: cli.dry_run,
        allow_edit: cli.edit,
        show_progress: !cli.verbose,
        ..SessionOptions::from_config(&config, cli.all, cli.staged)
    };

    let mut reviewer = TerminalReviewer;
    let editor = ExternalEditor::from_env();
    let outcome = CommitSession::new(git, options, generator.as_ref(), &mut reviewer, &editor)
        .run()
        .await?;

    match outcome {
        SessionOutcome::Committed(message) => {
            println!("Committed: {}", message.subject);
        }
        SessionOutcome::Aborted => println!("Aborted. No commit was made."),
        SessionOutcome::NothingToCommit => println!("Nothing to commit, working tree clean."),
        SessionOutcome::DryRun(_) => println!("Dry run complete. No commit was made."),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_edit_defaults_on_and_can_be_disabled() {
        assert!(Cli::parse_from(["rune"]).edit);
        assert!(Cli::parse_from(["rune", "--edit"]).edit);
        assert!(!Cli::parse_from(["rune", "--edit=false"]).edit);
    }

    #[test]
    fn test_all_and_staged_conflict() {
        assert!(Cli::try_parse_from(["rune", "--all", "--staged"]).is_err());
        let cli = Cli::parse_from(["rune", "-a", "-m", "d", "--dry-run"]);
        assert!(cli.all);
        assert_eq!(cli.model.as_deref(), Some("d"));
        assert!(cli.dry_run);
    }
}

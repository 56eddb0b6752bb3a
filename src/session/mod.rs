//! The interactive commit session.
//!
//! Staging, diffing, generation, review and commit run as an explicit state
//! machine. Files rune stages are held by a [`StagingGuard`] that is released
//! on every exit path except a successful commit.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::commit::{CommitMessage, format_message};
use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::editor::MessageEditor;
use crate::error::SessionError;
use crate::git::{DiffScope, Git, StagingGuard, StagingReconciler};
use crate::llm::{CommitMessageGenerator, generate_with_timeout};
use crate::ui::{Choice, Reviewer, Spinner, invalid_choice_hint, parse_choice};

/// How a session should behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Consider unstaged changes as well as staged ones.
    pub include_all: bool,
    /// Stage everything first when `include_all` is set.
    pub auto_stage: bool,
    /// Stop after showing the first candidate.
    pub dry_run: bool,
    pub allow_edit: bool,
    pub timeout: Duration,
    pub show_progress: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            include_all: true,
            auto_stage: true,
            dry_run: false,
            allow_edit: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            show_progress: true,
        }
    }
}

impl SessionOptions {
    /// Options from the config and the `--all` / `--staged` flags.
    /// `--staged` wins; otherwise `--all` or a config without `staged_only`
    /// includes everything.
    pub fn from_config(config: &Config, all: bool, staged: bool) -> Self {
        Self {
            include_all: !staged && (all || !config.staged_only),
            auto_stage: config.auto_stage_all,
            timeout: config.timeout(),
            ..Self::default()
        }
    }

    /// Whether the session runs stage-all before diffing.
    pub fn stages_all(&self) -> bool {
        self.include_all && self.auto_stage
    }

    /// Staged when stage-all runs or only staged changes are wanted,
    /// otherwise everything since the last commit.
    pub fn diff_scope(&self) -> DiffScope {
        if self.include_all && !self.auto_stage {
            DiffScope::LastCommit
        } else {
            DiffScope::Staged
        }
    }
}

/// How a session ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Committed(CommitMessage),
    /// The user quit; anything rune staged was unstaged.
    Aborted,
    /// Stage-all left nothing in the index.
    NothingToCommit,
    /// Dry run: the candidate was shown but not committed.
    DryRun(CommitMessage),
}

enum State {
    Staging,
    Diffing(DiffScope),
    Generating,
    Reviewing(CommitMessage),
    Editing(CommitMessage),
    Committing(CommitMessage),
    Aborting,
    Finished(SessionOutcome),
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Staging => "Staging",
            State::Diffing(_) => "Diffing",
            State::Generating => "Generating",
            State::Reviewing(_) => "Reviewing",
            State::Editing(_) => "Editing",
            State::Committing(_) => "Committing",
            State::Aborting => "Aborting",
            State::Finished(_) => "Finished",
        };
        f.write_str(name)
    }
}

/// One invocation of the commit flow against a repository.
pub struct CommitSession<'a> {
    git: Git,
    options: SessionOptions,
    generator: &'a dyn CommitMessageGenerator,
    reviewer: &'a mut dyn Reviewer,
    editor: &'a dyn MessageEditor,
    diff: String,
}

impl<'a> CommitSession<'a> {
    pub fn new(
        git: Git,
        options: SessionOptions,
        generator: &'a dyn CommitMessageGenerator,
        reviewer: &'a mut dyn Reviewer,
        editor: &'a dyn MessageEditor,
    ) -> Self {
        Self {
            git,
            options,
            generator,
            reviewer,
            editor,
            diff: String::new(),
        }
    }

    /// Run the session to completion.
    ///
    /// Files staged by this session are unstaged unless the commit succeeded.
    /// If that rollback fails after another error, the original error is
    /// returned; after a clean exit the rollback error is returned.
    pub async fn run(mut self) -> Result<SessionOutcome, SessionError> {
        let mut guard = StagingGuard::new(StagingReconciler::new(self.git.clone()));

        let result = self.drive(&mut guard).await;
        let released = guard.release();

        match (result, released) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(rollback)) => Err(rollback.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(rollback)) => {
                warn!("Failed to unstage files staged by rune: {}", rollback);
                Err(e)
            }
        }
    }

    async fn drive(&mut self, guard: &mut StagingGuard) -> Result<SessionOutcome, SessionError> {
        let mut state = State::Staging;
        loop {
            debug!("Session state: {:?}", state);
            state = match self.step(state, guard).await? {
                State::Finished(outcome) => return Ok(outcome),
                next => next,
            };
        }
    }

    async fn step(&mut self, state: State, guard: &mut StagingGuard) -> Result<State, SessionError> {
        match state {
            State::Staging => {
                if !self.options.stages_all() {
                    return Ok(State::Diffing(self.options.diff_scope()));
                }

                let staged = StagingReconciler::new(self.git.clone()).atomic_stage_all()?;
                guard.track(staged.newly_staged);
                if staged.total_staged.is_empty() {
                    info!("Nothing staged after stage-all");
                    return Ok(State::Finished(SessionOutcome::NothingToCommit));
                }
                Ok(State::Diffing(self.options.diff_scope()))
            }

            State::Diffing(scope) => {
                self.diff = self.git.diff(scope)?;
                debug!("Found {} characters of {}", self.diff.chars().count(), scope);
                Ok(State::Generating)
            }

            State::Generating => {
                let spinner = Spinner::start(
                    format!("Generating commit message ({})...", self.generator.provider()),
                    self.options.show_progress,
                );
                let raw = generate_with_timeout(self.generator, &self.diff, self.options.timeout).await;
                spinner.stop();

                let candidate = format_message(&raw?)?;
                Ok(State::Reviewing(candidate))
            }

            State::Reviewing(candidate) => {
                let warning = candidate.validate().err();
                self.reviewer.present(&candidate, warning.as_ref());

                if self.options.dry_run {
                    return Ok(State::Finished(SessionOutcome::DryRun(candidate)));
                }

                let answer = self
                    .reviewer
                    .prompt_choice(self.options.allow_edit)
                    .map_err(SessionError::Input)?;

                Ok(match parse_choice(&answer, self.options.allow_edit) {
                    Choice::Regenerate => State::Generating,
                    Choice::Accept => State::Committing(candidate),
                    Choice::Edit => State::Editing(candidate),
                    Choice::Abort => State::Aborting,
                    Choice::Invalid(input) => {
                        debug!("Invalid menu choice {:?}", input);
                        self.reviewer.notice(invalid_choice_hint(self.options.allow_edit));
                        State::Reviewing(candidate)
                    }
                })
            }

            State::Editing(candidate) => match self.editor.edit(&candidate.render())? {
                Some(text) => Ok(State::Reviewing(CommitMessage::parse(&text)?)),
                None => {
                    self.reviewer.notice("No changes made. Returning to options.");
                    Ok(State::Reviewing(candidate))
                }
            },

            State::Committing(message) => {
                self.git.commit_with_message(&message.render())?;
                guard.disarm();
                Ok(State::Finished(SessionOutcome::Committed(message)))
            }

            State::Aborting => {
                let count = guard.newly_staged().len();
                if count > 0 {
                    self.reviewer
                        .notice(&format!("Unstaging {} file(s) staged by rune...", count));
                }
                Ok(State::Finished(SessionOutcome::Aborted))
            }

            State::Finished(outcome) => Ok(State::Finished(outcome)),
        }
    }
}

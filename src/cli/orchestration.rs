//! Main deploy workflow orchestration logic
//!
//! A deploy runs four steps in strict order, and the first failure stops the
//! run:
//!
//! 1. Check whether the production remote needs a new release tag
//! 2. Pick the next tag and create it
//! 3. Push the branch and the tags
//! 4. Resolve the command templates and run them on the remote

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{CandidateTagSet, CommandTemplate, OptionSet, SemanticTag};
use crate::error::{DeployError, Result};
use crate::git::Repository;
use crate::remote::RemoteExecutor;
use crate::ui;

/// Picks the release key when none was given on the command line
pub trait ReleaseChooser {
    /// Choose a key of `candidates` for the release following `current`
    fn choose_release(&self, current: &str, candidates: &CandidateTagSet) -> Result<String>;
}

impl<F> ReleaseChooser for F
where
    F: Fn(&str, &CandidateTagSet) -> Result<String>,
{
    fn choose_release(&self, current: &str, candidates: &CandidateTagSet) -> Result<String> {
        self(current, candidates)
    }
}

/// Arguments for the deploy workflow
///
/// Mirrors the CLI arguments, decoupled from clap so the workflow can be
/// driven programmatically.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    /// Remote to deploy to
    pub remote: String,

    /// Release key (`major`, `minor`, ...); asked for when missing
    pub release: Option<String>,

    /// Values for command placeholders
    pub options: OptionSet,

    /// Compute everything but change nothing
    pub dry_run: bool,
}

impl DeployRequest {
    pub fn new(remote: impl Into<String>) -> Self {
        DeployRequest {
            remote: remote.into(),
            release: None,
            options: OptionSet::new(),
            dry_run: false,
        }
    }
}

/// Result of a successful deploy
#[derive(Debug, Clone, PartialEq)]
pub struct DeployReport {
    pub remote: String,

    /// The release tag created (or that would be created on a dry run)
    pub tag: Option<String>,

    /// Whether `git push` and `git push --tags` ran
    pub pushed: bool,

    /// The resolved command list, `cd <root>` first
    pub commands: Vec<String>,

    /// Whether the commands were run on the remote
    pub executed: bool,
}

/// Drives one deploy against its collaborators
pub struct ReleaseOrchestrator<'a, R, X, C> {
    config: &'a Config,
    repo: &'a R,
    executor: &'a X,
    chooser: &'a C,
}

impl<'a, R, X, C> ReleaseOrchestrator<'a, R, X, C>
where
    R: Repository,
    X: RemoteExecutor,
    C: ReleaseChooser,
{
    pub fn new(config: &'a Config, repo: &'a R, executor: &'a X, chooser: &'a C) -> Self {
        ReleaseOrchestrator {
            config,
            repo,
            executor,
            chooser,
        }
    }

    /// Run the whole deploy
    ///
    /// # Returns
    /// * `Ok(DeployReport)` - Every step succeeded (or was skipped)
    /// * `Err` - The first failing step; later steps did not run
    pub fn run(&self, request: &DeployRequest) -> Result<DeployReport> {
        let connection = self.config.remote.connection(&request.remote)?;

        let tag = self.tag_release(request)?;
        let pushed = self.push(request, tag.as_deref())?;

        let commands = self.build_commands(&connection.root, &request.options)?;
        if commands.len() == 1 {
            ui::display_boundary_warning(&BoundaryWarning::NoCommandsConfigured {
                remote: request.remote.clone(),
            });
        }
        let executed = self.run_commands(request, &commands)?;

        Ok(DeployReport {
            remote: request.remote.clone(),
            tag,
            pushed,
            commands,
            executed,
        })
    }

    /// Whether deploying to `remote` requires a release tag
    pub fn requires_release_tag(&self, remote: &str) -> bool {
        self.config.production.enabled && remote == self.config.production.name
    }

    /// Create the next release tag when deploying to production
    ///
    /// # Returns
    /// * `Ok(Some(tag))` - The tag created (or that would be on a dry run)
    /// * `Ok(None)` - Not a production deploy, or HEAD already on a release tag
    pub fn tag_release(&self, request: &DeployRequest) -> Result<Option<String>> {
        if !self.requires_release_tag(&request.remote) {
            return Ok(None);
        }

        let pattern = &self.config.production.tag_pattern;
        let (described, nearest) = match (
            self.repo.describe(pattern, true)?,
            self.repo.describe(pattern, false)?,
        ) {
            (Some(described), Some(nearest)) => (described, nearest),
            _ => {
                ui::display_boundary_warning(&BoundaryWarning::NoReleaseTag {
                    pattern: pattern.clone(),
                });
                return Ok(None);
            }
        };

        let current = match SemanticTag::from_describe(&described, &nearest)? {
            Some(current) => current,
            None => {
                ui::display_status(&format!("Already on release tag {}", nearest));
                return Ok(None);
            }
        };

        let candidates = current.candidates()?;
        let release = match &request.release {
            Some(release) => release.clone(),
            None => self.chooser.choose_release(&nearest, &candidates)?,
        };
        let next = candidates.resolve(&release)?.to_string();

        if request.dry_run {
            ui::display_status(&format!("Would tag deployed version as: {}", next));
            return Ok(Some(next));
        }

        ui::display_status(&format!("Tagging deployed version as: {}", next));
        self.repo
            .create_tag(&next)
            .map_err(|e| DeployError::GitTagFailed {
                tag: next.clone(),
                reason: e.to_string(),
            })?;
        ui::display_success(&format!("Created tag: {}", next));

        Ok(Some(next))
    }

    /// Push the branch, then the tags
    ///
    /// A tag created by this run is not removed when pushing fails; the user is
    /// warned instead.
    pub fn push(&self, request: &DeployRequest, new_tag: Option<&str>) -> Result<bool> {
        if !self.config.push {
            if let (Some(tag), false) = (new_tag, request.dry_run) {
                warn_unpushed(tag, "pushing is disabled");
            }
            return Ok(false);
        }

        if request.dry_run {
            ui::display_status("Would run: git push && git push --tags");
            return Ok(false);
        }

        ui::display_status("Pushing to remote...");
        self.repo.push().map_err(|e| {
            if let Some(tag) = new_tag {
                warn_unpushed(tag, "git push failed");
            }
            DeployError::GitPushFailed {
                reason: e.to_string(),
            }
        })?;

        self.repo.push_tags().map_err(|e| {
            if let Some(tag) = new_tag {
                warn_unpushed(tag, "git push --tags failed");
            }
            DeployError::GitPushTagsFailed {
                reason: e.to_string(),
            }
        })?;
        ui::display_success("Pushed branch and tags");

        Ok(true)
    }

    /// Resolve the command list: `cd <root>`, then the configured commands
    ///
    /// Empty entries are dropped before resolution.
    pub fn build_commands(&self, root: &str, options: &OptionSet) -> Result<Vec<String>> {
        let mut templates = vec![CommandTemplate::leaf(format!("cd {}", root))];
        templates.extend(self.config.commands.templates()?);
        templates.retain(|template| !template.is_empty());

        let lookup = |name: &str| options.get(name);
        let resolved = CommandTemplate::Sequence(templates).resolve(&lookup)?;

        Ok(resolved
            .flatten()
            .into_iter()
            .filter(|command| !command.trim().is_empty())
            .collect())
    }

    fn run_commands(&self, request: &DeployRequest, commands: &[String]) -> Result<bool> {
        ui::display_commands(&request.remote, commands);

        if request.dry_run {
            return Ok(false);
        }

        self.executor.run(&request.remote, commands)?;
        Ok(true)
    }
}

fn warn_unpushed(tag: &str, reason: &str) {
    ui::display_boundary_warning(&BoundaryWarning::TagNotPushed {
        tag: tag.to_string(),
        reason: reason.to_string(),
    });
}

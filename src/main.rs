use anyhow::{Context, Result};

use git_deploy::cli::orchestration::{DeployRequest, ReleaseOrchestrator};
use git_deploy::cli::{self, Args};
use git_deploy::config::{self, Config};
use git_deploy::domain::OptionSet;
use git_deploy::git::Git2Repository;
use git_deploy::remote::SshExecutor;
use git_deploy::ui::{self, PromptChooser};

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();

    // Load configuration first; it decides which --set-* options exist
    let config = match config::load_config(cli::config_path_hint(&argv).as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let names = match config.placeholder_names() {
        Ok(names) => names,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let (args, options) = match cli::parse_with_options(&argv, &names) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    if args.list {
        ui::display_remotes(&config.remote);
        return Ok(());
    }

    let request = match build_request(&args, options, &config) {
        Some(request) => request,
        None => {
            ui::display_error("No remote given and no remote.default configured");
            std::process::exit(1);
        }
    };

    let repo = Git2Repository::open(".").context("Not in a git repository")?;
    let executor = SshExecutor::new(config.remote.clone());
    let chooser = PromptChooser;

    let orchestrator = ReleaseOrchestrator::new(&config, &repo, &executor, &chooser);
    match orchestrator.run(&request) {
        Ok(report) => ui::display_report(&report),
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn build_request(args: &Args, options: OptionSet, config: &Config) -> Option<DeployRequest> {
    let remote = args
        .remote
        .clone()
        .or_else(|| config.remote.default.clone())?;

    Some(DeployRequest {
        remote,
        release: args.release.clone(),
        options,
        dry_run: args.dry_run,
    })
}

//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::DeployReport;
use crate::config::RemoteConfig;
use crate::domain::CandidateTagSet;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the current release and the numbered next-release choices.
///
/// # Arguments
/// * `current` - The tag HEAD is based on
/// * `candidates` - Next tags keyed by release kind
pub fn display_candidates(current: &str, candidates: &CandidateTagSet) {
    println!(
        "\n{} {}",
        style("The current release version is:").bold(),
        style(current).red()
    );
    println!("{}", style("Next release:").underlined());
    for (i, (kind, tag)) in candidates.iter().enumerate() {
        println!("  {}. {:<8} {}", i + 1, kind.key(), style(tag).green());
    }
}

/// Display the command list about to run (or that would run) on a remote.
pub fn display_commands(remote: &str, commands: &[String]) {
    println!("\n{} {}", style("Commands for remote").bold(), style(remote).cyan());
    for command in commands {
        println!("  $ {}", command);
    }
}

/// Display configured remotes, marking the default one.
pub fn display_remotes(remotes: &RemoteConfig) {
    println!("{}", style("Configured remotes:").bold());
    for (name, connection) in &remotes.connections {
        let marker = if remotes.default.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("  - {}{}: {}:{}", name, marker, connection.host, connection.root);
    }
}

/// Display the closing summary of a deploy.
pub fn display_report(report: &DeployReport) {
    let tag = report.tag.as_deref().unwrap_or("untagged");
    if report.executed {
        println!(
            "\n{} Deployed {} to {}\n",
            style("✓").green(),
            tag,
            report.remote
        );
    } else {
        println!(
            "\n{} Dry run for {}: tag {}, {} command(s), nothing was changed\n",
            style("→").yellow(),
            report.remote,
            tag,
            report.commands.len()
        );
    }
}

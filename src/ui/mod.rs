//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, Write};

use crate::cli::orchestration::ReleaseChooser;
use crate::domain::CandidateTagSet;
use crate::error::{DeployError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_candidates, display_commands, display_error,
    display_remotes, display_report, display_status, display_success,
};

/// Asks on the terminal which release to cut.
///
/// Without an attended terminal (CI, pipes) there is nobody to ask, so the
/// release must be passed on the command line instead.
pub struct PromptChooser;

impl ReleaseChooser for PromptChooser {
    fn choose_release(&self, current: &str, candidates: &CandidateTagSet) -> Result<String> {
        if !console::user_attended() {
            return Err(DeployError::ReleaseRequired {
                choices: candidates.keys().join(", "),
            });
        }

        display_candidates(current, candidates);

        print!(
            "\nPlease select the next release version (1-{}): ",
            candidates.len()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        select_release(input.trim(), candidates)
    }
}

/// Interpret a prompt answer as a release key.
///
/// Accepts either the 1-based position in the presented list or the key itself.
///
/// # Returns
/// * `Ok(String)` - The selected release key
/// * `Err` - If the answer names no candidate
pub fn select_release(answer: &str, candidates: &CandidateTagSet) -> Result<String> {
    if let Ok(index) = answer.parse::<usize>() {
        return candidates
            .iter()
            .nth(index.wrapping_sub(1))
            .map(|(kind, _)| kind.key().to_string())
            .ok_or_else(|| DeployError::unknown_release_type(answer));
    }

    candidates.resolve(answer)?;
    Ok(answer.to_string())
}

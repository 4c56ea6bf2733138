//! Remote command execution
//!
//! The command list of a deploy is handed over as one batch: later commands
//! depend on earlier ones (`cd`, then `git pull`, then `composer install`), so
//! they are never dispatched one by one.

pub mod mock;
pub mod ssh;

pub use mock::RecordingExecutor;
pub use ssh::SshExecutor;

use crate::error::Result;

/// Runs an ordered command list on a named remote
pub trait RemoteExecutor {
    /// Run `commands` in order on `remote`, stopping at the first failure
    fn run(&self, remote: &str, commands: &[String]) -> Result<()>;
}

/// Join a command list into a single shell line that stops at the first failure
pub fn batch(commands: &[String]) -> String {
    commands.join(" && ")
}

//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of Git
//! operations a deploy needs, allowing for a real repository and a mock
//! implementation for testing.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A recording implementation for testing
//!
//! ```rust
//! # use git_deploy::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_deploy::Result<()> {
//! let described = repo.describe("v[0-9]*", true)?;
//! let nearest = repo.describe("v[0-9]*", false)?;
//! if let (Some(described), Some(nearest)) = (described, nearest) {
//!     if described != nearest {
//!         repo.create_tag("v1.3.0")?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Common git operation trait for abstraction
///
/// Implementations are driven from a single thread. Failures are reported as
/// [crate::error::DeployError] values; the orchestrator turns them into the
/// step-specific failure (`GitTagFailed`, `GitPushFailed`, ...).
pub trait Repository {
    /// Describe HEAD in terms of the nearest tag matching `pattern`
    ///
    /// With `abbreviate` the output carries the `-<distance>-g<sha>` suffix
    /// when HEAD is past the tag (`git describe --tags --match <pattern>`);
    /// without it only the tag name is returned (`--abbrev=0`).
    ///
    /// # Returns
    /// * `Ok(Some(String))` - Trimmed describe output
    /// * `Ok(None)` - If no tag matches the pattern
    /// * `Err` - If there's a Git error
    fn describe(&self, pattern: &str, abbreviate: bool) -> Result<Option<String>>;

    /// Create a lightweight tag on HEAD (`git tag <name>`)
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push the current branch to its upstream (`git push`)
    fn push(&self) -> Result<()>;

    /// Push all local tags to the upstream remote (`git push --tags`)
    fn push_tags(&self) -> Result<()>;
}

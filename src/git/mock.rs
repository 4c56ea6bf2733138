use crate::error::{DeployError, Result};
use crate::git::Repository;
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
///
/// Answers `describe` from canned values and records every side effect, in
/// order, as the equivalent git command line.
pub struct MockRepository {
    described: Option<String>,
    nearest: Option<String>,
    fail_tag: bool,
    fail_push: bool,
    fail_push_tags: bool,
    calls: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a mock without any tags
    pub fn new() -> Self {
        MockRepository {
            described: None,
            nearest: None,
            fail_tag: false,
            fail_push: false,
            fail_push_tags: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// HEAD is exactly on `tag`
    pub fn on_tag(tag: &str) -> Self {
        Self::new().with_describe(tag, tag)
    }

    /// HEAD is `distance` commits past `tag`
    pub fn past_tag(tag: &str, distance: u32) -> Self {
        Self::new().with_describe(&format!("{}-{}-g1234abc", tag, distance), tag)
    }

    pub fn with_describe(mut self, described: &str, nearest: &str) -> Self {
        self.described = Some(described.to_string());
        self.nearest = Some(nearest.to_string());
        self
    }

    pub fn failing_tag(mut self) -> Self {
        self.fail_tag = true;
        self
    }

    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    pub fn failing_push_tags(mut self) -> Self {
        self.fail_push_tags = true;
        self
    }

    /// Side effects performed so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn describe(&self, _pattern: &str, abbreviate: bool) -> Result<Option<String>> {
        let answer = if abbreviate {
            &self.described
        } else {
            &self.nearest
        };
        Ok(answer.clone())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.record(format!("git tag {}", name));
        if self.fail_tag {
            return Err(DeployError::Git(git2::Error::from_str("tag already exists")));
        }
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.record("git push".to_string());
        if self.fail_push {
            return Err(DeployError::remote("rejected (non-fast-forward)"));
        }
        Ok(())
    }

    fn push_tags(&self) -> Result<()> {
        self.record("git push --tags".to_string());
        if self.fail_push_tags {
            return Err(DeployError::remote("rejected"));
        }
        Ok(())
    }
}

use std::fmt;

/// Non-fatal conditions met during a deploy that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tag matching the release pattern exists, so nothing can be incremented
    NoReleaseTag { pattern: String },
    /// A release tag was created but never reached the remote
    TagNotPushed { tag: String, reason: String },
    /// Every configured command is empty; only the directory change would run
    NoCommandsConfigured { remote: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoReleaseTag { pattern } => {
                write!(
                    f,
                    "No tag matches '{}'; create the first release tag by hand to enable tagging",
                    pattern
                )
            }
            BoundaryWarning::TagNotPushed { tag, reason } => {
                write!(
                    f,
                    "Tag '{}' exists locally but was not pushed ({}). Push it with `git push --tags` or drop it with `git tag -d {}`",
                    tag, reason, tag
                )
            }
            BoundaryWarning::NoCommandsConfigured { remote } => {
                write!(f, "No commands configured for remote '{}'", remote)
            }
        }
    }
}

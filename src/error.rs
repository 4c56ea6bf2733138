use thiserror::Error;

/// Unified error type for git-deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Unknown tag format: {tag}")]
    UnknownTagFormat { tag: String },

    #[error("Unknown release type: {release}")]
    UnknownReleaseType { release: String },

    #[error("No release type given and no terminal to ask on (choose one of: {choices})")]
    ReleaseRequired { choices: String },

    #[error("FAILED: git tag {tag}: {reason}")]
    GitTagFailed { tag: String, reason: String },

    #[error("FAILED: git push: {reason}")]
    GitPushFailed { reason: String },

    #[error("FAILED: git push --tags: {reason}")]
    GitPushTagsFailed { reason: String },

    #[error("You need to specify the --set-{name} argument!")]
    MissingOption { name: String },

    #[error("Placeholder {token} reappears after substitution; check the --set-* values")]
    SubstitutionLoop { token: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-deploy
pub type Result<T> = std::result::Result<T, DeployError>;

impl DeployError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DeployError::Config(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        DeployError::Remote(msg.into())
    }

    pub fn unknown_tag_format(tag: impl Into<String>) -> Self {
        DeployError::UnknownTagFormat { tag: tag.into() }
    }

    pub fn unknown_release_type(release: impl Into<String>) -> Self {
        DeployError::UnknownReleaseType {
            release: release.into(),
        }
    }

    pub fn missing_option(name: impl Into<String>) -> Self {
        DeployError::MissingOption { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeployError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DeployError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_unknown_tag_format_names_the_tag() {
        let err = DeployError::unknown_tag_format("v1.2");
        assert_eq!(err.to_string(), "Unknown tag format: v1.2");
    }

    #[test]
    fn test_unknown_release_type_names_the_key() {
        let err = DeployError::unknown_release_type("huge");
        assert_eq!(err.to_string(), "Unknown release type: huge");
    }

    #[test]
    fn test_missing_option_names_the_flag() {
        let err = DeployError::missing_option("branch");
        assert_eq!(
            err.to_string(),
            "You need to specify the --set-branch argument!"
        );
    }

    #[test]
    fn test_git_step_failures_are_distinguishable() {
        let errors = vec![
            (
                DeployError::GitTagFailed {
                    tag: "v1.0.0".to_string(),
                    reason: "exists".to_string(),
                },
                "FAILED: git tag v1.0.0",
            ),
            (
                DeployError::GitPushFailed {
                    reason: "rejected".to_string(),
                },
                "FAILED: git push:",
            ),
            (
                DeployError::GitPushTagsFailed {
                    reason: "rejected".to_string(),
                },
                "FAILED: git push --tags",
            ),
        ];

        for (err, expected_prefix) in errors {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_release_required_lists_choices() {
        let err = DeployError::ReleaseRequired {
            choices: "major, minor, patch".to_string(),
        };
        assert!(err.to_string().contains("major, minor, patch"));
    }
}

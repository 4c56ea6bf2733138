use crate::error::{DeployError, Result};
use git2::{
    Cred, CredentialType, DescribeFormatOptions, DescribeOptions, ErrorClass, ErrorCode,
    PushOptions, RemoteCallbacks, Repository as Git2Repo,
};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Full reference name of the checked out branch, e.g. "refs/heads/main"
    fn head_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(DeployError::remote("HEAD is detached, nothing to push"));
        }
        head.name()
            .map(str::to_string)
            .ok_or_else(|| DeployError::remote("HEAD is not valid UTF-8"))
    }

    /// Remote the current branch tracks, "origin" when it tracks nothing
    fn upstream_remote(&self, branch_ref: &str) -> String {
        self.repo
            .branch_upstream_remote(branch_ref)
            .ok()
            .and_then(|buf| buf.as_str().map(str::to_string))
            .unwrap_or_else(|| "origin".to_string())
    }

    /// Upstream ref of a branch (`branch.<name>.merge`), if configured
    fn upstream_merge(&self, branch_ref: &str) -> Option<String> {
        let branch = branch_ref.strip_prefix("refs/heads/")?;
        self.repo
            .config()
            .ok()?
            .get_string(&format!("branch.{}.merge", branch))
            .ok()
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            DeployError::remote(format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(credentials);
        callbacks.push_update_reference(|reference, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{} rejected: {}",
                reference, message
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| DeployError::remote(format!("Push to '{}' failed: {}", remote_name, e)))?;

        Ok(())
    }
}

/// Credentials callback shared by all network operations.
///
/// Tries SSH keys from ~/.ssh, then the SSH agent, then the configured
/// credential helper for HTTPS remotes.
fn credentials(
    url: &str,
    username_from_url: Option<&str>,
    allowed_types: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url.unwrap_or("git");

    if allowed_types.contains(CredentialType::SSH_KEY) {
        if let Some(home) = dirs::home_dir() {
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = home.join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }
        }

        if let Ok(cred) = Cred::ssh_key_from_agent(username) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Ok(config) = git2::Config::open_default() {
            if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                return Ok(cred);
            }
        }
    }

    Cred::default()
}

impl super::Repository for Git2Repository {
    fn describe(&self, pattern: &str, abbreviate: bool) -> Result<Option<String>> {
        let mut options = DescribeOptions::new();
        options.describe_tags().pattern(pattern);

        let description = match self.repo.describe(&options) {
            Ok(description) => description,
            Err(e) if e.code() == ErrorCode::NotFound || e.class() == ErrorClass::Describe => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        if !abbreviate {
            format.abbreviated_size(0);
        }

        Ok(Some(description.format(Some(&format))?.trim().to_string()))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn push(&self) -> Result<()> {
        let branch_ref = self.head_branch()?;
        let remote_name = self.upstream_remote(&branch_ref);
        let destination = self
            .upstream_merge(&branch_ref)
            .unwrap_or_else(|| branch_ref.clone());

        self.push_refspecs(&remote_name, &[format!("{}:{}", branch_ref, destination)])
    }

    fn push_tags(&self) -> Result<()> {
        let remote_name = match self.head_branch() {
            Ok(branch_ref) => self.upstream_remote(&branch_ref),
            Err(_) => "origin".to_string(),
        };

        let refspecs: Vec<String> = self
            .repo
            .tag_names(None)?
            .iter()
            .flatten()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        if refspecs.is_empty() {
            return Ok(());
        }

        self.push_refspecs(&remote_name, &refspecs)
    }
}

use crate::config::{RemoteConfig, RemoteConnection};
use crate::error::{DeployError, Result};
use crate::remote::{batch, RemoteExecutor};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs command batches over `ssh`, using the configured connections.
///
/// Connections pointing at localhost run through the local shell instead.
/// Output is streamed straight to the terminal.
pub struct SshExecutor {
    remotes: RemoteConfig,
}

impl SshExecutor {
    pub fn new(remotes: RemoteConfig) -> Self {
        SshExecutor { remotes }
    }

    fn command_for(&self, connection: &RemoteConnection, line: &str) -> Command {
        if is_local_host(&connection.host) {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", line]);
            return cmd;
        }

        let mut cmd = Command::new("ssh");
        cmd.args(build_ssh_args(connection, line));
        cmd
    }
}

impl RemoteExecutor for SshExecutor {
    fn run(&self, remote: &str, commands: &[String]) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        let connection = self.remotes.connection(remote)?;
        let line = batch(commands);

        let status = self
            .command_for(connection, &line)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| DeployError::remote(format!("Cannot start ssh for '{}': {}", remote, e)))?;

        if !status.success() {
            return Err(DeployError::remote(format!(
                "Commands failed on '{}' with exit code {}",
                remote,
                status.code().unwrap_or(-1)
            )));
        }

        Ok(())
    }
}

/// Arguments for a non-interactive `ssh` invocation running `line`
pub fn build_ssh_args(connection: &RemoteConnection, line: &str) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(identity_file) = connection.identity_file.as_deref() {
        if !identity_file.is_empty() {
            args.push("-i".to_string());
            args.push(expand_home(identity_file).to_string_lossy().into_owned());
        }
    }

    if let Some(port) = connection.port {
        if port != 22 {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
    }

    args.extend([
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        "ConnectTimeout=10".to_string(),
    ]);

    args.push(connection.host.clone());
    args.push(line.to_string());
    args
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Whether an ssh destination (`host` or `user@host`) is this machine
pub fn is_local_host(destination: &str) -> bool {
    let host = destination
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(destination);
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn connection(host: &str) -> RemoteConnection {
        RemoteConnection {
            host: host.to_string(),
            port: None,
            identity_file: None,
            root: "/".to_string(),
        }
    }

    fn executor_for(host: &str) -> SshExecutor {
        let mut connections = BTreeMap::new();
        connections.insert("box".to_string(), connection(host));
        SshExecutor::new(RemoteConfig {
            default: None,
            connections,
        })
    }

    #[test]
    fn test_ssh_args_minimal() {
        let args = build_ssh_args(&connection("deploy@example.com"), "uptime");
        assert_eq!(args.last().unwrap(), "uptime");
        assert_eq!(args[args.len() - 2], "deploy@example.com");
        assert!(!args.contains(&"-p".to_string()));
        assert!(args.contains(&"BatchMode=yes".to_string()));
    }

    #[test]
    fn test_ssh_args_port_and_identity() {
        let mut conn = connection("example.com");
        conn.port = Some(2222);
        conn.identity_file = Some("/keys/deploy".to_string());
        let args = build_ssh_args(&conn, "uptime");
        assert_eq!(&args[..4], ["-i", "/keys/deploy", "-p", "2222"]);
    }

    #[test]
    fn test_ssh_args_default_port_omitted() {
        let mut conn = connection("example.com");
        conn.port = Some(22);
        assert!(!build_ssh_args(&conn, "uptime").contains(&"-p".to_string()));
    }

    #[test]
    fn test_is_local_host() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("deploy@127.0.0.1"));
        assert!(is_local_host("::1"));
        assert!(!is_local_host("deploy@example.com"));
    }

    #[test]
    fn test_unknown_remote_fails() {
        let executor = executor_for("localhost");
        assert!(executor.run("elsewhere", &["true".to_string()]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_local_batch_success_and_failure() {
        let executor = executor_for("localhost");
        assert!(executor
            .run("box", &["cd /".to_string(), "true".to_string()])
            .is_ok());

        let err = executor
            .run("box", &["false".to_string(), "true".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("exit code 1"), "got {}", err);
    }
}

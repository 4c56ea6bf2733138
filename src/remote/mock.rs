use crate::error::{DeployError, Result};
use crate::remote::RemoteExecutor;
use std::sync::Mutex;

/// Executor that records command batches instead of running them
#[derive(Default)]
pub struct RecordingExecutor {
    fail: bool,
    runs: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run fails after being recorded
    pub fn failing() -> Self {
        RecordingExecutor {
            fail: true,
            ..Self::default()
        }
    }

    /// Recorded `(remote, commands)` pairs
    pub fn runs(&self) -> Vec<(String, Vec<String>)> {
        self.runs.lock().map(|runs| runs.clone()).unwrap_or_default()
    }
}

impl RemoteExecutor for RecordingExecutor {
    fn run(&self, remote: &str, commands: &[String]) -> Result<()> {
        if let Ok(mut runs) = self.runs.lock() {
            runs.push((remote.to_string(), commands.to_vec()));
        }
        if self.fail {
            return Err(DeployError::remote(format!(
                "Commands failed on '{}' with exit code 1",
                remote
            )));
        }
        Ok(())
    }
}

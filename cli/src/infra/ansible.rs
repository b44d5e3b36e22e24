//! Infrastructure implementation of the `PlaybookRunner` port.
//!
//! Shells out to `ansible-playbook` through a `CommandRunner` and turns its
//! exit status and `PLAY RECAP` into a [`PlaybookReport`].

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, PlaybookRunner};
use crate::domain::{PlaybookReport, PlaybookVars, WinsetupError};

/// Lines of stderr/stdout kept in a failure message.
const TAIL_LINES: usize = 20;

/// `ansible-playbook` driver.
pub struct AnsiblePlaybook<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> AnsiblePlaybook<R> {
    #[must_use]
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

fn tail(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}

impl<R: CommandRunner> PlaybookRunner for AnsiblePlaybook<R> {
    async fn run_playbook(
        &self,
        playbook: &Path,
        inventory: &Path,
        vars: &PlaybookVars,
    ) -> Result<PlaybookReport> {
        let inventory = inventory.display().to_string();
        let playbook = playbook.display().to_string();
        let extra_vars = vars.to_json()?;
        let args = ["-i", inventory.as_str(), playbook.as_str(), "--extra-vars", extra_vars.as_str()];

        let output = self.runner.run(&self.program, &args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            tracing::debug!(target: "ansible", "{line}");
        }

        let report = PlaybookReport::parse(&stdout);
        if !output.status.success() {
            let detail = if stderr.trim().is_empty() { tail(&stdout) } else { tail(&stderr) };
            return Err(WinsetupError::PlaybookFailed {
                host: vars.hosts.clone(),
                reason: format!("{} exited with {}\n{detail}", self.program, output.status),
            }
            .into());
        }
        let failed = report.failed_hosts();
        if !failed.is_empty() {
            return Err(WinsetupError::PlaybookFailed {
                host: vars.hosts.clone(),
                reason: format!("failed or unreachable hosts: {}", failed.join(", ")),
            }
            .into());
        }
        Ok(report)
    }
}

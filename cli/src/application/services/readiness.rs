//! Application service — SSH readiness gate.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, SshProbe};
use crate::domain::{ReadinessPolicy, SshTarget, WinsetupError};

/// Visual divider around the long-wait notice.
pub const LINE: &str = "*********************************************";

/// Block until `target` accepts an SSH login.
///
/// Transient failures sleep `policy.delay` and try again, up to
/// `policy.max_attempts` attempts in total. A fatal failure stops at once.
///
/// # Errors
///
/// Returns `ConnectionError` on a fatal failure and
/// `TransientConnectionIssue` once the attempts are exhausted.
pub async fn wait_for_ssh(
    probe: &impl SshProbe,
    reporter: &impl ProgressReporter,
    target: &SshTarget,
    policy: &ReadinessPolicy,
) -> Result<()> {
    reporter.step(&format!(
        "Attempting to establish SSH connection to {}",
        target.host
    ));
    reporter.step(LINE);
    reporter.step("This could take several minutes to complete.");
    reporter.step(LINE);

    let mut last_failure = None;
    for attempt in 1..=policy.max_attempts {
        match probe.probe(target, policy.connect_timeout).await {
            Ok(()) => {
                reporter.success(&format!("SSH connection to {} established", target.host));
                return Ok(());
            }
            Err(failure) if failure.is_transient() => {
                reporter.debug(&format!(
                    "attempt {attempt}/{} to {}: {failure}",
                    policy.max_attempts, target.host
                ));
                last_failure = Some(failure);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(failure) => {
                return Err(WinsetupError::ConnectionError {
                    host: target.host.clone(),
                    reason: failure.to_string(),
                }
                .into());
            }
        }
    }

    Err(WinsetupError::TransientConnectionIssue {
        host: target.host.clone(),
        attempts: policy.max_attempts,
        reason: last_failure.map(|f| f.to_string()).unwrap_or_default(),
    }
    .into())
}

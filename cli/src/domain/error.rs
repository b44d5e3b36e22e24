//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Winsetup errors ───────────────────────────────────────────────────────────

/// Fatal conditions of a winsetup run.
///
/// Every variant terminates the whole batch; transient SSH failures never
/// surface here unless the readiness gate ran out of attempts.
#[derive(Debug, Error)]
pub enum WinsetupError {
    #[error("{what} does not exist: {}", path.display())]
    ConfigurationMissing { what: &'static str, path: PathBuf },

    #[error(
        "Systems given do not map to any active resources.\n\nGiven resources  : {}\nActive resources : {}",
        requested.join(", "),
        known.join(", ")
    )]
    NoMatchingResources {
        requested: Vec<String>,
        known: Vec<String>,
    },

    #[error("Resource '{resource}' has neither ssh_key_file nor win_username/win_password")]
    MissingCredentials { resource: String },

    #[error("Resource '{resource}' has neither public_v4 nor ip")]
    MissingAddress { resource: String },

    #[error("Unable to establish SSH connection to {host}: {reason}")]
    ConnectionError { host: String, reason: String },

    #[error("SSH connection to {host} not ready after {attempts} attempts: {reason}")]
    TransientConnectionIssue {
        host: String,
        attempts: u32,
        reason: String,
    },

    #[error("Playbook failed against {host}: {reason}")]
    PlaybookFailed { host: String, reason: String },
}

impl WinsetupError {
    /// Process exit code reported for this error kind.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigurationMissing { .. } => 3,
            Self::NoMatchingResources { .. } => 4,
            Self::MissingCredentials { .. } | Self::MissingAddress { .. } => 5,
            Self::ConnectionError { .. } | Self::TransientConnectionIssue { .. } => 6,
            Self::PlaybookFailed { .. } => 7,
        }
    }
}

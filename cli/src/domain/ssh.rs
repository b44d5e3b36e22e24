//! SSH readiness: failure classification and retry policy.
//!
//! The retry/fatal decision lives here; the infra probe only maps transport
//! errors into [`SshFailure`].

use std::fmt;
use std::time::Duration;

use crate::domain::credentials::SshIdentity;

/// Default SSH port.
pub const SSH_PORT: u16 = 22;

/// Failure messages that mean "not ready yet" when only text is available,
/// with the failure each one classifies as. Matched lowercase, first hit wins.
pub const SSH_IGNORE_ERROR: &[(&str, SshFailure)] = &[
    ("time out", SshFailure::Timeout),
    ("timed out", SshFailure::Timeout),
    ("unable to connect to port", SshFailure::PortUnreachable),
    ("authentication failed", SshFailure::AuthenticationFailed),
    ("connection reset by peer", SshFailure::ConnectionReset),
];

/// Why an SSH connection attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshFailure {
    Timeout,
    PortUnreachable,
    AuthenticationFailed,
    ConnectionReset,
    Fatal(String),
}

impl SshFailure {
    /// Whether the readiness gate should try again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Fatal(_))
    }

    /// Classify a failure that only carries a message.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        SSH_IGNORE_ERROR
            .iter()
            .find(|(needle, _)| lower.contains(needle))
            .map_or_else(|| Self::Fatal(message.to_string()), |(_, failure)| failure.clone())
    }
}

impl fmt::Display for SshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("connection timed out"),
            Self::PortUnreachable => f.write_str("unable to connect to SSH port"),
            Self::AuthenticationFailed => f.write_str("authentication failed"),
            Self::ConnectionReset => f.write_str("connection reset by peer"),
            Self::Fatal(reason) => f.write_str(reason),
        }
    }
}

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub identity: SshIdentity,
}

/// Bounds of the readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 180,
            delay: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

//! Tuning knobs read from `paws.yaml`.
//!
//! Pure types only — no I/O, no async, no filesystem access.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ssh::{ReadinessPolicy, SSH_PORT};

// ── Constants ────────────────────────────────────────────────────────────────

/// Name of the optional settings file inside the userdir.
pub const CONFIG_FILE: &str = "paws.yaml";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level settings. Every field has a default, so an empty or missing
/// file yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PawsConfig {
    pub readiness: ReadinessConfig,
    pub ansible: AnsibleConfig,
}

/// Readiness gate settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReadinessConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
    pub connect_timeout_secs: u64,
    pub port: u16,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        let policy = ReadinessPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            delay_secs: policy.delay.as_secs(),
            connect_timeout_secs: policy.connect_timeout.as_secs(),
            port: SSH_PORT,
        }
    }
}

impl ReadinessConfig {
    /// Convert to the gate's policy. Zero attempts is raised to one.
    #[must_use]
    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: Duration::from_secs(self.delay_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// `ansible-playbook` invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnsibleConfig {
    pub playbook_bin: String,
    pub timeout_secs: u64,
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        Self {
            playbook_bin: "ansible-playbook".to_string(),
            timeout_secs: 3600,
        }
    }
}

impl AnsibleConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

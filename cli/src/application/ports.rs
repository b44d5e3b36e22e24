//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{PawsConfig, PlaybookReport, PlaybookVars, SshFailure, SshTarget};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout, the child process must be killed (not
    /// left orphaned).
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Injected log sink for application services. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a diagnostic message, hidden unless verbose.
    fn debug(&self, _message: &str) {}
}

// ── SSH Port ──────────────────────────────────────────────────────────────────

/// One SSH connection attempt: connect, handshake, authenticate, disconnect.
#[allow(async_fn_in_trait)]
pub trait SshProbe {
    /// Try to log in to `target`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when the login does not succeed.
    async fn probe(
        &self,
        target: &SshTarget,
        connect_timeout: std::time::Duration,
    ) -> std::result::Result<(), SshFailure>;
}

// ── Playbook Runner Port ──────────────────────────────────────────────────────

/// Executes a generated playbook against an inventory.
#[allow(async_fn_in_trait)]
pub trait PlaybookRunner {
    /// Run `playbook` with `vars` as extra vars and return the parsed recap.
    ///
    /// # Errors
    ///
    /// Returns an error if the runner cannot be spawned, exits non-zero, or
    /// reports failed/unreachable hosts.
    async fn run_playbook(
        &self,
        playbook: &Path,
        inventory: &Path,
        vars: &PlaybookVars,
    ) -> Result<PlaybookReport>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts raw filesystem operations on the userdir.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn write(&self, path: &Path, content: String) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads the optional `paws.yaml` settings.
pub trait ConfigStore {
    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<PawsConfig>;
    /// Path the settings are read from.
    fn path(&self) -> PathBuf;
}

//! Application service — generated files under the userdir.
//!
//! Writes the Ansible inventory and the PowerShell playbook. All I/O goes
//! through the injected `LocalFs` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::inventory::render_inventory;
use crate::domain::playbook::render_playbook;
use crate::domain::{SshTarget, VarsSource};

/// Classify `--powershell-vars` against the userdir on disk.
pub fn classify_vars(local_fs: &impl LocalFs, userdir: &Path, value: Option<&str>) -> VarsSource {
    VarsSource::classify(userdir, value, |p| local_fs.is_file(p))
}

/// Write the playbook for `vars` to `path`, replacing any previous one.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_playbook(local_fs: &impl LocalFs, path: &Path, vars: &VarsSource) -> Result<()> {
    let content = render_playbook(vars)?;
    local_fs
        .write(path, content)
        .with_context(|| format!("writing playbook {}", path.display()))
}

/// Write the inventory for `targets` to `path`.
///
/// The file may hold passwords and is created with mode 0600.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written or its
/// mode set.
pub fn write_inventory(local_fs: &impl LocalFs, path: &Path, targets: &[SshTarget]) -> Result<()> {
    local_fs
        .write(path, render_inventory(targets)?)
        .with_context(|| format!("writing inventory {}", path.display()))?;
    local_fs.set_permissions(path, 0o600)
}

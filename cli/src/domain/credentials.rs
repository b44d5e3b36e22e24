//! SSH identity resolution for topology resources.

use std::path::PathBuf;

use crate::domain::error::WinsetupError;
use crate::domain::topology::Resource;

/// Default account used with key-based authentication.
pub const ADMIN: &str = "Admin";

/// How a resource authenticates over SSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Private key file, as given in the topology.
    Key { file: PathBuf },
    /// Username and password pair.
    Password { password: String },
}

/// Resolved login for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshIdentity {
    pub username: String,
    pub auth: AuthMode,
}

impl SshIdentity {
    /// Password for password-based auth, `None` for key auth.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        match &self.auth {
            AuthMode::Password { password } => Some(password),
            AuthMode::Key { .. } => None,
        }
    }

    /// Key file for key-based auth, `None` for password auth.
    #[must_use]
    pub fn key_file(&self) -> Option<&std::path::Path> {
        match &self.auth {
            AuthMode::Key { file } => Some(file),
            AuthMode::Password { .. } => None,
        }
    }
}

/// Pick the SSH identity for `resource`.
///
/// `ssh_key_file` takes precedence and always logs in as [`ADMIN`]. Without
/// it, both `win_username` and `win_password` must be present.
///
/// # Errors
///
/// Returns `MissingCredentials` when neither mode is available.
pub fn resolve_identity(resource: &Resource) -> Result<SshIdentity, WinsetupError> {
    if let Some(file) = &resource.ssh_key_file {
        return Ok(SshIdentity {
            username: ADMIN.to_string(),
            auth: AuthMode::Key {
                file: PathBuf::from(file),
            },
        });
    }

    match (&resource.win_username, &resource.win_password) {
        (Some(username), Some(password)) => Ok(SshIdentity {
            username: username.clone(),
            auth: AuthMode::Password {
                password: password.clone(),
            },
        }),
        _ => Err(WinsetupError::MissingCredentials {
            resource: resource.name.clone(),
        }),
    }
}

//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credentials;
pub mod error;
pub mod inventory;
pub mod playbook;
pub mod report;
pub mod ssh;
pub mod topology;

pub use config::PawsConfig;
pub use credentials::{ADMIN, AuthMode, SshIdentity, resolve_identity};
pub use error::WinsetupError;
pub use playbook::{PlaybookVars, VarsSource};
pub use report::{HostRecap, PlaybookReport};
pub use ssh::{ReadinessPolicy, SshFailure, SshTarget};
pub use topology::{Resource, Topology, select_systems};

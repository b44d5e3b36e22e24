//! Topology records and system selection.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::error::WinsetupError;

/// A topology document: the ordered list of provisioned resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// One provisioned machine.
///
/// Provider-specific keys (`image`, `flavor`, `count`, ...) are kept in
/// `extra` and otherwise ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub public_v4: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub ssh_key_file: Option<String>,
    #[serde(default)]
    pub win_username: Option<String>,
    #[serde(default)]
    pub win_password: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Resource {
    /// Address used to reach the resource. `public_v4` wins over `ip`.
    ///
    /// # Errors
    ///
    /// Returns `MissingAddress` when neither field is set.
    pub fn address(&self) -> Result<&str, WinsetupError> {
        self.public_v4
            .as_deref()
            .or(self.ip.as_deref())
            .ok_or_else(|| WinsetupError::MissingAddress {
                resource: self.name.clone(),
            })
    }
}

impl Topology {
    /// Parse a topology document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a resource has no `name`.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("cannot parse topology")
    }

    /// Names of every resource, in topology order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.name.clone()).collect()
    }
}

/// Select the resources a run acts on.
///
/// `requested` of `None` (or an empty list) selects every resource. Otherwise
/// the result keeps topology order and contains only requested names.
///
/// # Errors
///
/// Returns `NoMatchingResources` when the selection is empty.
pub fn select_systems(
    topology: &Topology,
    requested: Option<&[String]>,
) -> Result<Vec<Resource>, WinsetupError> {
    let selected: Vec<Resource> = match requested {
        Some(names) if !names.is_empty() => topology
            .resources
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect(),
        _ => topology.resources.clone(),
    };

    if selected.is_empty() {
        return Err(WinsetupError::NoMatchingResources {
            requested: requested.map(<[String]>::to_vec).unwrap_or_default(),
            known: topology.names(),
        });
    }
    Ok(selected)
}

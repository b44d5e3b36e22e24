//! Ansible inventory rendering.
//!
//! The inventory is YAML. Credentials and paths are tagged `!unsafe` so
//! Ansible never templates them, and YAML quoting carries `#`, `\` and
//! quotes through untouched.

use anyhow::{Context, Result};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::domain::credentials::AuthMode;
use crate::domain::ssh::SshTarget;

/// File name of the generated inventory inside the userdir.
pub const ANSIBLE_INVENTORY_FILENAME: &str = "hosts";

/// Inventory group every Windows resource lands in.
pub const INVENTORY_GROUP: &str = "windows";

const UNSAFE_TAG: &str = "unsafe";

/// A string Ansible passes through verbatim.
fn unsafe_str(value: &str) -> Value {
    Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(UNSAFE_TAG),
        value: Value::String(value.to_string()),
    }))
}

fn host_vars(target: &SshTarget) -> Mapping {
    let mut vars = Mapping::new();
    vars.insert("ansible_port".into(), Value::Number(target.port.into()));
    vars.insert(
        "ansible_user".into(),
        unsafe_str(&target.identity.username),
    );
    match &target.identity.auth {
        AuthMode::Key { file } => {
            vars.insert(
                "ansible_ssh_private_key_file".into(),
                unsafe_str(&file.display().to_string()),
            );
        }
        AuthMode::Password { password } => {
            vars.insert("ansible_password".into(), unsafe_str(password));
        }
    }
    vars
}

fn group_vars() -> Mapping {
    let mut vars = Mapping::new();
    vars.insert("ansible_connection".into(), "ssh".into());
    vars.insert("ansible_shell_type".into(), "powershell".into());
    vars.insert(
        "ansible_ssh_common_args".into(),
        "-o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null".into(),
    );
    vars
}

/// Render a YAML inventory with one host entry per target, in order.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_inventory(targets: &[SshTarget]) -> Result<String> {
    let mut hosts = Mapping::new();
    for target in targets {
        hosts.insert(
            Value::String(target.host.clone()),
            Value::Mapping(host_vars(target)),
        );
    }

    let mut group = Mapping::new();
    group.insert("hosts".into(), Value::Mapping(hosts));
    group.insert("vars".into(), Value::Mapping(group_vars()));

    let mut inventory = Mapping::new();
    inventory.insert(INVENTORY_GROUP.into(), Value::Mapping(group));

    serde_yaml::to_string(&inventory).context("cannot render inventory")
}

//! Generated PowerShell playbook: variable sources, extra vars and rendering.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// File name of the generated playbook inside the userdir.
pub const WIN_EXEC_YAML: &str = ".powershell_exec.yaml";

/// Where the PowerShell script arguments come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarsSource {
    /// Arguments are the contents of a file under the userdir.
    File(PathBuf),
    /// Arguments are passed as literal text.
    Inline(String),
    /// Script runs without arguments.
    None,
}

impl VarsSource {
    /// Classify the configured `--powershell-vars` value.
    ///
    /// `is_file` is asked about `<userdir>/<value>`; a hit selects file mode,
    /// any other present value (including the empty string) is inline text.
    pub fn classify(userdir: &Path, value: Option<&str>, is_file: impl Fn(&Path) -> bool) -> Self {
        let Some(value) = value else {
            return Self::None;
        };
        let candidate = userdir.join(value);
        if is_file(&candidate) {
            Self::File(candidate)
        } else {
            Self::Inline(value.to_string())
        }
    }

    /// Value passed to the playbook as `psv`.
    #[must_use]
    pub fn as_extra_var(&self) -> Option<String> {
        match self {
            Self::File(path) => Some(path.display().to_string()),
            Self::Inline(text) => Some(text.clone()),
            Self::None => None,
        }
    }
}

/// Extra vars handed to `ansible-playbook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybookVars {
    pub hosts: String,
    pub ps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psv: Option<String>,
}

impl PlaybookVars {
    #[must_use]
    pub fn new(host: &str, script: &Path, vars: &VarsSource) -> Self {
        Self {
            hosts: host.to_string(),
            ps: script.display().to_string(),
            psv: vars.as_extra_var(),
        }
    }

    /// Serialize for `--extra-vars`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("cannot serialize playbook vars")
    }
}

#[derive(Serialize)]
struct Play {
    name: &'static str,
    hosts: &'static str,
    gather_facts: bool,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct Task {
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    register: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<DebugArgs>,
}

#[derive(Serialize)]
struct DebugArgs {
    var: &'static str,
}

fn script_line(vars: &VarsSource) -> &'static str {
    match vars {
        VarsSource::File(_) => "{{ ps }} {{ lookup('file', psv) }}",
        VarsSource::Inline(_) => "{{ ps }} {{ psv }}",
        VarsSource::None => "{{ ps }}",
    }
}

/// Render the playbook that runs the PowerShell script on `{{ hosts }}`.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_playbook(vars: &VarsSource) -> Result<String> {
    let play = Play {
        name: "Run PowerShell script on Windows resources",
        hosts: "{{ hosts }}",
        gather_facts: false,
        tasks: vec![
            Task {
                name: "Run PowerShell script",
                script: Some(script_line(vars).to_string()),
                register: Some("ps_result"),
                debug: None,
            },
            Task {
                name: "PowerShell script output",
                script: None,
                register: None,
                debug: Some(DebugArgs {
                    var: "ps_result.stdout_lines",
                }),
            },
        ],
    };
    serde_yaml::to_string(&vec![play]).context("cannot render playbook")
}

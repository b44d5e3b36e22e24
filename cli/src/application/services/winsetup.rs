//! Application service — winsetup use-case.
//!
//! Runs a PowerShell script on every selected topology resource: select
//! systems, resolve credentials, write the playbook, wait for SSH, run the
//! playbook. Resources are handled one at a time in topology order and the
//! first fatal error aborts the batch.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, PlaybookRunner, ProgressReporter, SshProbe};
use crate::application::services::materialize::{classify_vars, write_inventory, write_playbook};
use crate::application::services::readiness::wait_for_ssh;
use crate::domain::inventory::ANSIBLE_INVENTORY_FILENAME;
use crate::domain::playbook::WIN_EXEC_YAML;
use crate::domain::report::split_elapsed;
use crate::domain::{
    PlaybookReport, PlaybookVars, ReadinessPolicy, Resource, SshTarget, Topology, WinsetupError,
    resolve_identity, select_systems,
};

/// Topology written by a previous paws provision run. Overrides `--topology`.
pub const RESOURCES_PAWS: &str = "resources.paws";

/// Inputs of one winsetup run.
pub struct WinsetupOptions<'a> {
    pub userdir: &'a Path,
    /// Topology file, relative to `userdir` unless absolute.
    pub topology: &'a Path,
    /// PowerShell script, relative to `userdir` unless absolute.
    pub script: &'a Path,
    pub script_vars: Option<&'a str>,
    pub systems: Option<&'a [String]>,
    /// Keep generated files after the run.
    pub keep_generated: bool,
    pub readiness: ReadinessPolicy,
    pub ssh_port: u16,
}

/// Resolved locations of every file a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub topology: PathBuf,
    pub resources_paws: PathBuf,
    pub script: PathBuf,
    pub playbook: PathBuf,
    pub inventory: PathBuf,
}

impl RunPaths {
    #[must_use]
    pub fn new(userdir: &Path, topology: &Path, script: &Path) -> Self {
        Self {
            topology: userdir.join(topology),
            resources_paws: userdir.join(RESOURCES_PAWS),
            script: userdir.join(script),
            playbook: userdir.join(WIN_EXEC_YAML),
            inventory: userdir.join(ANSIBLE_INVENTORY_FILENAME),
        }
    }
}

/// Result for one processed resource.
#[derive(Debug, Clone)]
pub struct HostOutcome {
    pub name: String,
    pub host: String,
    pub report: PlaybookReport,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct WinsetupReport {
    pub hosts: Vec<HostOutcome>,
    pub elapsed: Duration,
    /// Generated files left on disk (only when `keep_generated`).
    pub kept_files: Vec<PathBuf>,
}

/// Run winsetup against the selected resources.
///
/// # Errors
///
/// Returns an error (usually a [`WinsetupError`]) on the first fatal
/// condition: missing topology or script, empty selection, unusable
/// credentials, SSH gate failure, or a failed playbook.
pub async fn run_winsetup(
    local_fs: &impl LocalFs,
    probe: &impl SshProbe,
    runner: &impl PlaybookRunner,
    reporter: &impl ProgressReporter,
    opts: WinsetupOptions<'_>,
) -> Result<WinsetupReport> {
    let paths = RunPaths::new(opts.userdir, opts.topology, opts.script);
    let topology_path = pre_tasks(local_fs, reporter, &paths)?;

    reporter.step("START: Winsetup");
    let started = Instant::now();

    let resources = get_systems(local_fs, reporter, &topology_path, opts.systems)?;
    let targets = resources
        .iter()
        .map(|r| build_target(r, opts.ssh_port))
        .collect::<Result<Vec<_>, _>>()?;
    write_inventory(local_fs, &paths.inventory, &targets)?;
    reporter.debug(&format!("inventory written to {}", paths.inventory.display()));

    let mut cleanup = vec![paths.playbook.clone()];
    let mut hosts = Vec::with_capacity(targets.len());

    for (resource, target) in resources.iter().zip(&targets) {
        let vars_source = classify_vars(local_fs, opts.userdir, opts.script_vars);
        let vars = PlaybookVars::new(&target.host, &paths.script, &vars_source);
        write_playbook(local_fs, &paths.playbook, &vars_source)?;
        reporter.debug(&format!(
            "playbook for {} written to {} ({vars_source:?})",
            resource.name,
            paths.playbook.display()
        ));

        wait_for_ssh(probe, reporter, target, &opts.readiness).await?;

        reporter.step(&format!(
            "Running {} on {} ({})",
            paths.script.display(),
            resource.name,
            target.host
        ));
        let report = runner
            .run_playbook(&paths.playbook, &paths.inventory, &vars)
            .await?;
        reporter.success(&format!("{} configured", resource.name));
        hosts.push(HostOutcome {
            name: resource.name.clone(),
            host: target.host.clone(),
            report,
        });
    }

    let kept_files = post_tasks(local_fs, reporter, &mut cleanup, opts.keep_generated)?;
    let elapsed = started.elapsed();
    let (h, m, s) = split_elapsed(elapsed);
    reporter.success(&format!("END: Winsetup, TIME: {h}h:{m}m:{s}s"));

    Ok(WinsetupReport {
        hosts,
        elapsed,
        kept_files,
    })
}

/// Clear stale output, pick the topology file and check the script exists.
fn pre_tasks(
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    paths: &RunPaths,
) -> Result<PathBuf> {
    if local_fs.exists(&paths.playbook) {
        local_fs.remove_file(&paths.playbook)?;
    }

    let topology = if local_fs.exists(&paths.resources_paws) {
        reporter.debug(&format!(
            "using paws generated topology {}",
            paths.resources_paws.display()
        ));
        paths.resources_paws.clone()
    } else {
        paths.topology.clone()
    };

    if !local_fs.exists(&topology) {
        return Err(WinsetupError::ConfigurationMissing {
            what: "Topology file",
            path: topology,
        }
        .into());
    }
    if !local_fs.exists(&paths.script) {
        return Err(WinsetupError::ConfigurationMissing {
            what: "PowerShell script",
            path: paths.script.clone(),
        }
        .into());
    }
    Ok(topology)
}

/// Load the topology and narrow it to the requested systems.
fn get_systems(
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    topology_path: &Path,
    systems: Option<&[String]>,
) -> Result<Vec<Resource>> {
    let content = local_fs.read_to_string(topology_path)?;
    let topology = Topology::from_yaml(&content)
        .with_context(|| format!("loading {}", topology_path.display()))?;
    let selected = select_systems(&topology, systems)?;

    let known = topology.names();
    for name in systems.unwrap_or_default() {
        if !known.contains(name) {
            reporter.warn(&format!("System '{name}' is not an active resource, skipping"));
        }
    }
    Ok(selected)
}

fn build_target(resource: &Resource, port: u16) -> Result<SshTarget, WinsetupError> {
    Ok(SshTarget {
        host: resource.address()?.to_string(),
        port,
        identity: resolve_identity(resource)?,
    })
}

/// Remove generated files unless asked to keep them. Returns what was kept.
fn post_tasks(
    local_fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    cleanup: &mut Vec<PathBuf>,
    keep_generated: bool,
) -> Result<Vec<PathBuf>> {
    if keep_generated {
        return Ok(std::mem::take(cleanup));
    }
    for path in cleanup.drain(..) {
        if local_fs.exists(&path) {
            local_fs.remove_file(&path)?;
            reporter.debug(&format!("removed {}", path.display()));
        }
    }
    Ok(Vec::new())
}

//! `paws winsetup` — run a PowerShell script on Windows resources.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::{AppContext, OutputMode};
use crate::application::ports::ConfigStore;
use crate::application::services::winsetup::{WinsetupOptions, WinsetupReport, run_winsetup};
use crate::infra::ansible::AnsiblePlaybook;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::{LocalFs, default_userdir};
use crate::infra::ssh::Ssh2Probe;
use crate::output::{LogReporter, OutputContext};

/// Arguments for the winsetup command.
#[derive(Args, Debug)]
pub struct WinsetupArgs {
    /// Directory holding the topology, scripts and generated files [default: ~/paws]
    #[arg(long, env = "PAWS_USERDIR")]
    pub userdir: Option<PathBuf>,

    /// Topology file, relative to the userdir
    #[arg(short, long, default_value = "resources.yaml")]
    pub topology: PathBuf,

    /// Credentials file, relative to the userdir
    #[arg(short, long, default_value = "credentials.yaml")]
    pub credentials: PathBuf,

    /// PowerShell script to run, relative to the userdir
    #[arg(short = 'p', long)]
    pub powershell: PathBuf,

    /// Script arguments, or a file in the userdir holding them
    #[arg(long, visible_alias = "psv")]
    pub powershell_vars: Option<String>,

    /// Only act on these systems (repeatable, comma separated)
    #[arg(short, long = "system", value_delimiter = ',')]
    pub systems: Vec<String>,
}

/// Run the winsetup command.
///
/// # Errors
///
/// Returns the first fatal error of the run; see `run_winsetup`.
pub async fn run(app: &AppContext, args: &WinsetupArgs) -> Result<()> {
    let userdir = match &args.userdir {
        Some(dir) => dir.clone(),
        None => default_userdir()?,
    };
    let config = YamlConfigStore::new(&userdir).load()?;
    tracing::debug!(
        userdir = %userdir.display(),
        credentials = %args.credentials.display(),
        "winsetup inputs"
    );

    let runner = AnsiblePlaybook::new(
        TokioCommandRunner::new(config.ansible.timeout()),
        config.ansible.playbook_bin.clone(),
    );
    let systems = (!args.systems.is_empty()).then_some(args.systems.as_slice());

    let report = run_winsetup(
        &LocalFs,
        &Ssh2Probe,
        &runner,
        &LogReporter,
        WinsetupOptions {
            userdir: &userdir,
            topology: &args.topology,
            script: &args.powershell,
            script_vars: args.powershell_vars.as_deref(),
            systems,
            keep_generated: app.verbose,
            readiness: config.readiness.policy(),
            ssh_port: config.readiness.port,
        },
    )
    .await?;

    match app.mode {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Human => print_summary(&app.output, &report),
    }
    Ok(())
}

fn print_summary(ctx: &OutputContext, report: &WinsetupReport) {
    ctx.header("Winsetup summary");
    for outcome in &report.hosts {
        let recap = outcome
            .report
            .recaps
            .iter()
            .map(|r| {
                format!(
                    "ok={} changed={} unreachable={} failed={}",
                    r.ok, r.changed, r.unreachable, r.failed
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        let detail = if recap.is_empty() {
            format!("{} (no recap)", outcome.host)
        } else {
            format!("{}  {recap}", outcome.host)
        };
        ctx.kv(&outcome.name, &detail);
    }
    for path in &report.kept_files {
        ctx.warn(&format!("Kept generated file {}", path.display()));
    }
    ctx.success(&format!(
        "{} system(s) configured in {}s",
        report.hosts.len(),
        report.elapsed.as_secs()
    ));
}

fn print_json(report: &WinsetupReport) -> Result<()> {
    let hosts: Vec<_> = report
        .hosts
        .iter()
        .map(|h| {
            serde_json::json!({
                "name": h.name,
                "host": h.host,
                "recap": h.report.recaps,
            })
        })
        .collect();
    let out = serde_json::json!({
        "hosts": hosts,
        "elapsed_secs": report.elapsed.as_secs(),
        "kept_files": report.kept_files,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

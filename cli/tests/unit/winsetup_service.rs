//! Winsetup service orchestration against in-memory ports.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use paws_cli::application::services::winsetup::{WinsetupOptions, WinsetupReport, run_winsetup};
use paws_cli::domain::WinsetupError;

use crate::mocks::{
    MemoryFs, RecordingReporter, RecordingRunner, ScriptedProbe, fast_policy,
};

const USERDIR: &str = "/home/tester/paws";
const PLAYBOOK: &str = "/home/tester/paws/.powershell_exec.yaml";
const INVENTORY: &str = "/home/tester/paws/hosts";
const SCRIPT: &str = "/home/tester/paws/setup.ps1";
const TOPOLOGY: &str = "/home/tester/paws/resources.yaml";

const TWO_HOSTS: &str = "\
resources:
  - name: A
    public_v4: 10.0.0.1
    ip: 192.168.0.1
    ssh_key_file: /keys/a.pem
  - name: B
    ip: 10.0.0.2
    win_username: u
    win_password: p
";

fn fs_with(topology: &str) -> MemoryFs {
    MemoryFs::with_files(&[(TOPOLOGY, topology), (SCRIPT, "Write-Host hi")])
}

fn options<'a>(systems: Option<&'a [String]>, script_vars: Option<&'a str>) -> WinsetupOptions<'a> {
    WinsetupOptions {
        userdir: Path::new(USERDIR),
        topology: Path::new("resources.yaml"),
        script: Path::new("setup.ps1"),
        script_vars,
        systems,
        keep_generated: false,
        readiness: fast_policy(3),
        ssh_port: 22,
    }
}

async fn run(
    fs: &MemoryFs,
    probe: &ScriptedProbe,
    runner: &RecordingRunner,
    opts: WinsetupOptions<'_>,
) -> anyhow::Result<WinsetupReport> {
    run_winsetup(fs, probe, runner, &RecordingReporter::default(), opts).await
}

/// The `windows.hosts` mapping of the written inventory.
fn inventory_hosts(fs: &MemoryFs) -> serde_yaml::Value {
    let text = fs.content(INVENTORY).expect("inventory written");
    let inventory: serde_yaml::Value = serde_yaml::from_str(&text).expect("inventory is YAML");
    inventory["windows"]["hosts"].clone()
}

/// String inside an `!unsafe`-tagged inventory value.
fn tagged_str(value: &serde_yaml::Value) -> &str {
    let serde_yaml::Value::Tagged(tagged) = value else {
        panic!("expected tagged value, got {value:?}");
    };
    assert!(tagged.tag == "unsafe", "tag was {}", tagged.tag);
    tagged.value.as_str().expect("string")
}

fn winsetup_error(err: anyhow::Error) -> WinsetupError {
    err.downcast::<WinsetupError>().expect("WinsetupError")
}

#[tokio::test]
async fn test_filter_runs_only_selected_password_host() {
    let fs = fs_with(TWO_HOSTS);
    let probe = ScriptedProbe::default();
    let runner = RecordingRunner::default();
    let systems = vec!["B".to_string()];

    let report = run(&fs, &probe, &runner, options(Some(systems.as_slice()), None))
        .await
        .expect("run should succeed");

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].vars.hosts, "10.0.0.2");
    assert_eq!(calls[0].vars.ps, SCRIPT);
    assert_eq!(calls[0].vars.psv, None);
    assert_eq!(calls[0].playbook, PathBuf::from(PLAYBOOK));
    assert_eq!(calls[0].inventory, PathBuf::from(INVENTORY));

    let targets = probe.targets.borrow();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].identity.username, "u");
    assert_eq!(targets[0].identity.password(), Some("p"));
    assert_eq!(targets[0].identity.key_file(), None);

    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts[0].name, "B");
    assert_eq!(report.hosts[0].host, "10.0.0.2");
}

#[tokio::test]
async fn test_inventory_holds_selected_hosts_only() {
    let fs = fs_with(TWO_HOSTS);
    let systems = vec!["B".to_string()];

    run(
        &fs,
        &ScriptedProbe::default(),
        &RecordingRunner::default(),
        options(Some(systems.as_slice()), None),
    )
    .await
    .expect("run should succeed");

    let hosts = inventory_hosts(&fs);
    let host = &hosts["10.0.0.2"];
    assert_eq!(host["ansible_port"].as_u64(), Some(22));
    assert_eq!(tagged_str(&host["ansible_user"]), "u");
    assert_eq!(tagged_str(&host["ansible_password"]), "p");
    assert!(hosts.get("10.0.0.1").is_none());
    assert_eq!(fs.mode(INVENTORY), Some(0o600));
}

#[tokio::test]
async fn test_inventory_carries_password_with_special_characters_verbatim() {
    let topology = r#"
resources:
  - name: B
    ip: 10.0.0.2
    win_username: 'DOM\ops#1'
    win_password: 'Pa#ss\w0rd{{ x }}'
"#;
    let fs = fs_with(topology);
    let probe = ScriptedProbe::default();

    run(&fs, &probe, &RecordingRunner::default(), options(None, None))
        .await
        .expect("run should succeed");

    let password = probe.targets.borrow()[0]
        .identity
        .password()
        .expect("password auth")
        .to_string();
    assert_eq!(password, r"Pa#ss\w0rd{{ x }}");

    let hosts = inventory_hosts(&fs);
    let host = &hosts["10.0.0.2"];
    assert_eq!(tagged_str(&host["ansible_password"]), password);
    assert_eq!(tagged_str(&host["ansible_user"]), r"DOM\ops#1");
}

#[tokio::test]
async fn test_no_filter_runs_every_resource_in_topology_order() {
    let fs = fs_with(TWO_HOSTS);
    let probe = ScriptedProbe::default();
    let runner = RecordingRunner::default();

    run(&fs, &probe, &runner, options(None, None))
        .await
        .expect("run should succeed");

    let hosts: Vec<_> = runner
        .calls
        .borrow()
        .iter()
        .map(|c| c.vars.hosts.clone())
        .collect();
    assert_eq!(hosts, ["10.0.0.1", "10.0.0.2"]);

    let targets = probe.targets.borrow();
    assert_eq!(targets[0].identity.username, "Admin");
    assert_eq!(targets[0].identity.key_file(), Some(Path::new("/keys/a.pem")));
}

#[tokio::test]
async fn test_generated_playbook_removed_after_run() {
    let fs = fs_with(TWO_HOSTS);

    let report = run(
        &fs,
        &ScriptedProbe::default(),
        &RecordingRunner::default(),
        options(None, None),
    )
    .await
    .expect("run should succeed");

    assert!(fs.content(PLAYBOOK).is_none());
    assert!(report.kept_files.is_empty());
}

#[tokio::test]
async fn test_keep_generated_leaves_fresh_playbook() {
    let fs = MemoryFs::with_files(&[
        (TOPOLOGY, TWO_HOSTS),
        (SCRIPT, "Write-Host hi"),
        (PLAYBOOK, "stale"),
    ]);
    let opts = WinsetupOptions {
        keep_generated: true,
        ..options(None, None)
    };

    let report = run(&fs, &ScriptedProbe::default(), &RecordingRunner::default(), opts)
        .await
        .expect("run should succeed");

    let playbook = fs.content(PLAYBOOK).expect("playbook kept");
    assert_ne!(playbook, "stale");
    assert!(playbook.contains("Run PowerShell script"));
    assert_eq!(report.kept_files, [PathBuf::from(PLAYBOOK)]);
}

#[tokio::test]
async fn test_vars_file_in_userdir_is_passed_by_path() {
    let fs = MemoryFs::with_files(&[
        (TOPOLOGY, TWO_HOSTS),
        (SCRIPT, "Write-Host hi"),
        ("/home/tester/paws/vars.txt", "-Name demo"),
    ]);
    let runner = RecordingRunner::default();
    let opts = WinsetupOptions {
        keep_generated: true,
        ..options(None, Some("vars.txt"))
    };

    run(&fs, &ScriptedProbe::default(), &runner, opts)
        .await
        .expect("run should succeed");

    let calls = runner.calls.borrow();
    assert_eq!(calls[0].vars.psv.as_deref(), Some("/home/tester/paws/vars.txt"));
    let playbook = fs.content(PLAYBOOK).expect("playbook kept");
    assert!(playbook.contains("lookup("));
}

#[tokio::test]
async fn test_inline_vars_are_passed_verbatim() {
    let fs = fs_with(TWO_HOSTS);
    let runner = RecordingRunner::default();

    run(&fs, &ScriptedProbe::default(), &runner, options(None, Some("-Name demo")))
        .await
        .expect("run should succeed");

    assert!(
        runner
            .calls
            .borrow()
            .iter()
            .all(|c| c.vars.psv.as_deref() == Some("-Name demo"))
    );
}

#[tokio::test]
async fn test_resources_paws_overrides_topology_file() {
    let fs = MemoryFs::with_files(&[
        (TOPOLOGY, TWO_HOSTS),
        (SCRIPT, "Write-Host hi"),
        (
            "/home/tester/paws/resources.paws",
            "resources:\n  - name: C\n    public_v4: 10.9.9.9\n    ssh_key_file: /keys/c.pem\n",
        ),
    ]);
    let runner = RecordingRunner::default();

    run(&fs, &ScriptedProbe::default(), &runner, options(None, None))
        .await
        .expect("run should succeed");

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].vars.hosts, "10.9.9.9");
}

#[tokio::test]
async fn test_missing_script_is_configuration_missing() {
    let fs = MemoryFs::with_files(&[(TOPOLOGY, TWO_HOSTS)]);
    let runner = RecordingRunner::default();

    let err = run(&fs, &ScriptedProbe::default(), &runner, options(None, None))
        .await
        .expect_err("missing script must fail");

    let err = winsetup_error(err);
    assert!(matches!(
        err,
        WinsetupError::ConfigurationMissing { ref path, .. } if path == Path::new(SCRIPT)
    ));
    assert_eq!(err.exit_code(), 3);
    assert!(runner.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_missing_topology_is_configuration_missing() {
    let fs = MemoryFs::with_files(&[(SCRIPT, "Write-Host hi")]);

    let err = run(
        &fs,
        &ScriptedProbe::default(),
        &RecordingRunner::default(),
        options(None, None),
    )
    .await
    .expect_err("missing topology must fail");

    assert!(matches!(
        winsetup_error(err),
        WinsetupError::ConfigurationMissing { what: "Topology file", .. }
    ));
}

#[tokio::test]
async fn test_unknown_systems_are_no_matching_resources() {
    let fs = fs_with(TWO_HOSTS);
    let probe = ScriptedProbe::default();
    let systems = vec!["Z".to_string()];

    let err = run(&fs, &probe, &RecordingRunner::default(), options(Some(systems.as_slice()), None))
        .await
        .expect_err("no match must fail");

    let err = winsetup_error(err);
    assert!(matches!(err, WinsetupError::NoMatchingResources { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn test_partially_unknown_systems_warn_and_continue() {
    let fs = fs_with(TWO_HOSTS);
    let reporter = RecordingReporter::default();
    let runner = RecordingRunner::default();
    let systems = vec!["B".to_string(), "Z".to_string()];

    run_winsetup(
        &fs,
        &ScriptedProbe::default(),
        &runner,
        &reporter,
        options(Some(systems.as_slice()), None),
    )
    .await
    .expect("run should succeed");

    assert_eq!(runner.calls.borrow().len(), 1);
    let warnings = reporter.at("warn");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'Z'"));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_connection() {
    let topology = "\
resources:
  - name: A
    public_v4: 10.0.0.1
    ssh_key_file: /keys/a.pem
  - name: B
    ip: 10.0.0.2
    win_username: u
";
    let fs = fs_with(topology);
    let probe = ScriptedProbe::default();

    let err = run(&fs, &probe, &RecordingRunner::default(), options(None, None))
        .await
        .expect_err("missing password must fail");

    assert!(matches!(
        winsetup_error(err),
        WinsetupError::MissingCredentials { ref resource } if resource == "B"
    ));
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn test_resource_without_address_is_rejected() {
    let fs = fs_with("resources:\n  - name: A\n    ssh_key_file: /keys/a.pem\n");

    let err = run(
        &fs,
        &ScriptedProbe::default(),
        &RecordingRunner::default(),
        options(None, None),
    )
    .await
    .expect_err("missing address must fail");

    assert!(matches!(
        winsetup_error(err),
        WinsetupError::MissingAddress { .. }
    ));
}

#[tokio::test]
async fn test_fatal_ssh_failure_stops_before_playbook() {
    let fs = fs_with(TWO_HOSTS);
    let probe = ScriptedProbe::failing(
        paws_cli::domain::SshFailure::Fatal("no route".to_string()),
        1,
    );
    let runner = RecordingRunner::default();

    let err = run(&fs, &probe, &runner, options(None, None))
        .await
        .expect_err("fatal ssh failure must abort");

    assert!(matches!(
        winsetup_error(err),
        WinsetupError::ConnectionError { ref host, .. } if host == "10.0.0.1"
    ));
    assert!(runner.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_playbook_failure_aborts_batch() {
    let fs = fs_with(TWO_HOSTS);
    let runner = RecordingRunner::failing("task failed");

    let err = run(&fs, &ScriptedProbe::default(), &runner, options(None, None))
        .await
        .expect_err("playbook failure must abort");

    let err = winsetup_error(err);
    assert!(matches!(err, WinsetupError::PlaybookFailed { .. }));
    assert_eq!(err.exit_code(), 7);
    assert_eq!(runner.calls.borrow().len(), 1);
}

#[tokio::test]
async fn test_run_logs_start_and_elapsed_time() {
    let fs = fs_with(TWO_HOSTS);
    let reporter = RecordingReporter::default();

    run_winsetup(
        &fs,
        &ScriptedProbe::default(),
        &RecordingRunner::default(),
        &reporter,
        options(None, None),
    )
    .await
    .expect("run should succeed");

    assert!(reporter.at("step").iter().any(|m| m == "START: Winsetup"));
    assert!(
        reporter
            .at("success")
            .iter()
            .any(|m| m.starts_with("END: Winsetup, TIME: 0h:0m:"))
    );
}

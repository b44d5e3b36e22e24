//! Playbook results and run timing.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

/// Matches one `PLAY RECAP` line of `ansible-playbook` output.
#[allow(clippy::expect_used)]
static RECAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s*:\s*ok=(\d+)\s+changed=(\d+)\s+unreachable=(\d+)\s+failed=(\d+)")
        .expect("valid regex")
});

/// Per-host counters from the play recap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecap {
    pub host: String,
    pub ok: u32,
    pub changed: u32,
    pub unreachable: u32,
    pub failed: u32,
}

impl HostRecap {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.unreachable == 0 && self.failed == 0
    }
}

/// Structured outcome of one `ansible-playbook` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybookReport {
    pub recaps: Vec<HostRecap>,
}

impl PlaybookReport {
    /// Extract the recap lines from playbook stdout. Lines before the
    /// `PLAY RECAP` banner are ignored.
    #[must_use]
    pub fn parse(stdout: &str) -> Self {
        let recaps = stdout
            .lines()
            .skip_while(|l| !l.starts_with("PLAY RECAP"))
            .filter_map(|line| {
                let caps = RECAP_RE.captures(line.trim())?;
                let num = |i: usize| caps[i].parse::<u32>().ok();
                Some(HostRecap {
                    host: caps[1].to_string(),
                    ok: num(2)?,
                    changed: num(3)?,
                    unreachable: num(4)?,
                    failed: num(5)?,
                })
            })
            .collect();
        Self { recaps }
    }

    /// Hosts that had failed or unreachable tasks.
    #[must_use]
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.recaps
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.host.as_str())
            .collect()
    }
}

/// Split an elapsed duration into whole hours, minutes and seconds.
#[must_use]
pub fn split_elapsed(elapsed: Duration) -> (u64, u64, u64) {
    let secs = elapsed.as_secs();
    (secs / 3600, (secs % 3600) / 60, secs % 60)
}

//! OS process table and process termination, behind a trait so the runner can be
//! driven by a fake in tests.

use crate::error::{Result, ShellError};
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// Access to the processes running on the machine.
pub trait ProcessControl {
    /// All visible processes, sorted by pid.
    fn list(&self) -> Result<Vec<ProcessEntry>>;

    /// Forcefully terminate the process with the given pid.
    fn kill(&self, pid: i32) -> Result<()>;
}

/// [`ProcessControl`] backed by the real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl ProcessControl for SystemProcesses {
    fn list(&self) -> Result<Vec<ProcessEntry>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ShellError::ProcessTable(
                "process listing is not supported on this platform".to_string(),
            ));
        }

        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let mut entries: Vec<ProcessEntry> = sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.pid);
        debug!(count = entries.len(), "read process table");
        Ok(entries)
    }

    #[cfg(unix)]
    fn kill(&self, pid: i32) -> Result<()> {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        debug!(pid, "sending SIGKILL");
        signal::kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(|errno| {
            ShellError::ProcessLookup {
                pid,
                reason: std::io::Error::from_raw_os_error(errno as i32).to_string(),
            }
        })
    }

    #[cfg(not(unix))]
    fn kill(&self, pid: i32) -> Result<()> {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::All, true);
        let target = sysinfo::Pid::from_u32(pid as u32);
        match sys.process(target) {
            Some(process) if process.kill() => Ok(()),
            Some(_) => Err(ShellError::ProcessLookup {
                pid,
                reason: "operation not permitted".to_string(),
            }),
            None => Err(ShellError::ProcessLookup {
                pid,
                reason: "no such process".to_string(),
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_table_contains_self() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }
        let entries = SystemProcesses.list().unwrap();
        let me = std::process::id();
        assert!(entries.iter().any(|entry| entry.pid == me));
        assert!(entries.windows(2).all(|w| w[0].pid <= w[1].pid));
    }

    #[test]
    #[cfg(unix)]
    fn test_kill_spawned_child() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        SystemProcesses.kill(child.id() as i32).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    #[cfg(unix)]
    fn test_kill_missing_pid_is_lookup_error() {
        // Largest pid_t is never handed out on Linux or macOS.
        let err = SystemProcesses.kill(i32::MAX).unwrap_err();
        assert!(matches!(err, ShellError::ProcessLookup { pid: i32::MAX, .. }));
    }
}

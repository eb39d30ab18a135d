//! Queries against the OS process table
//!
//! Each call takes a fresh snapshot; nothing is cached between calls. Processes
//! are matched against a configured application path by executable file name
//! (case-insensitive) or by normalized full path. The launcher's own process and
//! zombies never match.

use crate::launcher::security::{file_name_lowercase, normalize_path};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::path::PathBuf;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System};
use tracing::{debug, info};

/// Snapshot of a single process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    /// Process identifier
    pub process_id: u32,
    /// Process name as reported by the OS
    pub process_name: String,
    /// Full path of the executable image
    pub executable_path: PathBuf,
    /// Local time the process started
    pub start_time: DateTime<Local>,
    /// Resident memory in bytes
    pub memory_usage: u64,
    /// CPU usage in percent since the previous sample (0 on the first sample)
    pub cpu_usage: f32,
}

/// What a configured application path is matched against
struct Target {
    file_name: String,
    full_path: String,
}

impl Target {
    fn new(app_path: &str) -> Option<Self> {
        let file_name = file_name_lowercase(app_path);
        if file_name.is_empty() {
            return None;
        }
        Some(Self {
            file_name,
            full_path: normalize_path(app_path),
        })
    }

    fn matches(&self, process: &Process) -> bool {
        if process.name().to_string_lossy().to_lowercase() == self.file_name {
            return true;
        }
        process
            .exe()
            .is_some_and(|exe| normalize_path(&exe.to_string_lossy()) == self.full_path)
    }
}

fn snapshot() -> System {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All);
    system
}

/// Live processes other than this one that match `app_path`
fn matching_processes<'a>(
    system: &'a System,
    app_path: &str,
) -> impl Iterator<Item = (&'a Pid, &'a Process)> {
    let target = Target::new(app_path);
    let own_pid = std::process::id();

    system.processes().iter().filter(move |(pid, process)| {
        pid.as_u32() != own_pid
            && process.status() != ProcessStatus::Zombie
            && target.as_ref().is_some_and(|t| t.matches(process))
    })
}

/// Check whether any process matches the application path
pub fn is_application_running(app_path: &str) -> bool {
    let system = snapshot();
    let running = matching_processes(&system, app_path).next().is_some();
    debug!("{app_path} running: {running}");
    running
}

/// Ask every matching process to terminate
///
/// Sends a terminate signal where the platform supports one and falls back to a
/// forced kill otherwise. Returns true if at least one process was signalled;
/// processes that refuse the signal are skipped.
pub fn kill_application(app_path: &str) -> bool {
    let system = snapshot();
    let mut signalled = false;

    for (pid, process) in matching_processes(&system, app_path) {
        let sent = process
            .kill_with(Signal::Term)
            .unwrap_or_else(|| process.kill());
        if sent {
            info!("Terminated {} (PID {pid})", process.name().to_string_lossy());
            signalled = true;
        } else {
            debug!("Could not signal PID {pid}, skipping");
        }
    }

    signalled
}

/// Details of a running process
///
/// Returns `None` if the process does not exist, has exited, or its executable
/// path cannot be read.
pub fn get_process_info(process_id: u32) -> Option<ProcessInfo> {
    let pid = Pid::from_u32(process_id);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        ProcessRefreshKind::everything(),
    );

    let process = system.process(pid)?;
    if process.status() == ProcessStatus::Zombie {
        return None;
    }

    let executable_path = process.exe()?.to_path_buf();
    let start_time = Local
        .timestamp_opt(i64::try_from(process.start_time()).ok()?, 0)
        .single()?;

    Some(ProcessInfo {
        process_id,
        process_name: process.name().to_string_lossy().into_owned(),
        executable_path,
        start_time,
        memory_usage: process.memory(),
        cpu_usage: process.cpu_usage(),
    })
}

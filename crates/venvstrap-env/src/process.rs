//! Child process tracking with scoped cleanup.
//!
//! Every child the bootstrapper starts is spawned through [`ProcessRegistry`].
//! On Unix each child leads its own process group, so killing the group also
//! takes down anything the child left running in the background. Registered
//! groups are killed when a [`CleanupGuard`] drops (normal exit) or when the
//! process receives SIGINT / SIGTERM / SIGHUP.

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

/// Exit code used after an interrupt or termination signal.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    pids: Arc<Mutex<Vec<u32>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `cmd` in a new process group and track it.
    pub fn spawn(&self, cmd: &mut Command) -> io::Result<Child> {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd.spawn()?;
        self.register(child.id());
        Ok(child)
    }

    fn register(&self, pid: u32) {
        if let Ok(mut pids) = self.pids.lock() {
            pids.push(pid);
        }
    }

    /// Wait for `child`, then stop tracking it unless its process group still
    /// has members (background jobs it left running). Finished groups are
    /// never signalled later, so a recycled pid cannot be hit at exit.
    pub fn wait(&self, child: &mut Child) -> io::Result<ExitStatus> {
        let status = child.wait()?;
        let pid = child.id();
        if !group_alive(pid) {
            self.forget(pid);
        }
        Ok(status)
    }

    fn forget(&self, pid: u32) {
        if let Ok(mut pids) = self.pids.lock() {
            pids.retain(|p| *p != pid);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> Vec<u32> {
        self.pids.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Kill every tracked process group that is still alive and forget them.
    /// Returns how many groups were actually signalled.
    pub fn kill_all(&self) -> usize {
        let pids = match self.pids.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let mut killed = 0;
        for pid in pids {
            match kill_group(pid) {
                Ok(true) => {
                    tracing::debug!(pid, "Killed leftover child process group");
                    killed += 1;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(pid, error = %e, "Failed to kill child process group"),
            }
        }
        killed
    }

    /// Guard that kills all tracked children when dropped.
    pub fn cleanup_guard(&self) -> CleanupGuard {
        CleanupGuard {
            registry: self.clone(),
        }
    }

    /// Kill tracked children on Ctrl+C, SIGTERM or SIGHUP, then exit with
    /// [`INTERRUPTED_EXIT_CODE`]. May be installed once per process.
    pub fn install_signal_handler(&self) -> Result<()> {
        let registry = self.clone();
        ctrlc::set_handler(move || {
            let killed = registry.kill_all();
            tracing::warn!(killed, "Interrupted, child processes terminated");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        })
        .context("Failed to set interrupt handler")
    }
}

/// Kills all children of its registry on drop.
#[must_use = "children are killed when the guard drops"]
pub struct CleanupGuard {
    registry: ProcessRegistry,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.registry.kill_all();
    }
}

/// Ok(false) when nothing was left running.
#[cfg(unix)]
fn kill_group(pid: u32) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return Ok(false);
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
    }
}

/// Signal 0 to the group: true while any member exists and is ours to kill.
#[cfg(unix)]
fn group_alive(pid: u32) -> bool {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    i32::try_from(pid)
        .map(|raw| killpg(Pid::from_raw(raw), None).is_ok())
        .unwrap_or(false)
}

/// A waited Windows child has no group left to kill.
#[cfg(windows)]
fn group_alive(_pid: u32) -> bool {
    false
}

#[cfg(windows)]
fn kill_group(pid: u32) -> io::Result<bool> {
    let out = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .output()?;
    Ok(out.status.success())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_exit(child: &mut Child) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_kill_all_terminates_running_children() {
        let registry = ProcessRegistry::new();
        let mut child = registry
            .spawn(Command::new("sleep").arg("30"))
            .unwrap();
        assert_eq!(registry.tracked(), vec![child.id()]);

        assert_eq!(registry.kill_all(), 1);
        assert!(wait_for_exit(&mut child));
        assert!(registry.tracked().is_empty());
    }

    /// Zombies count as dead: the container's init may never reap them.
    #[cfg(target_os = "linux")]
    fn alive(pid: i32) -> bool {
        std::fs::read_to_string(format!("/proc/{}/stat", pid))
            .ok()
            .and_then(|stat| {
                let after_comm = stat.rsplit_once(')')?.1;
                after_comm.split_whitespace().next().map(|s| s != "Z")
            })
            .unwrap_or(false)
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_kill_all_reaches_background_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("bg.pid");
        let registry = ProcessRegistry::new();
        // The shell exits right away, leaving a background job in its group.
        let mut leader = registry
            .spawn(Command::new("sh").arg("-c").arg(format!(
                "sleep 30 & echo $! > {}",
                pid_file.display()
            )))
            .unwrap();
        registry.wait(&mut leader).unwrap();
        assert_eq!(registry.tracked(), vec![leader.id()]);

        let bg_pid: i32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(alive(bg_pid));

        assert_eq!(registry.kill_all(), 1);
        let deadline = Instant::now() + Duration::from_secs(5);
        while alive(bg_pid) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(!alive(bg_pid));
    }

    #[test]
    fn test_cleanup_guard_kills_on_drop() {
        let registry = ProcessRegistry::new();
        let mut child = registry
            .spawn(Command::new("sleep").arg("30"))
            .unwrap();
        {
            let _guard = registry.cleanup_guard();
        }
        assert!(wait_for_exit(&mut child));
    }

    #[test]
    fn test_kill_all_ignores_finished_children() {
        let registry = ProcessRegistry::new();
        let mut child = registry.spawn(&mut Command::new("true")).unwrap();
        child.wait().unwrap();
        assert_eq!(registry.kill_all(), 0);
    }

    #[test]
    fn test_wait_forgets_finished_group() {
        let registry = ProcessRegistry::new();
        let mut done = registry.spawn(&mut Command::new("true")).unwrap();
        let mut running = registry
            .spawn(Command::new("sleep").arg("30"))
            .unwrap();

        assert!(registry.wait(&mut done).unwrap().success());
        assert_eq!(registry.tracked(), vec![running.id()]);

        assert_eq!(registry.kill_all(), 1);
        assert!(wait_for_exit(&mut running));
    }
}

//! Python launcher detection.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::BootstrapError;

/// Preferred launcher first, fallback second.
pub const POSIX_LAUNCHERS: &[&str] = &["python3", "python"];
pub const WINDOWS_LAUNCHERS: &[&str] = &["py", "python"];

/// A launcher that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpreter {
    pub program: PathBuf,
    pub version: String,
}

pub fn default_launchers() -> &'static [&'static str] {
    if cfg!(windows) {
        WINDOWS_LAUNCHERS
    } else {
        POSIX_LAUNCHERS
    }
}

/// Find the first usable launcher. `override_launcher` replaces the default
/// preference list; it may be a bare name looked up on PATH or a path.
pub fn detect(override_launcher: Option<&str>) -> Result<Interpreter, BootstrapError> {
    let candidates: Vec<&str> = match override_launcher {
        Some(name) => vec![name],
        None => default_launchers().to_vec(),
    };

    for name in &candidates {
        let program = match which::which(name) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(launcher = %name, error = %e, "Launcher not on PATH");
                continue;
            }
        };
        match probe_version(&program) {
            Some(version) => {
                tracing::info!(program = %program.display(), %version, "Using Python launcher");
                return Ok(Interpreter { program, version });
            }
            None => {
                tracing::debug!(program = %program.display(), "Launcher did not report a version");
            }
        }
    }

    Err(BootstrapError::InterpreterNotFound {
        tried: candidates.join(", "),
    })
}

/// `None` when the launcher fails to run or exits non-zero, e.g. the
/// Windows Store `python` alias when Python is not installed.
fn probe_version(program: &Path) -> Option<String> {
    let out = Command::new(program).arg("--version").output().ok()?;
    if !out.status.success() {
        return None;
    }
    // Python 2 prints its version on stderr.
    let raw = if out.stdout.is_empty() {
        out.stderr
    } else {
        out.stdout
    };
    let version = String::from_utf8_lossy(&raw).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

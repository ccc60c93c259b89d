//! `venvstrap clean`: remove the environment and the install log.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use serde::Serialize;
use venvstrap_core::config::BootstrapConfig;
use venvstrap_env::{builder, progress};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub removed_venv: bool,
    pub removed_log: bool,
}

/// `venvstrap clean`
pub fn cmd_clean(cfg: &BootstrapConfig) -> Result<CleanReport> {
    let venv = cfg.venv_path();
    let removed_venv = builder::remove_existing(&venv)?;

    let log = cfg.log_path();
    let removed_log = match fs::remove_file(&log) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to remove {}", log.display()));
        }
    };
    // Only succeeds when nothing else lives in the log directory.
    let _ = fs::remove_dir(cfg.log_dir_path());

    if removed_venv {
        progress!("✓ Removed environment {}", venv.display());
    }
    if removed_log {
        progress!("✓ Removed install log {}", log.display());
    }
    if !removed_venv && !removed_log {
        progress!("Nothing to clean in {}", cfg.project_dir.display());
    }

    Ok(CleanReport {
        removed_venv,
        removed_log,
    })
}

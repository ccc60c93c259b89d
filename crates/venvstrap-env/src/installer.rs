//! Dependency installation inside the activated environment.
//!
//! Two installer runs, both mirrored to console and log:
//! `python -m pip install --upgrade pip`, then
//! `python -m pip install -r <manifest>`. Their exit statuses are reported,
//! never acted upon here; callers decide what a failure means.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use venvstrap_core::config::env_keys::host;

use crate::activation::Activation;
use crate::mirror::MirroredOutput;
use crate::process::ProcessRegistry;

/// Encoding forced on the installer so non-ASCII package metadata logs cleanly.
pub const INSTALL_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// `code` is None when the installer could not be started or died from a signal.
    Failed { code: Option<i32> },
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub upgrade_installer: StepOutcome,
    pub install_manifest: StepOutcome,
    pub log_path: PathBuf,
}

impl InstallReport {
    pub fn succeeded(&self) -> bool {
        !self.upgrade_installer.is_failure() && !self.install_manifest.is_failure()
    }
}

pub struct Installer<'a> {
    activation: &'a Activation,
    registry: &'a ProcessRegistry,
    working_dir: &'a Path,
}

impl<'a> Installer<'a> {
    pub fn new(activation: &'a Activation, registry: &'a ProcessRegistry, working_dir: &'a Path) -> Self {
        Self {
            activation,
            registry,
            working_dir,
        }
    }

    /// Upgrade pip, then install `manifest`. A missing manifest skips the second step.
    pub fn install(&self, manifest: &Path, output: &MirroredOutput) -> InstallReport {
        note(
            output,
            &format!(
                "# venvstrap install {} ({})",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                self.activation.venv_dir().display()
            ),
        );

        let upgrade_installer = self.run_pip(&["install", "--upgrade", "pip"], output);

        let install_manifest = if manifest.is_file() {
            let manifest_arg = manifest.to_string_lossy();
            self.run_pip(&["install", "-r", &*manifest_arg], output)
        } else {
            tracing::warn!(manifest = %manifest.display(), "Manifest not found, skipping dependency install");
            let reason = format!("manifest {} not found", manifest.display());
            note(output, &format!("# skipped: {}", reason));
            StepOutcome::Skipped { reason }
        };

        InstallReport {
            upgrade_installer,
            install_manifest,
            log_path: output.log_path().to_path_buf(),
        }
    }

    fn pip_command(&self, args: &[&str]) -> Command {
        let mut cmd = self.activation.python_command();
        cmd.arg("-m")
            .arg("pip")
            .args(args)
            .env(host::PYTHONIOENCODING, INSTALL_ENCODING)
            .current_dir(self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run_pip(&self, args: &[&str], output: &MirroredOutput) -> StepOutcome {
        note(output, &format!("$ python -m pip {}", args.join(" ")));
        let mut cmd = self.pip_command(args);
        run_mirrored(&mut cmd, self.registry, output)
    }
}

/// Write a line of our own (header, command echo) to the mirror.
fn note(output: &MirroredOutput, line: &str) {
    if let Err(e) = output.write_line(line.as_bytes()) {
        tracing::warn!(log = %output.log_path().display(), error = %e, "Failed to write install log");
    }
}

/// Spawn `cmd` with piped stdout/stderr and drain both into `output` until it exits.
pub fn run_mirrored(cmd: &mut Command, registry: &ProcessRegistry, output: &MirroredOutput) -> StepOutcome {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = match registry.spawn(cmd) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(%program, error = %e, "Failed to start installer");
            note(output, &format!("error: failed to start {}: {}", program, e));
            return StepOutcome::Failed { code: None };
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    std::thread::scope(|s| {
        if let Some(out) = stdout {
            s.spawn(|| {
                if let Err(e) = output.pump(out) {
                    tracing::warn!(error = %e, "Lost installer stdout");
                }
            });
        }
        if let Some(err) = stderr {
            s.spawn(|| {
                if let Err(e) = output.pump(err) {
                    tracing::warn!(error = %e, "Lost installer stderr");
                }
            });
        }
    });

    match registry.wait(&mut child) {
        Ok(status) if status.success() => StepOutcome::Succeeded,
        Ok(status) => {
            tracing::warn!(%program, ?status, "Installer exited unsuccessfully");
            StepOutcome::Failed {
                code: status.code(),
            }
        }
        Err(e) => {
            tracing::error!(%program, error = %e, "Failed to wait for installer");
            StepOutcome::Failed { code: None }
        }
    }
}

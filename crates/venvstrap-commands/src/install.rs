//! `venvstrap install`: install dependencies into the existing environment
//! (creating it only when absent), then ensure configuration.
//!
//! Also hosts the install + configure tail shared with `setup`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use venvstrap_core::config::BootstrapConfig;
use venvstrap_env::activation::Activation;
use venvstrap_env::installer::{InstallReport, Installer};
use venvstrap_env::mirror::MirroredOutput;
use venvstrap_env::process::ProcessRegistry;
use venvstrap_env::{builder, interpreter, progress};

use crate::config_file::{self, ConfigOutcome};

/// Exit code for a failed installer run under `--strict`.
pub const INSTALL_FAILED_EXIT_CODE: u8 = 2;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub install: InstallReport,
    pub config: ConfigOutcome,
}

impl RunOutcome {
    /// 0, or [`INSTALL_FAILED_EXIT_CODE`] when `strict` and the installer failed.
    pub fn exit_code(&self, strict: bool) -> u8 {
        if strict && !self.install.succeeded() {
            INSTALL_FAILED_EXIT_CODE
        } else {
            0
        }
    }
}

/// `venvstrap install`
pub fn cmd_install(cfg: &BootstrapConfig, registry: &ProcessRegistry) -> Result<RunOutcome> {
    run_install(cfg, registry, Box::new(io::stdout()))
}

pub fn run_install(
    cfg: &BootstrapConfig,
    registry: &ProcessRegistry,
    console: Box<dyn Write + Send>,
) -> Result<RunOutcome> {
    let venv = cfg.venv_path();
    if !venv.is_dir() {
        progress!("🐍 No environment at {}, creating one", venv.display());
        let interp = interpreter::detect(cfg.python.as_deref())?;
        builder::ensure(&interp, &venv, registry)?;
    }
    install_and_configure(cfg, registry, console)
}

/// Activate, install, then ensure configuration. The configuration step runs
/// whatever the installer's outcome.
pub fn install_and_configure(
    cfg: &BootstrapConfig,
    registry: &ProcessRegistry,
    console: Box<dyn Write + Send>,
) -> Result<RunOutcome> {
    let activation = Activation::for_host(&cfg.venv_path());
    progress!("🔌 Activated {}", activation.activate_script().display());

    let log_path = cfg.log_path();
    let output = MirroredOutput::create(&log_path, console)
        .context("Failed to prepare the install log")?;
    progress!(
        "📦 Installing dependencies from {} (log: {})",
        cfg.manifest_path().display(),
        log_path.display()
    );

    let install = Installer::new(&activation, registry, &cfg.project_dir)
        .install(&cfg.manifest_path(), &output);
    if install.succeeded() {
        progress!("✓ Dependencies installed");
    } else {
        tracing::warn!(?install, "Dependency install failed");
        progress!("⚠ Dependency install failed, see {}", log_path.display());
    }

    let config = config_file::ensure_configuration(cfg)?;
    Ok(RunOutcome { install, config })
}

//! `venvstrap setup`: full bootstrap, the default command.
//!
//! Flow:
//!   1. Detect the Python launcher
//!   2. Recreate the environment from scratch
//!   3. Activate it and install dependencies (mirrored to console + log)
//!   4. Ensure `.env` / `config.json` exists
//!   5. Hold the console open briefly
//!
//! A failure in 1–2 stops the run before anything is installed or copied.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use venvstrap_core::config::BootstrapConfig;
use venvstrap_env::process::ProcessRegistry;
use venvstrap_env::{builder, interpreter, progress, BootstrapError};

use crate::install::{self, RunOutcome};

/// `venvstrap setup`
pub fn cmd_setup(cfg: &BootstrapConfig, registry: &ProcessRegistry) -> Result<RunOutcome> {
    progress!("🚀 Setting up {}", cfg.project_dir.display());
    let result = run_setup(cfg, registry, Box::new(io::stdout()));

    match &result {
        Ok(_) => progress!("✅ Setup finished"),
        Err(e) => {
            if e.downcast_ref::<BootstrapError>()
                .is_some_and(BootstrapError::is_environment_failure)
            {
                progress!("❌ Could not create the virtual environment: {}", e);
                progress!("   Check that Python is installed correctly (including the venv module).");
            } else {
                progress!("❌ Setup failed: {:#}", e);
            }
        }
    }
    pause_before_exit(cfg.pause);
    result
}

pub fn run_setup(
    cfg: &BootstrapConfig,
    registry: &ProcessRegistry,
    console: Box<dyn Write + Send>,
) -> Result<RunOutcome> {
    let interp = interpreter::detect(cfg.python.as_deref())?;
    progress!("🐍 {} ({})", interp.version, interp.program.display());

    let venv = cfg.venv_path();
    progress!("🗂  Creating environment at {}", venv.display());
    builder::recreate(&interp, &venv, registry)?;

    install::install_and_configure(cfg, registry, console)
}

/// Keep the console window open long enough to read the output.
pub fn pause_before_exit(pause: Duration) {
    if pause.is_zero() {
        return;
    }
    progress!("⏳ Closing in {} seconds...", pause.as_secs());
    let _ = io::stderr().flush();
    std::thread::sleep(pause);
}

//! Build the project's isolated environment with `<launcher> -m venv`.

use std::path::Path;
use std::process::Command;

use crate::error::BootstrapError;
use crate::interpreter::Interpreter;
use crate::process::ProcessRegistry;

/// Remove any existing environment at `venv_dir` and create a fresh one.
pub fn recreate(
    interpreter: &Interpreter,
    venv_dir: &Path,
    registry: &ProcessRegistry,
) -> Result<(), BootstrapError> {
    remove_existing(venv_dir)?;
    create(interpreter, venv_dir, registry)
}

/// Create the environment only when `venv_dir` does not exist yet.
/// Returns true when it was created.
pub fn ensure(
    interpreter: &Interpreter,
    venv_dir: &Path,
    registry: &ProcessRegistry,
) -> Result<bool, BootstrapError> {
    if venv_dir.is_dir() {
        tracing::debug!(venv = %venv_dir.display(), "Reusing existing environment");
        return Ok(false);
    }
    create(interpreter, venv_dir, registry)?;
    Ok(true)
}

/// Remove `venv_dir` if present. Returns true when something was removed.
pub fn remove_existing(venv_dir: &Path) -> Result<bool, BootstrapError> {
    if !venv_dir.exists() {
        return Ok(false);
    }
    tracing::info!(venv = %venv_dir.display(), "Removing previous environment");
    std::fs::remove_dir_all(venv_dir).map_err(|source| BootstrapError::RemoveEnvironment {
        path: venv_dir.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// The launcher's own exit status is logged but not trusted: the environment
/// counts as created only if the directory exists afterwards.
fn create(
    interpreter: &Interpreter,
    venv_dir: &Path,
    registry: &ProcessRegistry,
) -> Result<(), BootstrapError> {
    let mut cmd = Command::new(&interpreter.program);
    cmd.arg("-m").arg("venv").arg(venv_dir);

    let program = interpreter.program.display().to_string();
    let status = registry
        .spawn(&mut cmd)
        .and_then(|mut child| registry.wait(&mut child))
        .map_err(|source| BootstrapError::Spawn {
            program: program.clone(),
            source,
        })?;
    if !status.success() {
        tracing::warn!(%program, ?status, "venv creation exited unsuccessfully");
    }

    if !venv_dir.is_dir() {
        return Err(BootstrapError::EnvironmentNotCreated {
            path: venv_dir.to_path_buf(),
        });
    }
    tracing::info!(venv = %venv_dir.display(), "Environment created");
    Ok(())
}

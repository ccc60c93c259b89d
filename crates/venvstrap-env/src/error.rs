use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing the isolated environment.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("No Python launcher found (tried: {tried})")]
    InterpreterNotFound { tried: String },

    #[error("Failed to remove previous environment at {}: {source}", .path.display())]
    RemoveEnvironment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Environment directory {} was not created; the Python installation looks broken",
        .path.display()
    )]
    EnvironmentNotCreated { path: PathBuf },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open install log {}: {source}", .path.display())]
    InstallLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BootstrapError {
    /// Failures that mean no usable environment exists. These halt `setup` early.
    pub fn is_environment_failure(&self) -> bool {
        matches!(
            self,
            Self::InterpreterNotFound { .. }
                | Self::RemoveEnvironment { .. }
                | Self::EnvironmentNotCreated { .. }
        )
    }
}

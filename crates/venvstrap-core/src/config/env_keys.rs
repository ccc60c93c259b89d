//! Environment variable key constants and aliases.
//!
//! Primary keys use the `VENVSTRAP_*` prefix; aliases cover names that
//! hand-written setup scripts commonly export.

/// Project layout
pub mod paths {
    pub const PROJECT_DIR: &str = "VENVSTRAP_PROJECT_DIR";

    pub const VENV_DIR: &str = "VENVSTRAP_VENV_DIR";
    pub const VENV_DIR_ALIASES: &[&str] = &["VENV_DIR"];

    pub const MANIFEST: &str = "VENVSTRAP_MANIFEST";
    pub const MANIFEST_ALIASES: &[&str] = &["REQUIREMENTS_FILE"];

    pub const ENV_TEMPLATE: &str = "VENVSTRAP_ENV_TEMPLATE";

    pub const LOG_DIR: &str = "VENVSTRAP_LOG_DIR";
    pub const LOG_FILE: &str = "VENVSTRAP_LOG_FILE";
}

/// Interpreter launcher override
pub mod interpreter {
    pub const PYTHON: &str = "VENVSTRAP_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON_LAUNCHER"];
}

/// Run behaviour
pub mod run {
    /// Seconds to hold the console open at the end of `setup`.
    pub const PAUSE_SECS: &str = "VENVSTRAP_PAUSE_SECS";
    /// Exit non-zero when the installer fails.
    pub const STRICT: &str = "VENVSTRAP_STRICT";
}

/// Observability and logging
pub mod observability {
    pub const QUIET: &str = "VENVSTRAP_QUIET";
    pub const LOG_LEVEL: &str = "VENVSTRAP_LOG_LEVEL";
    pub const LOG_JSON: &str = "VENVSTRAP_LOG_JSON";
}

/// Variables owned by the host shell or by Python itself.
pub mod host {
    /// Set by Git Bash / MSYS2 shells on Windows.
    pub const MSYSTEM: &str = "MSYSTEM";
    pub const OSTYPE: &str = "OSTYPE";
    pub const PATH: &str = "PATH";
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PYTHONHOME: &str = "PYTHONHOME";
    pub const PYTHONIOENCODING: &str = "PYTHONIOENCODING";
}

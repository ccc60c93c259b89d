//! Config structs grouped by concern, loaded from environment variables.

use super::env_keys::{interpreter, observability as obv_keys, paths, run};
use super::loader::{env_bool, env_optional, env_or};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project layout and run settings for a bootstrap run.
///
/// Relative paths are resolved against `project_dir` by the accessor methods,
/// so overriding the project directory after loading keeps the layout intact.
/// `project_dir` itself is always absolute: child processes get resolved paths
/// and may run in a different working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub project_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub manifest: PathBuf,
    pub env_template: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: String,
    /// Explicit launcher; replaces the built-in `python3`/`python` preference list.
    pub python: Option<String>,
    pub pause: Duration,
    pub strict: bool,
}

impl BootstrapConfig {
    pub const DEFAULT_VENV_DIR: &'static str = "venv";
    pub const DEFAULT_MANIFEST: &'static str = "requirements.txt";
    pub const DEFAULT_ENV_TEMPLATE: &'static str = ".example.env";
    pub const DEFAULT_LOG_DIR: &'static str = "logs";
    pub const DEFAULT_LOG_FILE: &'static str = "install.log";
    pub const DEFAULT_PAUSE_SECS: u64 = 5;

    /// Working configuration file names. Either one counts as "configured".
    pub const DOTENV_FILE: &'static str = ".env";
    pub const CONFIG_JSON_FILE: &'static str = "config.json";

    /// Defaults rooted at `project_dir`, ignoring the environment.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: absolutize(project_dir.into()),
            venv_dir: PathBuf::from(Self::DEFAULT_VENV_DIR),
            manifest: PathBuf::from(Self::DEFAULT_MANIFEST),
            env_template: PathBuf::from(Self::DEFAULT_ENV_TEMPLATE),
            log_dir: PathBuf::from(Self::DEFAULT_LOG_DIR),
            log_file: Self::DEFAULT_LOG_FILE.to_string(),
            python: None,
            pause: Duration::from_secs(Self::DEFAULT_PAUSE_SECS),
            strict: false,
        }
    }

    /// Load from `VENVSTRAP_*` variables; the project dir defaults to the current directory.
    pub fn from_env() -> Self {
        let project_dir = env_optional(paths::PROJECT_DIR, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let defaults = Self::for_project(project_dir);

        let pause_secs = env_optional(run::PAUSE_SECS, &[])
            .and_then(|s| match s.parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(value = %s, "Ignoring invalid {}", run::PAUSE_SECS);
                    None
                }
            })
            .unwrap_or(Self::DEFAULT_PAUSE_SECS);

        Self {
            venv_dir: PathBuf::from(env_or(paths::VENV_DIR, paths::VENV_DIR_ALIASES, || {
                Self::DEFAULT_VENV_DIR.to_string()
            })),
            manifest: PathBuf::from(env_or(paths::MANIFEST, paths::MANIFEST_ALIASES, || {
                Self::DEFAULT_MANIFEST.to_string()
            })),
            env_template: PathBuf::from(env_or(paths::ENV_TEMPLATE, &[], || {
                Self::DEFAULT_ENV_TEMPLATE.to_string()
            })),
            log_dir: PathBuf::from(env_or(paths::LOG_DIR, &[], || {
                Self::DEFAULT_LOG_DIR.to_string()
            })),
            log_file: env_or(paths::LOG_FILE, &[], || Self::DEFAULT_LOG_FILE.to_string()),
            python: env_optional(interpreter::PYTHON, interpreter::PYTHON_ALIASES),
            pause: Duration::from_secs(pause_secs),
            strict: env_bool(run::STRICT, &[], false),
            ..defaults
        }
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = absolutize(project_dir.into());
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = Some(python.into());
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        self.project_dir.join(p)
    }

    pub fn venv_path(&self) -> PathBuf {
        self.resolve(&self.venv_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn env_template_path(&self) -> PathBuf {
        self.resolve(&self.env_template)
    }

    pub fn log_dir_path(&self) -> PathBuf {
        self.resolve(&self.log_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir_path().join(&self.log_file)
    }

    pub fn dotenv_path(&self) -> PathBuf {
        self.project_dir.join(Self::DOTENV_FILE)
    }

    pub fn config_json_path(&self) -> PathBuf {
        self.project_dir.join(Self::CONFIG_JSON_FILE)
    }
}

/// Anchor a relative path at the current directory. Falls back to the path as
/// given when the current directory cannot be read.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot read current directory: {}", e);
            path
        }
    }
}

/// Observability config: quiet, log_level, log_json.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            quiet: env_bool(obv_keys::QUIET, &[], false),
            log_level: env_or(obv_keys::LOG_LEVEL, &["RUST_LOG"], || {
                "venvstrap=info".to_string()
            }),
            log_json: env_bool(obv_keys::LOG_JSON, &[], false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_project_dir() {
        let cfg = BootstrapConfig::for_project("/srv/bot");
        assert_eq!(cfg.venv_path(), PathBuf::from("/srv/bot/venv"));
        assert_eq!(cfg.manifest_path(), PathBuf::from("/srv/bot/requirements.txt"));
        assert_eq!(cfg.env_template_path(), PathBuf::from("/srv/bot/.example.env"));
        assert_eq!(cfg.log_path(), PathBuf::from("/srv/bot/logs/install.log"));
        assert_eq!(cfg.dotenv_path(), PathBuf::from("/srv/bot/.env"));
        assert_eq!(cfg.config_json_path(), PathBuf::from("/srv/bot/config.json"));
    }

    #[test]
    fn test_project_dir_override_keeps_relative_layout() {
        let cfg = BootstrapConfig::for_project("/a").with_project_dir("/b");
        assert_eq!(cfg.venv_path(), PathBuf::from("/b/venv"));
    }

    #[test]
    fn test_absolute_venv_dir_is_not_rerooted() {
        let mut cfg = BootstrapConfig::for_project("/a");
        cfg.venv_dir = PathBuf::from("/opt/envs/bot");
        assert_eq!(cfg.venv_path(), PathBuf::from("/opt/envs/bot"));
    }

    #[test]
    fn test_builders() {
        let cfg = BootstrapConfig::for_project(".")
            .with_python("/usr/bin/python3.12")
            .with_pause(Duration::ZERO);
        assert_eq!(cfg.python.as_deref(), Some("/usr/bin/python3.12"));
        assert_eq!(cfg.pause, Duration::ZERO);
        assert!(!cfg.strict);
    }

    #[test]
    fn test_relative_project_dir_is_anchored_at_cwd() {
        let cwd = std::env::current_dir().unwrap();

        let cfg = BootstrapConfig::for_project("checkout");
        assert!(cfg.project_dir.is_absolute());
        assert_eq!(cfg.project_dir, cwd.join("checkout"));
        assert_eq!(cfg.venv_path(), cwd.join("checkout").join("venv"));

        let cfg = BootstrapConfig::for_project("/a").with_project_dir("bot");
        assert_eq!(cfg.project_dir, cwd.join("bot"));
        assert_eq!(cfg.manifest_path(), cwd.join("bot").join("requirements.txt"));
    }
}

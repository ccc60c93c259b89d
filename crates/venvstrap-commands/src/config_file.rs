//! Working configuration file: `.env` or `config.json`.
//!
//! Either file counts as configured. When neither exists the checked-in
//! example environment file is copied to `.env` byte-for-byte.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use venvstrap_core::config::{self, BootstrapConfig};
use venvstrap_env::progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    DotEnv,
    ConfigJson,
}

impl ConfigSource {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::DotEnv => BootstrapConfig::DOTENV_FILE,
            Self::ConfigJson => BootstrapConfig::CONFIG_JSON_FILE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    AlreadyPresent(ConfigSource),
    CopiedTemplate { template: PathBuf, target: PathBuf },
    TemplateMissing(PathBuf),
}

/// `.env` wins when both files exist.
pub fn detect_source(cfg: &BootstrapConfig) -> Option<ConfigSource> {
    if cfg.dotenv_path().exists() {
        Some(ConfigSource::DotEnv)
    } else if cfg.config_json_path().exists() {
        Some(ConfigSource::ConfigJson)
    } else {
        None
    }
}

pub fn ensure_configuration(cfg: &BootstrapConfig) -> Result<ConfigOutcome> {
    if let Some(source) = detect_source(cfg) {
        tracing::debug!(file = source.file_name(), "Configuration already present");
        return Ok(ConfigOutcome::AlreadyPresent(source));
    }

    let template = cfg.env_template_path();
    if !template.is_file() {
        tracing::warn!(template = %template.display(), "No configuration and no template to copy");
        progress!(
            "⚠ No {} or {} found, and template {} is missing. Create one before starting the app.",
            BootstrapConfig::DOTENV_FILE,
            BootstrapConfig::CONFIG_JSON_FILE,
            template.display()
        );
        return Ok(ConfigOutcome::TemplateMissing(template));
    }

    let target = cfg.dotenv_path();
    if !copy_new(&template, &target)? {
        return Ok(ConfigOutcome::AlreadyPresent(ConfigSource::DotEnv));
    }
    tracing::info!(template = %template.display(), target = %target.display(), "Copied configuration template");

    progress!("📄 Created {} from {}", BootstrapConfig::DOTENV_FILE, template.display());
    let unfilled = unfilled_keys(&target).unwrap_or_default();
    if unfilled.is_empty() {
        progress!("   ⚠ Review the values in .env and fill in your secrets before starting the app.");
    } else {
        progress!("   ⚠ Fill in your secrets in .env before starting the app: {}", unfilled.join(", "));
    }

    Ok(ConfigOutcome::CopiedTemplate { template, target })
}

/// Copy without ever overwriting. Ok(false) when `target` appeared meanwhile.
fn copy_new(template: &Path, target: &Path) -> Result<bool> {
    let src = File::open(template)
        .with_context(|| format!("Failed to open template {}", template.display()))?;
    write_new(src, target)
        .with_context(|| format!("Failed to copy {} to {}", template.display(), target.display()))
}

/// Create `target` and fill it from `src`. A partial write is removed again,
/// so a failed copy never leaves a truncated file that looks configured.
fn write_new<R: Read>(mut src: R, target: &Path) -> Result<bool> {
    let mut dst = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", target.display()));
        }
    };
    if let Err(e) = io::copy(&mut src, &mut dst).and_then(|_| dst.sync_all()) {
        drop(dst);
        if let Err(rm) = std::fs::remove_file(target) {
            tracing::warn!(path = %target.display(), error = %rm, "Failed to remove partial copy");
        }
        return Err(e.into());
    }
    Ok(true)
}

/// Keys of a dotenv file whose values are still empty.
pub fn unfilled_keys(dotenv: &Path) -> Result<Vec<String>> {
    let entries = config::read_dotenv(dotenv)
        .with_context(|| format!("Failed to read {}", dotenv.display()))?;
    Ok(entries
        .into_iter()
        .filter(|e| e.value.trim().is_empty())
        .map(|e| e.key)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "# Bot configuration\nTOKEN=\nDEFAULT_PREFIX=!!\nOWNER_IDS=\n";

    fn project() -> (tempfile::TempDir, BootstrapConfig) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BootstrapConfig::for_project(dir.path());
        (dir, cfg)
    }

    #[test]
    fn test_copies_template_when_unconfigured() {
        let (dir, cfg) = project();
        std::fs::write(cfg.env_template_path(), TEMPLATE).unwrap();

        let outcome = ensure_configuration(&cfg).unwrap();
        assert_eq!(
            outcome,
            ConfigOutcome::CopiedTemplate {
                template: cfg.env_template_path(),
                target: cfg.dotenv_path(),
            }
        );
        assert_eq!(std::fs::read(dir.path().join(".env")).unwrap(), TEMPLATE.as_bytes());
    }

    #[test]
    fn test_existing_dotenv_is_left_alone() {
        let (_dir, cfg) = project();
        std::fs::write(cfg.env_template_path(), TEMPLATE).unwrap();
        std::fs::write(cfg.dotenv_path(), "TOKEN=secret\n").unwrap();

        let outcome = ensure_configuration(&cfg).unwrap();
        assert_eq!(outcome, ConfigOutcome::AlreadyPresent(ConfigSource::DotEnv));
        assert_eq!(std::fs::read_to_string(cfg.dotenv_path()).unwrap(), "TOKEN=secret\n");
    }

    #[test]
    fn test_config_json_suppresses_template_copy() {
        let (_dir, cfg) = project();
        std::fs::write(cfg.env_template_path(), TEMPLATE).unwrap();
        std::fs::write(cfg.config_json_path(), "{}").unwrap();

        let outcome = ensure_configuration(&cfg).unwrap();
        assert_eq!(outcome, ConfigOutcome::AlreadyPresent(ConfigSource::ConfigJson));
        assert!(!cfg.dotenv_path().exists());
    }

    #[test]
    fn test_missing_template_is_not_fatal() {
        let (_dir, cfg) = project();
        let outcome = ensure_configuration(&cfg).unwrap();
        assert_eq!(outcome, ConfigOutcome::TemplateMissing(cfg.env_template_path()));
        assert!(!cfg.dotenv_path().exists());
    }

    #[test]
    fn test_unfilled_keys() {
        let (_dir, cfg) = project();
        std::fs::write(cfg.dotenv_path(), TEMPLATE).unwrap();
        assert_eq!(unfilled_keys(&cfg.dotenv_path()).unwrap(), vec!["TOKEN", "OWNER_IDS"]);
    }

    #[test]
    fn test_detect_source_prefers_dotenv() {
        let (_dir, cfg) = project();
        assert_eq!(detect_source(&cfg), None);
        std::fs::write(cfg.config_json_path(), "{}").unwrap();
        std::fs::write(cfg.dotenv_path(), "").unwrap();
        assert_eq!(detect_source(&cfg), Some(ConfigSource::DotEnv));
    }

    /// Yields the first half of the template, then fails like a dying disk.
    struct FailsMidway(&'static [u8]);

    impl Read for FailsMidway {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "I/O error"));
            }
            let n = self.0.len().min(buf.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_failed_copy_leaves_no_partial_dotenv() {
        let (_dir, cfg) = project();
        let half = &TEMPLATE.as_bytes()[..TEMPLATE.len() / 2];

        assert!(write_new(FailsMidway(half), &cfg.dotenv_path()).is_err());
        assert!(!cfg.dotenv_path().exists());
        assert_eq!(detect_source(&cfg), None);

        // The next run still gets a full copy.
        std::fs::write(cfg.env_template_path(), TEMPLATE).unwrap();
        ensure_configuration(&cfg).unwrap();
        assert_eq!(std::fs::read(cfg.dotenv_path()).unwrap(), TEMPLATE.as_bytes());
    }
}

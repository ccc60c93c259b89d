//! `venvstrap status`: report interpreter, environment, manifest and
//! configuration state without changing anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use venvstrap_core::config::BootstrapConfig;
use venvstrap_env::activation::{Activation, VenvLayout};
use venvstrap_env::interpreter::{self, Interpreter};
use venvstrap_env::manifest;

use crate::config_file::{self, ConfigSource};

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub project_dir: PathBuf,
    pub interpreter: Option<Interpreter>,
    pub venv: VenvStatus,
    pub manifest: ManifestStatus,
    pub config: ConfigStatus,
    pub log: LogStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenvStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub layout: Option<VenvLayout>,
    pub activate_script: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigStatus {
    pub source: Option<ConfigSource>,
    pub template: PathBuf,
    pub template_exists: bool,
    /// Keys of `.env` with empty values.
    pub unfilled_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogStatus {
    pub path: PathBuf,
    pub exists: bool,
}

pub fn collect_status(cfg: &BootstrapConfig) -> StatusReport {
    let interpreter = match interpreter::detect(cfg.python.as_deref()) {
        Ok(i) => Some(i),
        Err(e) => {
            tracing::debug!(error = %e, "No interpreter for status");
            None
        }
    };

    let venv_path = cfg.venv_path();
    let venv_exists = venv_path.is_dir();
    let activation = venv_exists.then(|| Activation::for_host(&venv_path));
    let venv = VenvStatus {
        exists: venv_exists,
        layout: activation.as_ref().map(Activation::layout),
        activate_script: activation
            .as_ref()
            .map(Activation::activate_script)
            .filter(|p| p.is_file()),
        path: venv_path,
    };

    let manifest_path = cfg.manifest_path();
    let packages = if manifest_path.is_file() {
        manifest::read_specifiers(&manifest_path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read manifest");
            Vec::new()
        })
    } else {
        Vec::new()
    };
    let manifest = ManifestStatus {
        exists: manifest_path.is_file(),
        packages,
        path: manifest_path,
    };

    let source = config_file::detect_source(cfg);
    let unfilled_keys = match source {
        Some(ConfigSource::DotEnv) => config_file::unfilled_keys(&cfg.dotenv_path()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read .env");
            Vec::new()
        }),
        _ => Vec::new(),
    };
    let template = cfg.env_template_path();
    let config = ConfigStatus {
        source,
        template_exists: template.is_file(),
        template,
        unfilled_keys,
    };

    let log_path = cfg.log_path();
    let log = LogStatus {
        exists: log_path.is_file(),
        path: log_path,
    };

    StatusReport {
        project_dir: cfg.project_dir.clone(),
        interpreter,
        venv,
        manifest,
        config,
        log,
    }
}

/// `venvstrap status`
pub fn cmd_status(cfg: &BootstrapConfig, json: bool) -> Result<()> {
    let report = collect_status(cfg);
    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
        println!("{}", out);
        return Ok(());
    }

    println!("Project:     {}", report.project_dir.display());
    match &report.interpreter {
        Some(i) => println!("Python:      {} ({})", i.version, i.program.display()),
        None => println!("Python:      not found"),
    }
    if report.venv.exists {
        let layout = match report.venv.layout {
            Some(VenvLayout::Windows) => "Scripts/",
            _ => "bin/",
        };
        println!("Environment: {} ({})", report.venv.path.display(), layout);
    } else {
        println!("Environment: missing ({})", report.venv.path.display());
    }
    if report.manifest.exists {
        println!(
            "Manifest:    {} ({} packages)",
            report.manifest.path.display(),
            report.manifest.packages.len()
        );
    } else {
        println!("Manifest:    missing ({})", report.manifest.path.display());
    }
    match report.config.source {
        Some(source) => println!("Config:      {}", source.file_name()),
        None if report.config.template_exists => println!(
            "Config:      missing (run setup to copy {})",
            report.config.template.display()
        ),
        None => println!("Config:      missing"),
    }
    if !report.config.unfilled_keys.is_empty() {
        println!("Unfilled:    {}", report.config.unfilled_keys.join(", "));
    }
    println!(
        "Install log: {}{}",
        report.log.path.display(),
        if report.log.exists { "" } else { " (not yet written)" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_unprepared_project() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BootstrapConfig::for_project(dir.path()).with_python("/nonexistent/python");
        let report = collect_status(&cfg);
        assert!(report.interpreter.is_none());
        assert!(!report.venv.exists);
        assert!(report.venv.layout.is_none());
        assert!(!report.manifest.exists);
        assert!(report.config.source.is_none());
        assert!(!report.log.exists);
    }

    #[test]
    fn test_status_reports_packages_and_unfilled_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BootstrapConfig::for_project(dir.path()).with_python("/nonexistent/python");
        std::fs::write(cfg.manifest_path(), "# deps\nhumanize\naiohttp>=3.9\n").unwrap();
        std::fs::write(cfg.dotenv_path(), "TOKEN=\nPREFIX=!!\nSPOTIFY_SECRET=\n").unwrap();
        std::fs::create_dir_all(cfg.venv_path().join("bin")).unwrap();
        std::fs::write(cfg.venv_path().join("bin").join("activate"), "").unwrap();

        let report = collect_status(&cfg);
        assert_eq!(report.manifest.packages, vec!["humanize", "aiohttp>=3.9"]);
        assert_eq!(report.config.source, Some(ConfigSource::DotEnv));
        assert_eq!(report.config.unfilled_keys, vec!["TOKEN", "SPOTIFY_SECRET"]);
        assert!(report.venv.exists);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["source"], "dot_env");
        assert_eq!(json["manifest"]["packages"].as_array().unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_status_after_setup() {
        use crate::test_support::Project;
        use venvstrap_env::process::ProcessRegistry;

        let p = Project::new(true, 0);
        crate::setup::run_setup(&p.cfg, &ProcessRegistry::new(), Box::new(std::io::sink())).unwrap();
        let report = collect_status(&p.cfg);
        assert_eq!(report.interpreter.unwrap().version, "Python 3.12.1");
        assert_eq!(report.venv.layout, Some(VenvLayout::Posix));
        assert!(report.venv.activate_script.is_some());
        assert!(report.log.exists);
        assert_eq!(report.config.unfilled_keys, vec!["TOKEN"]);
    }
}

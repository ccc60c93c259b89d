mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use venvstrap_commands::install::RunOutcome;
use venvstrap_commands::{clean, install, setup, status};
use venvstrap_core::config::BootstrapConfig;
use venvstrap_core::observability;
use venvstrap_env::process::ProcessRegistry;

/// Exit code of a `setup` that stopped early (no interpreter, environment not created).
const SETUP_FAILED_EXIT_CODE: u8 = 1;

fn main() -> ExitCode {
    observability::init_tracing();
    let cli = Cli::parse();

    let registry = ProcessRegistry::new();
    if let Err(e) = registry.install_signal_handler() {
        tracing::warn!(error = %e, "Child processes will not be cleaned up on interrupt");
    }
    let _cleanup = registry.cleanup_guard();

    match run(cli, &registry) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, registry: &ProcessRegistry) -> Result<u8> {
    let mut cfg = BootstrapConfig::from_env();
    if let Some(dir) = cli.project_dir {
        cfg = cfg.with_project_dir(dir);
    }
    if let Some(python) = cli.python {
        cfg = cfg.with_python(python);
    }
    tracing::debug!(?cfg, "Resolved configuration");

    match cli.command.unwrap_or(Commands::Setup {
        no_pause: false,
        strict: false,
    }) {
        Commands::Setup { no_pause, strict } => {
            if no_pause {
                cfg = cfg.with_pause(std::time::Duration::ZERO);
            }
            let strict = strict || cfg.strict;
            // cmd_setup reports its own failures before pausing.
            Ok(setup_exit_code(&setup::cmd_setup(&cfg, registry), strict))
        }
        Commands::Install { strict } => {
            let strict = strict || cfg.strict;
            let outcome = install::cmd_install(&cfg, registry)?;
            Ok(outcome.exit_code(strict))
        }
        Commands::Clean => {
            clean::cmd_clean(&cfg)?;
            Ok(0)
        }
        Commands::Status { json } => {
            status::cmd_status(&cfg, json)?;
            Ok(0)
        }
    }
}

/// 1 when setup failed, otherwise 0 or the strict install-failure code.
fn setup_exit_code(result: &Result<RunOutcome>, strict: bool) -> u8 {
    match result {
        Ok(outcome) => outcome.exit_code(strict),
        Err(e) => {
            tracing::debug!(error = %format!("{:#}", e), "Setup failed");
            SETUP_FAILED_EXIT_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use venvstrap_commands::config_file::{ConfigOutcome, ConfigSource};
    use venvstrap_commands::install::INSTALL_FAILED_EXIT_CODE;
    use venvstrap_env::installer::{InstallReport, StepOutcome};
    use venvstrap_env::BootstrapError;

    fn finished(install_manifest: StepOutcome) -> Result<RunOutcome> {
        Ok(RunOutcome {
            install: InstallReport {
                upgrade_installer: StepOutcome::Succeeded,
                install_manifest,
                log_path: PathBuf::from("logs/install.log"),
            },
            config: ConfigOutcome::AlreadyPresent(ConfigSource::DotEnv),
        })
    }

    #[test]
    fn test_environment_not_created_exits_1() {
        let result: Result<RunOutcome> = Err(BootstrapError::EnvironmentNotCreated {
            path: PathBuf::from("venv"),
        }
        .into());
        assert_eq!(setup_exit_code(&result, false), 1);
        assert_eq!(setup_exit_code(&result, true), 1);
    }

    #[test]
    fn test_missing_interpreter_exits_1() {
        let result: Result<RunOutcome> = Err(BootstrapError::InterpreterNotFound {
            tried: "python3, python".to_string(),
        }
        .into());
        assert_eq!(setup_exit_code(&result, false), 1);
    }

    #[test]
    fn test_failed_install_exits_2_only_when_strict() {
        let failed = finished(StepOutcome::Failed { code: Some(1) });
        assert_eq!(setup_exit_code(&failed, true), INSTALL_FAILED_EXIT_CODE);
        assert_eq!(setup_exit_code(&failed, true), 2);
        assert_eq!(setup_exit_code(&failed, false), 0);
    }

    #[test]
    fn test_successful_setup_exits_0() {
        let ok = finished(StepOutcome::Succeeded);
        assert_eq!(setup_exit_code(&ok, true), 0);
        let skipped = finished(StepOutcome::Skipped {
            reason: "manifest requirements.txt not found".to_string(),
        });
        assert_eq!(setup_exit_code(&skipped, true), 0);
    }
}

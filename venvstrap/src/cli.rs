use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// venvstrap - prepare a Python project checkout: virtualenv, dependencies, configuration
#[derive(Parser, Debug)]
#[command(name = "venvstrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (default: current directory)
    #[arg(long, global = true, value_name = "DIR", env = "VENVSTRAP_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Python launcher to use instead of python3/python (py/python on Windows)
    #[arg(long, global = true, value_name = "LAUNCHER")]
    pub python: Option<String>,

    /// Runs `setup` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recreate the virtualenv, install dependencies and ensure a configuration file
    Setup {
        /// Do not hold the console open before exiting
        #[arg(long)]
        no_pause: bool,

        /// Exit with code 2 when the dependency install fails
        #[arg(long)]
        strict: bool,
    },

    /// Install dependencies into the existing virtualenv (created if missing)
    Install {
        /// Exit with code 2 when the dependency install fails
        #[arg(long)]
        strict: bool,
    },

    /// Remove the virtualenv and the install log
    Clean,

    /// Show interpreter, virtualenv, manifest and configuration state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

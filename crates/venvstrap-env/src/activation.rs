//! Venv activation without a shell.
//!
//! Sourcing `activate` sets `VIRTUAL_ENV`, puts the venv's script directory
//! first on `PATH` and unsets `PYTHONHOME`. [`Activation::apply`] makes the
//! same changes on a `Command`, so every later child runs inside the venv.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use venvstrap_core::config::env_keys::host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VenvLayout {
    /// `bin/activate`, `bin/python`
    Posix,
    /// `Scripts/activate`, `Scripts/python.exe`
    Windows,
}

impl VenvLayout {
    /// Layout expected for the current host shell.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            return Self::Windows;
        }
        Self::from_shell_env(
            env::var(host::MSYSTEM).ok().as_deref(),
            env::var(host::OSTYPE).ok().as_deref(),
        )
    }

    /// Git Bash and MSYS2 export `MSYSTEM`; Cygwin-like shells name
    /// themselves in `OSTYPE`.
    pub fn from_shell_env(msystem: Option<&str>, ostype: Option<&str>) -> Self {
        let msys = msystem.is_some_and(|s| !s.trim().is_empty());
        let windows_ostype = ostype.is_some_and(|s| {
            let s = s.to_lowercase();
            s.starts_with("msys") || s.starts_with("cygwin") || s.starts_with("win32")
        });
        if msys || windows_ostype {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Layout actually present in `venv_dir`: `preferred` unless only the other one exists.
    pub fn detect(venv_dir: &Path, preferred: Self) -> Self {
        let other = preferred.other();
        if !preferred.scripts_dir(venv_dir).is_dir() && other.scripts_dir(venv_dir).is_dir() {
            other
        } else {
            preferred
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Posix => Self::Windows,
            Self::Windows => Self::Posix,
        }
    }

    pub fn scripts_dir(self, venv_dir: &Path) -> PathBuf {
        match self {
            Self::Posix => venv_dir.join("bin"),
            Self::Windows => venv_dir.join("Scripts"),
        }
    }

    pub fn python(self, venv_dir: &Path) -> PathBuf {
        match self {
            Self::Posix => self.scripts_dir(venv_dir).join("python"),
            Self::Windows => self.scripts_dir(venv_dir).join("python.exe"),
        }
    }

    pub fn activate_script(self, venv_dir: &Path) -> PathBuf {
        self.scripts_dir(venv_dir).join("activate")
    }
}

/// Environment of an activated venv.
#[derive(Debug, Clone)]
pub struct Activation {
    venv_dir: PathBuf,
    layout: VenvLayout,
}

impl Activation {
    pub fn new(venv_dir: &Path, preferred: VenvLayout) -> Self {
        let layout = VenvLayout::detect(venv_dir, preferred);
        if layout != preferred {
            tracing::debug!(?preferred, ?layout, "Venv layout differs from host shell");
        }
        Self {
            venv_dir: venv_dir.to_path_buf(),
            layout,
        }
    }

    /// Activation for the host shell's preferred layout.
    pub fn for_host(venv_dir: &Path) -> Self {
        Self::new(venv_dir, VenvLayout::for_host())
    }

    pub fn venv_dir(&self) -> &Path {
        &self.venv_dir
    }

    pub fn layout(&self) -> VenvLayout {
        self.layout
    }

    pub fn python(&self) -> PathBuf {
        self.layout.python(&self.venv_dir)
    }

    pub fn activate_script(&self) -> PathBuf {
        self.layout.activate_script(&self.venv_dir)
    }

    /// `PATH` with the venv's script directory in front.
    pub fn path_var(&self, current: Option<OsString>) -> OsString {
        let bin = self.layout.scripts_dir(&self.venv_dir);
        let rest: Vec<PathBuf> = current
            .as_deref()
            .map(|p| env::split_paths(p).collect())
            .unwrap_or_default();
        env::join_paths(std::iter::once(bin.clone()).chain(rest))
            .unwrap_or_else(|_| bin.into_os_string())
    }

    pub fn apply(&self, cmd: &mut Command) {
        cmd.env(host::VIRTUAL_ENV, &self.venv_dir)
            .env(host::PATH, self.path_var(env::var_os(host::PATH)))
            .env_remove(host::PYTHONHOME);
    }

    /// Command running the venv's interpreter with activation applied.
    pub fn python_command(&self) -> Command {
        let mut cmd = Command::new(self.python());
        self.apply(&mut cmd);
        cmd
    }
}

//! Scratch project wired to the env crate's fake `python` launcher.

use std::fs;
use std::time::Duration;

use venvstrap_core::config::BootstrapConfig;
use venvstrap_env::test_support::{fake_python, FakePython};

pub const TEMPLATE: &str = "# example configuration\nTOKEN=\nDEFAULT_PREFIX=!!\n";

pub struct Project {
    pub dir: tempfile::TempDir,
    pub cfg: BootstrapConfig,
}

impl Project {
    /// `creates_venv = false` emulates a broken Python whose `-m venv` silently does nothing.
    pub fn new(creates_venv: bool, pip_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tools = dir.path().join(".tools");
        fs::create_dir_all(&tools).unwrap();
        let python = fake_python(
            &tools,
            FakePython {
                creates_venv,
                pip_exit,
                ..FakePython::default()
            },
        );
        fs::write(dir.path().join("requirements.txt"), "humanize\naiohttp>=3.9\n").unwrap();
        fs::write(dir.path().join(".example.env"), TEMPLATE).unwrap();
        let cfg = BootstrapConfig::for_project(dir.path())
            .with_python(python.to_string_lossy())
            .with_pause(Duration::ZERO);
        Self { dir, cfg }
    }

    /// Files and directories directly under the project root, sorted.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

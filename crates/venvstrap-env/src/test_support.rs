//! Fake `python` launcher for tests: emulates `--version`, `-m venv` and
//! `-m pip` with a shell script so no real interpreter is needed.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub struct FakePython {
    pub version_exit: i32,
    /// When false, `-m venv` succeeds without creating anything.
    pub creates_venv: bool,
    pub pip_exit: i32,
}

impl Default for FakePython {
    fn default() -> Self {
        Self {
            version_exit: 0,
            creates_venv: true,
            pip_exit: 0,
        }
    }
}

pub fn fake_python(dir: &Path, behavior: FakePython) -> PathBuf {
    let venv_body = if behavior.creates_venv {
        r#"mkdir -p "$3/bin" && cp "$0" "$3/bin/python" && chmod +x "$3/bin/python" && touch "$3/bin/activate""#
    } else {
        ":"
    };
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "Python 3.12.1"
  exit {version_exit}
fi
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  {venv_body}
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  shift 2
  echo "pip $*"
  echo "encoding=$PYTHONIOENCODING venv=$VIRTUAL_ENV" >&2
  exit {pip_exit}
fi
echo "unexpected: $*" >&2
exit 2
"#,
        version_exit = behavior.version_exit,
        venv_body = venv_body,
        pip_exit = behavior.pip_exit,
    );
    let path = dir.join("fake-python");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

//! Mirror child output to the console and a log file.
//!
//! Both sinks are written under a single lock, one line at a time, so the
//! console and the log see the same byte sequence even when stdout and stderr
//! of a child are drained by separate threads. The log is authoritative: a
//! console that stops accepting output (closed pipe) is dropped and the log
//! keeps receiving every line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::BootstrapError;

struct Sinks {
    /// None once a console write has failed.
    console: Option<Box<dyn Write + Send>>,
    log: File,
}

pub struct MirroredOutput {
    sinks: Mutex<Sinks>,
    log_path: PathBuf,
}

impl MirroredOutput {
    /// Truncate (or create) the log at `log_path`, creating its directory if
    /// absent, and mirror into it alongside `console`.
    pub fn create(log_path: &Path, console: Box<dyn Write + Send>) -> Result<Self, BootstrapError> {
        let log_err = |source| BootstrapError::InstallLog {
            path: log_path.to_path_buf(),
            source,
        };
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).map_err(log_err)?;
        }
        let log = File::create(log_path).map_err(log_err)?;
        Ok(Self {
            sinks: Mutex::new(Sinks {
                console: Some(console),
                log,
            }),
            log_path: log_path.to_path_buf(),
        })
    }

    /// Mirror to the process's stdout.
    pub fn to_stdout(log_path: &Path) -> Result<Self, BootstrapError> {
        Self::create(log_path, Box::new(io::stdout()))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write one line (newline appended if missing) to the log, then the
    /// console. Only log errors are returned.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut sinks = self
            .sinks
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "mirror lock poisoned"))?;
        let Sinks { console, log } = &mut *sinks;
        write_terminated(log, line)?;
        if let Some(sink) = console {
            if let Err(e) = write_terminated(sink.as_mut(), line) {
                tracing::warn!(error = %e, "Console closed, installer output continues in the log only");
                *console = None;
            }
        }
        Ok(())
    }

    /// Copy `reader` line by line until EOF.
    pub fn pump<R: Read>(&self, reader: R) -> io::Result<()> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            self.write_line(&buf)?;
        }
    }
}

fn write_terminated(sink: &mut dyn Write, line: &[u8]) -> io::Result<()> {
    sink.write_all(line)?;
    if !line.ends_with(b"\n") {
        sink.write_all(b"\n")?;
    }
    sink.flush()
}

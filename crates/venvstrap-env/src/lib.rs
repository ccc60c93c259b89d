//! Isolated runtime environment for a Python project checkout.
//!
//! Commands resolve a launcher with [`interpreter`], (re)create the venv with
//! [`builder`], derive child-process environment from [`activation`] and run
//! the installer through [`installer`], whose output is mirrored to console
//! and log by [`mirror`]. Every child goes through [`process::ProcessRegistry`]
//! so it can be killed on interrupt or exit.

pub mod activation;
pub mod builder;
pub mod error;
pub mod installer;
pub mod interpreter;
pub mod log;
pub mod manifest;
pub mod mirror;
pub mod process;

#[cfg(all(unix, any(test, feature = "test-support")))]
pub mod test_support;

pub use error::BootstrapError;

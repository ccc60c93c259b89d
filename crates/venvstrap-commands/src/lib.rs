pub mod clean;
pub mod config_file;
pub mod install;
pub mod setup;
pub mod status;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

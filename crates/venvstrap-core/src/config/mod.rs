//! Unified configuration layer.
//!
//! All environment variable reads live here; commands consume structured
//! configs instead of calling `std::env::var` directly.
//!
//! - `loader`: env_or, env_optional, env_bool helpers plus the dotenv parser
//! - `schema`: BootstrapConfig, ObservabilityConfig
//! - `env_keys`: key constants (with aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, parse_dotenv, read_dotenv, DotenvEntry};
pub use schema::{BootstrapConfig, ObservabilityConfig};

//! Configuration for the Wayfare server.
//!
//! Values come from, in order of precedence, the process environment (after
//! an optional `.env` file is applied), a TOML file, and built-in defaults.
//! Loading returns the composed [`Config`] together with [`ConfigWarnings`]
//! the server logs at startup.

pub mod error;
pub mod loader;
pub mod models;
pub mod sources;
pub mod util;
pub mod validation;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ImageConfig, ServerConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};

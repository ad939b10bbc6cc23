use std::{collections::BTreeMap, path::PathBuf};

/// Default decoded-size ceiling for inline images, in kilobytes.
pub const DEFAULT_IMAGE_MAX_KB: usize = 5000;

/// Default request body limit. Inline images arrive base64-encoded inside a
/// JSON body, so this sits well above the decoded ceiling.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub images: ImageConfig,
    /// Seed lists for the city filter registry, keyed by destination.
    pub city_filters: BTreeMap<String, Vec<String>>,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for unmatched paths, so fallback images resolve.
    pub static_dir: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `None` runs the server on in-memory storage.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub max_kb: usize,
    /// Replaces the built-in default fallback path when set.
    pub default_fallback: Option<String>,
    /// Per-destination fallback paths layered over the built-in table.
    pub fallbacks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

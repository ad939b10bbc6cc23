use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use tracing::debug;
use url::Url;

use crate::{
    error::ConfigLoadError,
    models::{
        Config, ConfigMetadata, CorsConfig, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_IMAGE_MAX_KB,
        DEFAULT_MAX_BODY_BYTES, DatabaseConfig, ImageConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("wayfare.toml"),
        PathBuf::from("config/wayfare.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Do not read any `.env` file.
    pub skip_env_file: bool,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.options.skip_env_file = true;
        self
    }

    /// Apply the `.env` file, then compose from the process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let env = EnvConfig::gather()?;
        self.compose(env, env_file_loaded)
    }

    /// Compose from an explicit environment snapshot; the process environment
    /// and `.env` files are not consulted.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        self.compose(env, false)
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if self.options.skip_env_file {
            return Ok(false);
        }
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn compose(&self, env: EnvConfig, env_file_loaded: bool) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        let (file, config_path) = self.load_file_config(&env)?;
        if config_path.is_none() {
            warnings.push_with_hint(
                "No wayfare.toml detected; using environment variables and defaults",
                "Create wayfare.toml or point WAYFARE_CONFIG at a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            database: file_database,
            cors: file_cors,
            images: file_images,
            city_filters,
            dev_mode: file_dev_mode,
        } = file.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file_server.port).unwrap_or(3000),
            static_dir: env.static_dir.or(file_server.static_dir),
            max_body_bytes: env
                .max_body_bytes
                .or(file_server.max_body_bytes)
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        let url = env
            .database_url
            .or(file_database.url)
            .filter(|url| !url.trim().is_empty());
        let database = DatabaseConfig {
            url: url.as_deref().map(validate_database_url).transpose()?,
            max_connections: env
                .database_max_connections
                .or(file_database.max_connections)
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        };

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file_cors.allowed_origins)
                .unwrap_or_else(default_cors_origins),
            allowed_methods: env
                .cors_allowed_methods
                .or(file_cors.allowed_methods)
                .unwrap_or_else(default_cors_methods),
            allowed_headers: env
                .cors_allowed_headers
                .or(file_cors.allowed_headers)
                .unwrap_or_else(default_cors_headers),
            allow_credentials: env
                .cors_allow_credentials
                .or(file_cors.allow_credentials)
                .unwrap_or(false),
        };

        let images = ImageConfig {
            max_kb: env
                .image_max_kb
                .or(file_images.max_kb)
                .unwrap_or(DEFAULT_IMAGE_MAX_KB),
            default_fallback: env.image_default_fallback.or(file_images.default_fallback),
            fallbacks: file_images.fallbacks,
        };

        let config = Config {
            server,
            database,
            cors,
            images,
            city_filters,
            dev_mode: env.dev_mode.or(file_dev_mode).unwrap_or(false),
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        warnings.extend(validation::apply_guard_rails(&config)?);
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // Explicit and environment-provided paths must exist; default
        // locations are optional.
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_database_url(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(trimmed.to_string()),
        other => Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_cors_methods() -> Vec<String> {
    vec![
        "GET".to_string(),
        "POST".to_string(),
        "PUT".to_string(),
        "DELETE".to_string(),
        "OPTIONS".to_string(),
    ]
}

fn default_cors_headers() -> Vec<String> {
    vec![
        "Content-Type".to_string(),
        "If-None-Match".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_postgres_schemes() {
        assert!(validate_database_url("postgres://u:p@localhost/wayfare").is_ok());
        assert!(validate_database_url(" postgresql://localhost:5432/wayfare ").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            validate_database_url("mysql://localhost/wayfare"),
            Err(ConfigLoadError::UnsupportedDatabaseScheme { .. })
        ));
        assert!(matches!(
            validate_database_url("not a url"),
            Err(ConfigLoadError::InvalidDatabaseUrl { .. })
        ));
    }
}

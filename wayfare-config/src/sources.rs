use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigLoadError,
    util::{parse_bool, parse_csv},
};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub images: FileImageConfig,
    #[serde(default)]
    pub city_filters: BTreeMap<String, Vec<String>>,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_kb: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_fallback: Option<String>,
    #[serde(default)]
    pub fallbacks: BTreeMap<String, String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub max_body_bytes: Option<usize>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub image_max_kb: Option<usize>,
    pub image_default_fallback: Option<String>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from `(name, value)` pairs instead of the process environment.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigLoadError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let vars: BTreeMap<&str, &str> = pairs.into_iter().collect();
        Self::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
    }

    /// Blank variables count as unset. Numeric values that do not parse are
    /// rejected rather than ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            config_path: var("WAYFARE_CONFIG").map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: parse_number("SERVER_PORT", var("SERVER_PORT"))?,
            static_dir: var("STATIC_DIR").map(PathBuf::from),
            max_body_bytes: parse_number("MAX_BODY_BYTES", var("MAX_BODY_BYTES"))?,
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_number(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
            )?,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS").map(|raw| parse_csv(&raw)),
            cors_allowed_methods: var("CORS_ALLOWED_METHODS").map(|raw| parse_csv(&raw)),
            cors_allowed_headers: var("CORS_ALLOWED_HEADERS").map(|raw| parse_csv(&raw)),
            cors_allow_credentials: parse_flag(
                "CORS_ALLOW_CREDENTIALS",
                var("CORS_ALLOW_CREDENTIALS"),
            )?,
            image_max_kb: parse_number("IMAGE_MAX_KB", var("IMAGE_MAX_KB"))?,
            image_default_fallback: var("IMAGE_DEFAULT_FALLBACK"),
            dev_mode: parse_flag("DEV_MODE", var("DEV_MODE"))?,
        })
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        let parsed = value.trim().parse::<T>();
        parsed.map_err(|err| ConfigLoadError::InvalidValue {
            name,
            reason: err.to_string(),
            value,
        })
    })
    .transpose()
}

fn parse_flag(name: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigLoadError> {
    raw.map(|value| {
        parse_bool(&value).ok_or_else(|| ConfigLoadError::InvalidValue {
            name,
            value,
            reason: "expected one of true/false/yes/no/on/off/1/0".into(),
        })
    })
    .transpose()
}

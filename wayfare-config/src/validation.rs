use axum::http::{Method, header::HeaderName};
use thiserror::Error;

use crate::models::{Config, CorsConfig, ImageConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("invalid image configuration: {reason}")]
    InvalidImageConfig { reason: String },
    #[error("MAX_BODY_BYTES must be greater than zero")]
    ZeroBodyLimit,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(&mut self, message: S, hint: H) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Smallest body that fits a maximum-size inline image: base64 grows the
/// payload by a third, plus room for the surrounding JSON fields.
pub fn required_body_bytes(images: &ImageConfig) -> usize {
    const JSON_OVERHEAD: usize = 64 * 1024;
    (images.max_kb * 1024).div_ceil(3) * 4 + JSON_OVERHEAD
}

pub fn apply_guard_rails(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.cors.is_wildcard_included() {
        if !config.dev_mode {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
        warnings.push("CORS allows any origin; acceptable only for local development");
    }

    validate_cors(&config.cors)?;
    validate_images(&config.images, &mut warnings)?;

    if config.server.max_body_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroBodyLimit);
    }
    let required = required_body_bytes(&config.images);
    if config.server.max_body_bytes < required {
        warnings.push_with_hint(
            format!(
                "MAX_BODY_BYTES ({}) is below the {} bytes a {} KB inline image needs",
                config.server.max_body_bytes, required, config.images.max_kb
            ),
            "Raise MAX_BODY_BYTES or lower IMAGE_MAX_KB; oversized requests are rejected before ingestion",
        );
    }

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; catalog data and images are kept in memory and lost on restart",
            "Set DATABASE_URL or [database].url to persist packages, itineraries and images",
        );
    }

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    Ok(warnings)
}

fn validate_images(
    images: &ImageConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if images.max_kb == 0 {
        return Err(ConfigGuardRailError::InvalidImageConfig {
            reason: "IMAGE_MAX_KB must be greater than zero".into(),
        });
    }

    let paths = images
        .default_fallback
        .iter()
        .map(|path| ("default", path))
        .chain(images.fallbacks.iter().map(|(tag, path)| (tag.as_str(), path)));
    for (tag, path) in paths {
        let path = path.trim();
        if path.is_empty() {
            return Err(ConfigGuardRailError::InvalidImageConfig {
                reason: format!("fallback path for `{tag}` is empty"),
            });
        }
        if !path.starts_with('/') && !path.starts_with("http://") && !path.starts_with("https://")
        {
            warnings.push_with_hint(
                format!("fallback path for `{tag}` is not rooted: {path}"),
                "Fallback paths are served as-is; start them with `/` or use an absolute URL",
            );
        }
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason: "CORS_ALLOWED_METHODS must include at least one HTTP method".into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("invalid HTTP method `{}` in CORS_ALLOWED_METHODS", method),
            }
        })?;
    }

    if cors.allowed_headers.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason: "CORS_ALLOWED_HEADERS must include at least one header name".into(),
        });
    }

    for header in &cors.allowed_headers {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("invalid header name `{}` in CORS_ALLOWED_HEADERS", header),
            }
        })?;
    }

    Ok(())
}

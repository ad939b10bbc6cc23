//! HTTP back-office for the travel catalog: destination-scoped packages and
//! itineraries, uploaded image storage and per-destination city filters.

pub mod db;
pub mod handlers;
pub mod infra;
pub mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use wayfare_config::CorsConfig;

pub use infra::app_state::AppState;

/// Build the application router with its middleware stack.
pub fn create_app(state: AppState) -> Router {
    let config = state.config();

    let cors_layer = if config.dev_mode {
        CorsLayer::permissive()
    } else {
        cors_from_config(&config.cors)
    };

    let mut app = routes::create_api_router();

    if let Some(static_dir) = &config.server.static_dir {
        info!(path = %static_dir.display(), "serving static files");
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app.layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

// Entries were validated while loading the config.
fn cors_from_config(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    // Credentials cannot be combined with a wildcard origin.
    let allow_credentials = cors.allow_credentials && !origins.is_empty();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers));

    if allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use wayfare_config::{ConfigLoader, EnvConfig};

    use super::*;

    fn state(pairs: &[(&str, &str)]) -> AppState {
        let load = ConfigLoader::new()
            .without_env_file()
            .load_with_env(EnvConfig::from_pairs(pairs.iter().copied()).unwrap())
            .unwrap();
        AppState::in_memory(load.config)
    }

    #[tokio::test]
    async fn unmatched_paths_fall_back_to_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images/fallback")).unwrap();
        std::fs::write(dir.path().join("images/fallback/bali.jpg"), b"jpeg").unwrap();

        let static_dir = dir.path().to_str().unwrap().to_string();
        let app = create_app(state(&[("STATIC_DIR", static_dir.as_str())]));

        let response = app
            .oneshot(
                Request::get("/images/fallback/bali.jpg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"jpeg");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = create_app(state(&[("CORS_ALLOWED_ORIGINS", "https://admin.example.com")]));

        let response = app
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "https://admin.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://admin.example.com"
        );
    }
}

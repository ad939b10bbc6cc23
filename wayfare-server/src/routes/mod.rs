use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    handlers::{city_filters, health, images, itineraries, packages},
    infra::app_state::AppState,
};

pub const HEALTH: &str = "/api/health";
pub const IMAGES: &str = "/api/images";
pub const IMAGE: &str = "/api/images/{id}";
pub const PACKAGES: &str = "/api/destinations/{destination}/packages";
pub const PACKAGE: &str = "/api/destinations/{destination}/packages/{id}";
pub const ITINERARIES: &str = "/api/destinations/{destination}/itineraries";
pub const ITINERARY: &str = "/api/destinations/{destination}/itineraries/{id}";
pub const CITY_FILTERS: &str = "/api/destinations/{destination}/city-filters";

/// All API routes. Destination-scoped resources share one handler set keyed by
/// the `{destination}` segment.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(HEALTH, get(health::health_handler))
        .merge(image_routes())
        .merge(package_routes())
        .merge(itinerary_routes())
        .route(
            CITY_FILTERS,
            get(city_filters::get_city_filters_handler)
                .put(city_filters::replace_city_filters_handler)
                .delete(city_filters::clear_city_filters_handler),
        )
}

fn image_routes() -> Router<AppState> {
    Router::new()
        .route(IMAGES, post(images::ingest_image_handler))
        .route(
            IMAGE,
            get(images::get_image_handler).delete(images::delete_image_handler),
        )
}

fn package_routes() -> Router<AppState> {
    Router::new()
        .route(
            PACKAGES,
            get(packages::list_packages_handler).post(packages::create_package_handler),
        )
        .route(
            PACKAGE,
            get(packages::get_package_handler)
                .put(packages::update_package_handler)
                .delete(packages::delete_package_handler),
        )
}

fn itinerary_routes() -> Router<AppState> {
    Router::new()
        .route(
            ITINERARIES,
            get(itineraries::list_itineraries_handler)
                .post(itineraries::create_itinerary_handler),
        )
        .route(
            ITINERARY,
            get(itineraries::get_itinerary_handler)
                .put(itineraries::update_itinerary_handler)
                .delete(itineraries::delete_itinerary_handler),
        )
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use wayfare_core::CityFilters;

use super::parse_destination;
use crate::infra::{app_state::AppState, errors::AppResult};

#[derive(Debug, Deserialize)]
pub struct ReplaceCityFiltersRequest {
    #[serde(default)]
    pub cities: Vec<String>,
}

/// GET /api/destinations/{destination}/city-filters
pub async fn get_city_filters_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> AppResult<Json<CityFilters>> {
    let destination = parse_destination(&destination)?;
    Ok(Json(state.city_filters.get(&destination)))
}

/// PUT /api/destinations/{destination}/city-filters
pub async fn replace_city_filters_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
    payload: Result<Json<ReplaceCityFiltersRequest>, JsonRejection>,
) -> AppResult<Json<CityFilters>> {
    let destination = parse_destination(&destination)?;
    let Json(body) = payload?;

    let filters = state.city_filters.replace(destination, body.cities);
    info!(
        destination = %filters.destination,
        cities = filters.cities.len(),
        "city filters replaced"
    );
    Ok(Json(filters))
}

/// DELETE /api/destinations/{destination}/city-filters
pub async fn clear_city_filters_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> AppResult<StatusCode> {
    let destination = parse_destination(&destination)?;
    state.city_filters.clear(&destination);
    Ok(StatusCode::NO_CONTENT)
}

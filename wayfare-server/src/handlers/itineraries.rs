use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use wayfare_core::{
    Deleted,
    types::{Itinerary, ItineraryDraft, ItineraryId},
};

use super::{DataResponse, SavedResponse, parse_destination};
use crate::infra::{app_state::AppState, errors::AppResult};

/// GET /api/destinations/{destination}/itineraries
pub async fn list_itineraries_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> AppResult<Json<Vec<Itinerary>>> {
    let destination = parse_destination(&destination)?;
    let itineraries = state.catalog().list_itineraries(&destination).await?;
    Ok(Json(itineraries))
}

/// GET /api/destinations/{destination}/itineraries/{id}
pub async fn get_itinerary_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
) -> AppResult<Json<Itinerary>> {
    let destination = parse_destination(&destination)?;
    let id: ItineraryId = id.parse()?;
    let package = state.catalog().get_itinerary(&destination, id).await?;
    Ok(Json(package))
}

/// POST /api/destinations/{destination}/itineraries
pub async fn create_itinerary_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
    payload: Result<Json<ItineraryDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SavedResponse<Itinerary>>)> {
    let destination = parse_destination(&destination)?;
    let Json(draft) = payload?;

    let saved = state.catalog().create_itinerary(&destination, draft).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// PUT /api/destinations/{destination}/itineraries/{id}
pub async fn update_itinerary_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
    payload: Result<Json<ItineraryDraft>, JsonRejection>,
) -> AppResult<Json<SavedResponse<Itinerary>>> {
    let destination = parse_destination(&destination)?;
    let id: ItineraryId = id.parse()?;
    let Json(draft) = payload?;

    let saved = state
        .catalog()
        .update_itinerary(&destination, id, draft)
        .await?;
    Ok(Json(saved.into()))
}

/// DELETE /api/destinations/{destination}/itineraries/{id}
pub async fn delete_itinerary_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Deleted<ItineraryId>>>> {
    let destination = parse_destination(&destination)?;
    let id: ItineraryId = id.parse()?;

    let deleted = state.catalog().delete_itinerary(&destination, id).await?;
    Ok(Json(DataResponse { data: deleted }))
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use wayfare_core::{
    Deleted,
    types::{Package, PackageDraft, PackageId},
};

use super::{DataResponse, SavedResponse, parse_destination};
use crate::infra::{app_state::AppState, errors::AppResult};

/// GET /api/destinations/{destination}/packages
pub async fn list_packages_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
) -> AppResult<Json<Vec<Package>>> {
    let destination = parse_destination(&destination)?;
    let packages = state.catalog().list_packages(&destination).await?;
    Ok(Json(packages))
}

/// GET /api/destinations/{destination}/packages/{id}
pub async fn get_package_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
) -> AppResult<Json<Package>> {
    let destination = parse_destination(&destination)?;
    let id: PackageId = id.parse()?;
    let package = state.catalog().get_package(&destination, id).await?;
    Ok(Json(package))
}

/// POST /api/destinations/{destination}/packages
pub async fn create_package_handler(
    State(state): State<AppState>,
    Path(destination): Path<String>,
    payload: Result<Json<PackageDraft>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SavedResponse<Package>>)> {
    let destination = parse_destination(&destination)?;
    let Json(draft) = payload?;

    let saved = state.catalog().create_package(&destination, draft).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// PUT /api/destinations/{destination}/packages/{id}
pub async fn update_package_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
    payload: Result<Json<PackageDraft>, JsonRejection>,
) -> AppResult<Json<SavedResponse<Package>>> {
    let destination = parse_destination(&destination)?;
    let id: PackageId = id.parse()?;
    let Json(draft) = payload?;

    let saved = state
        .catalog()
        .update_package(&destination, id, draft)
        .await?;
    Ok(Json(saved.into()))
}

/// DELETE /api/destinations/{destination}/packages/{id}
pub async fn delete_package_handler(
    State(state): State<AppState>,
    Path((destination, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Deleted<PackageId>>>> {
    let destination = parse_destination(&destination)?;
    let id: PackageId = id.parse()?;

    let deleted = state.catalog().delete_package(&destination, id).await?;
    Ok(Json(DataResponse { data: deleted }))
}

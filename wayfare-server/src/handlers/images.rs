use std::time::SystemTime;

use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use httpdate::{fmt_http_date, parse_http_date};
use serde::Deserialize;
use tracing::debug;

use wayfare_core::{
    IngestOutcome, IngestRequest,
    types::{ImageAsset, PackageId},
};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Stored assets never change, so clients may cache them indefinitely.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestImageRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub target_id: Option<String>,
}

/// POST /api/images
pub async fn ingest_image_handler(
    State(state): State<AppState>,
    payload: Result<Json<IngestImageRequest>, JsonRejection>,
) -> AppResult<Json<IngestOutcome>> {
    let Json(body) = payload?;

    let target = body
        .target_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::parse::<PackageId>)
        .transpose()?;

    let mut request = IngestRequest::new(body.image, body.destination);
    if let Some(target) = target {
        request = request.with_target(target);
    }

    let outcome = state.catalog().ingestor().ingest(request).await;
    Ok(Json(outcome))
}

/// GET /api/images/{id}
pub async fn get_image_handler(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let asset = state
        .catalog()
        .ingestor()
        .fetch_by_key(&id)
        .await
        .ok_or_else(|| AppError::not_found(format!("image {id} not found")))?;

    let etag = asset.etag();
    let modified: SystemTime = asset.created_at.into();
    let last_modified = fmt_http_date(modified);

    if not_modified(&headers, &etag, modified) {
        debug!(image_id = %asset.id, "image not modified");
        return Ok((
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag),
                (header::LAST_MODIFIED, last_modified),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
            ],
        )
            .into_response());
    }

    Ok(image_response(asset, etag, last_modified))
}

/// DELETE /api/images/{id}
pub async fn delete_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.catalog().ingestor().remove_by_key(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("image {id} not found")))
    }
}

fn not_modified(headers: &HeaderMap, etag: &str, modified: SystemTime) -> bool {
    if let Some(if_none_match) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        return if_none_match
            .split(',')
            .any(|tag| tag.trim() == etag || tag.trim() == "*");
    }

    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| parse_http_date(raw).ok())
    else {
        return false;
    };

    // HTTP dates have second precision.
    modified
        .duration_since(since)
        .map(|newer_by| newer_by.as_secs() == 0)
        .unwrap_or(true)
}

fn image_response(asset: ImageAsset, etag: String, last_modified: String) -> Response {
    let content_type = HeaderValue::from_str(&asset.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_LENGTH,
                HeaderValue::from(asset.data.len() as u64),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMAGE_CACHE_CONTROL),
            ),
            (header::ETAG, header_value(etag)),
            (header::LAST_MODIFIED, header_value(last_modified)),
        ],
        Body::from(asset.data),
    )
        .into_response()
}

// Ids and HTTP dates are plain ASCII.
fn header_value(value: String) -> HeaderValue {
    HeaderValue::try_from(value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

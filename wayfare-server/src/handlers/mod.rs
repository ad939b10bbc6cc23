pub mod city_filters;
pub mod health;
pub mod images;
pub mod itineraries;
pub mod packages;

use serde::Serialize;
use wayfare_core::{IngestOutcome, Saved, types::Destination};

use crate::infra::errors::{AppError, AppResult};

/// Body returned by create and update endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<IngestOutcome>,
    pub warnings: Vec<String>,
}

impl<T> From<Saved<T>> for SavedResponse<T> {
    fn from(saved: Saved<T>) -> Self {
        Self {
            data: saved.record,
            image: saved.image,
            warnings: saved.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub(crate) fn parse_destination(raw: &str) -> AppResult<Destination> {
    Destination::parse(raw).map_err(AppError::from)
}

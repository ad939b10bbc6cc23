use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{destination::Destination, ids::PackageId, image::ImageFields};
use crate::error::{CatalogError, Result};

/// Highest rating a package may carry.
pub const MAX_RATING: f32 = 5.0;

/// A bookable travel package shown on a destination page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    pub destination: Destination,
    pub name: String,
    pub price: f64,
    pub duration: String,
    pub category: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub rating: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub cover: ImageFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-submitted package fields for create and full update.
///
/// `image` is the raw caller value (inline payload, path or URL). On update an
/// absent `image` keeps the current one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub package_type: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PackageDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::invalid("package name is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::invalid(format!(
                "package price must be a non-negative number, got {}",
                self.price
            )));
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::invalid(format!(
                "package rating must be between 0 and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

impl Package {
    pub fn from_draft(
        destination: Destination,
        draft: PackageDraft,
        cover: ImageFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PackageId::new(),
            destination,
            name: draft.name.trim().to_string(),
            price: draft.price,
            duration: draft.duration.trim().to_string(),
            category: draft.category.trim().to_string(),
            package_type: draft.package_type.trim().to_string(),
            rating: draft.rating,
            description: normalize_optional(draft.description),
            cover,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the descriptive fields; image columns are handled by the
    /// caller.
    pub fn apply(&mut self, draft: PackageDraft, now: DateTime<Utc>) {
        self.name = draft.name.trim().to_string();
        self.price = draft.price;
        self.duration = draft.duration.trim().to_string();
        self.category = draft.category.trim().to_string();
        self.package_type = draft.package_type.trim().to_string();
        self.rating = draft.rating;
        self.description = normalize_optional(draft.description);
        self.updated_at = now;
    }
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::image::ImageReference;
    use serde_json::json;

    fn draft() -> PackageDraft {
        PackageDraft {
            name: " Bali Bliss ".into(),
            price: 899.0,
            duration: "5 Days / 4 Nights".into(),
            category: "honeymoon".into(),
            package_type: "international".into(),
            rating: 4.5,
            description: Some("   ".into()),
            image: None,
        }
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(draft().validate().is_ok());

        let mut nameless = draft();
        nameless.name = "  ".into();
        assert!(nameless.validate().is_err());

        let mut negative = draft();
        negative.price = -1.0;
        assert!(negative.validate().is_err());

        let mut nan = draft();
        nan.price = f64::NAN;
        assert!(nan.validate().is_err());

        let mut overrated = draft();
        overrated.rating = 5.5;
        assert!(overrated.validate().is_err());
    }

    #[test]
    fn serializes_frontend_field_names() {
        let package = Package::from_draft(
            Destination::parse("bali").unwrap(),
            draft(),
            ImageFields::from_reference(ImageReference::path("/images/a.jpg")),
            Utc::now(),
        );

        let value = serde_json::to_value(&package).unwrap();
        assert_eq!(value["name"], json!("Bali Bliss"));
        assert_eq!(value["type"], json!("international"));
        assert_eq!(value["image"], json!("/images/a.jpg"));
        assert!(value.get("imageId").is_none());
        assert!(value.get("description").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn draft_accepts_sparse_json() {
        let draft: PackageDraft =
            serde_json::from_value(json!({ "name": "Dubai Nights", "price": 1200 })).unwrap();
        assert_eq!(draft.price, 1200.0);
        assert!(draft.image.is_none());
        assert!(draft.package_type.is_empty());
    }
}

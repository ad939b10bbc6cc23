use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ImageId;

/// Route prefix under which stored image bytes are served.
pub const IMAGE_ROUTE_PREFIX: &str = "/api/images/";

/// Binary image document owned by the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: ImageId,
    pub data: Vec<u8>,
    pub content_type: String,
    pub size_bytes: i64,
    /// Destination tag the asset was uploaded for.
    pub origin: String,
    pub filename: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

// Payloads run to megabytes; keep them out of logs.
impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .field("origin", &self.origin)
            .field("filename", &self.filename)
            .field("uploaded_by", &self.uploaded_by)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl ImageAsset {
    pub fn reference(&self) -> ImageReference {
        ImageReference::stored(self.id)
    }

    /// Strong validator served with the bytes. Assets are immutable, so the id
    /// alone identifies the representation.
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.id)
    }

    pub fn summary(&self) -> StoredImage {
        StoredImage {
            id: self.id,
            content_type: self.content_type.clone(),
            size_bytes: self.size_bytes,
            filename: self.filename.clone(),
        }
    }
}

/// An asset about to be written; the store assigns the id.
#[derive(Clone)]
pub struct NewImageAsset {
    pub data: Vec<u8>,
    pub content_type: String,
    pub origin: String,
    pub filename: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for NewImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewImageAsset")
            .field("bytes", &self.data.len())
            .field("content_type", &self.content_type)
            .field("origin", &self.origin)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

impl NewImageAsset {
    pub fn size_bytes(&self) -> i64 {
        self.data.len() as i64
    }

    pub fn into_asset(self, id: ImageId) -> ImageAsset {
        let size_bytes = self.size_bytes();
        ImageAsset {
            id,
            data: self.data,
            content_type: self.content_type,
            size_bytes,
            origin: self.origin,
            filename: self.filename,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
        }
    }
}

/// Metadata of a persisted asset, without the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: ImageId,
    pub content_type: String,
    pub size_bytes: i64,
    pub filename: String,
}

/// Displayable image location embedded in catalog records.
///
/// One of a rooted static path (`/images/...`), an external `http(s)` URL, or
/// `/api/images/{id}` pointing at a stored [`ImageAsset`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn stored(id: ImageId) -> Self {
        Self(format!("{IMAGE_ROUTE_PREFIX}{id}"))
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Id of the stored asset this reference points at, if any.
    pub fn image_id(&self) -> Option<ImageId> {
        self.0
            .strip_prefix(IMAGE_ROUTE_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image columns carried by packages and itineraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub image: ImageReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<i64>,
}

impl ImageFields {
    pub fn from_reference(image: ImageReference) -> Self {
        Self {
            image,
            image_type: None,
            image_id: None,
            image_filename: None,
            image_size: None,
        }
    }

    pub fn from_stored(stored: &StoredImage) -> Self {
        Self {
            image: ImageReference::stored(stored.id),
            image_type: Some(stored.content_type.clone()),
            image_id: Some(stored.id),
            image_filename: Some(stored.filename.clone()),
            image_size: Some(stored.size_bytes),
        }
    }

    /// Stored asset these fields own. Only an image written by the ingestor
    /// records an id; a copied `/api/images/{id}` path owns nothing.
    pub fn owned_image(&self) -> Option<ImageId> {
        self.image_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_reference_round_trips_id() {
        let id = ImageId::new();
        let reference = ImageReference::stored(id);
        assert_eq!(reference.as_str(), format!("/api/images/{id}"));
        assert_eq!(reference.image_id(), Some(id));
    }

    #[test]
    fn static_paths_carry_no_image_id() {
        let reference = ImageReference::path("/images/fallback/bali.jpg");
        assert_eq!(reference.image_id(), None);
        assert_eq!(ImageReference::path("/api/images/not-a-uuid").image_id(), None);
    }

    #[test]
    fn copied_stored_path_owns_nothing() {
        let id = ImageId::new();
        let copied = ImageFields::from_reference(ImageReference::stored(id));
        assert_eq!(copied.owned_image(), None);

        let stored = ImageFields::from_stored(&StoredImage {
            id,
            content_type: "image/png".into(),
            size_bytes: 4,
            filename: "bali.png".into(),
        });
        assert_eq!(stored.owned_image(), Some(id));
    }

    #[test]
    fn debug_output_omits_payload() {
        let asset = NewImageAsset {
            data: vec![0xAB; 4096],
            content_type: "image/png".into(),
            origin: "bali".into(),
            filename: "bali.png".into(),
            uploaded_by: "admin".into(),
            created_at: Utc::now(),
        }
        .into_asset(ImageId::new());

        let rendered = format!("{asset:?}");
        assert!(rendered.contains("image/png"));
        assert!(!rendered.contains("data"));
        assert_eq!(asset.size_bytes, 4096);
    }
}

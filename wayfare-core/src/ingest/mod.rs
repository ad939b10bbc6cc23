//! Image ingestion: turns whatever the admin UI sent as an image into a
//! displayable [`ImageReference`].
//!
//! Inline `data:image/...;base64` payloads are decoded and written to the
//! [`ImageStore`]; paths and URLs are normalized; anything unusable resolves
//! to the destination's entry in the [`FallbackTable`]. Ingestion never
//! fails. Degraded outcomes are logged and reported on [`IngestOutcome`].

pub mod fallback;
pub mod inline;
pub mod path;

pub use fallback::{DEFAULT_FALLBACK, FallbackTable};
pub use inline::{InlineImage, InlineImageError};
pub use path::{NormalizedPath, normalize_path};

use std::{fmt, sync::Arc};

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    database::ports::{ImageStore, PackageRepository},
    types::{ImageAsset, ImageFields, ImageId, ImageReference, NewImageAsset, PackageId, StoredImage},
};

/// Decoded-size ceiling applied when none is configured.
pub const DEFAULT_MAX_KB: usize = 5000;

/// Uploader recorded on assets written through the admin API.
pub const DEFAULT_UPLOADER: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestPolicy {
    /// Largest accepted decoded payload, in whole kilobytes.
    pub max_kb: usize,
    pub uploader: String,
}

impl IngestPolicy {
    /// Ceiling in bytes. A payload one byte over `max_kb` KB is rejected.
    pub fn max_bytes(&self) -> usize {
        self.max_kb.saturating_mul(1024)
    }
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            max_kb: DEFAULT_MAX_KB,
            uploader: DEFAULT_UPLOADER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub image: Option<String>,
    pub destination: String,
    /// Package whose image columns are updated after a successful write.
    pub target: Option<PackageId>,
}

impl IngestRequest {
    pub fn new(image: Option<String>, destination: impl Into<String>) -> Self {
        Self {
            image,
            destination: destination.into(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: PackageId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Why the fallback image was used instead of the supplied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackReason {
    Empty,
    Malformed,
    Oversized,
    Placeholder,
    StoreFailed,
}

/// Problem with the follow-up write onto the target package. The stored image
/// is kept either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SyncWarning {
    TargetMissing { target_id: PackageId },
    Failed { target_id: PackageId, message: String },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncWarning::TargetMissing { target_id } => {
                write!(f, "package {target_id} not found; image stored but not linked")
            }
            SyncWarning::Failed { target_id, message } => {
                write!(f, "failed to link image to package {target_id}: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub reference: ImageReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<StoredImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_warning: Option<SyncWarning>,
}

impl IngestOutcome {
    fn resolved(reference: ImageReference) -> Self {
        Self {
            reference,
            stored: None,
            fallback: None,
            sync_warning: None,
        }
    }

    fn fallback(reference: ImageReference, reason: FallbackReason) -> Self {
        Self {
            fallback: Some(reason),
            ..Self::resolved(reference)
        }
    }

    /// Image columns to persist on the owning record.
    pub fn image_fields(&self) -> ImageFields {
        match &self.stored {
            Some(stored) => ImageFields::from_stored(stored),
            None => ImageFields::from_reference(self.reference.clone()),
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[derive(Clone)]
pub struct ImageIngestor {
    images: Arc<dyn ImageStore>,
    packages: Arc<dyn PackageRepository>,
    fallbacks: Arc<FallbackTable>,
    policy: IngestPolicy,
}

impl fmt::Debug for ImageIngestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageIngestor")
            .field("images", &std::any::type_name_of_val(self.images.as_ref()))
            .field(
                "packages",
                &std::any::type_name_of_val(self.packages.as_ref()),
            )
            .field("fallbacks", &self.fallbacks.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ImageIngestor {
    pub fn new(
        images: Arc<dyn ImageStore>,
        packages: Arc<dyn PackageRepository>,
        fallbacks: Arc<FallbackTable>,
        policy: IngestPolicy,
    ) -> Self {
        Self {
            images,
            packages,
            fallbacks,
            policy,
        }
    }

    pub fn policy(&self) -> &IngestPolicy {
        &self.policy
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    pub fn fallback(&self, destination: &str) -> ImageReference {
        self.fallbacks.resolve(destination)
    }

    pub async fn ingest(&self, request: IngestRequest) -> IngestOutcome {
        let destination = request.destination.trim();
        let raw = request.image.as_deref().map(str::trim).unwrap_or_default();

        if raw.is_empty() {
            debug!(destination, "no image supplied, using fallback");
            return IngestOutcome::fallback(self.fallback(destination), FallbackReason::Empty);
        }

        if InlineImage::looks_inline(raw) {
            return self.ingest_inline(raw, destination, request.target).await;
        }

        match normalize_path(raw) {
            NormalizedPath::Reference(path) => IngestOutcome::resolved(ImageReference::path(path)),
            NormalizedPath::Placeholder => {
                debug!(destination, value = raw, "placeholder image value, using fallback");
                IngestOutcome::fallback(self.fallback(destination), FallbackReason::Placeholder)
            }
        }
    }

    async fn ingest_inline(
        &self,
        raw: &str,
        destination: &str,
        target: Option<PackageId>,
    ) -> IngestOutcome {
        let image = match InlineImage::parse(raw) {
            Ok(image) => image,
            Err(e) => {
                warn!(destination, "rejected inline image: {e}");
                return IngestOutcome::fallback(self.fallback(destination), FallbackReason::Malformed);
            }
        };

        if image.len() > self.policy.max_bytes() {
            warn!(
                destination,
                size_bytes = image.len(),
                max_kb = self.policy.max_kb,
                "inline image exceeds size ceiling, using fallback"
            );
            return IngestOutcome::fallback(self.fallback(destination), FallbackReason::Oversized);
        }

        let now = Utc::now();
        let filename = generate_filename(destination, now.timestamp_millis(), image.extension());
        let new_asset = NewImageAsset {
            content_type: image.content_type(),
            origin: destination.to_string(),
            filename,
            uploaded_by: self.policy.uploader.clone(),
            created_at: now,
            data: image.into_bytes(),
        };

        let asset = match self.images.insert(new_asset).await {
            Ok(asset) => asset,
            Err(e) => {
                error!(destination, "failed to store inline image: {e}");
                return IngestOutcome::fallback(
                    self.fallback(destination),
                    FallbackReason::StoreFailed,
                );
            }
        };

        info!(
            image_id = %asset.id,
            destination,
            content_type = %asset.content_type,
            size = asset.size_bytes,
            "stored inline image"
        );

        let stored = asset.summary();
        let sync_warning = match target {
            Some(target_id) => self.link_to_package(target_id, &stored).await,
            None => None,
        };

        IngestOutcome {
            reference: asset.reference(),
            stored: Some(stored),
            fallback: None,
            sync_warning,
        }
    }

    async fn link_to_package(&self, target_id: PackageId, stored: &StoredImage) -> Option<SyncWarning> {
        let fields = ImageFields::from_stored(stored);
        match self.packages.sync_image(target_id, &fields).await {
            Ok(true) => {
                debug!(package_id = %target_id, image_id = %stored.id, "linked image to package");
                None
            }
            Ok(false) => {
                warn!(package_id = %target_id, image_id = %stored.id, "image target package not found");
                Some(SyncWarning::TargetMissing { target_id })
            }
            Err(e) => {
                warn!(package_id = %target_id, image_id = %stored.id, "failed to link image: {e}");
                Some(SyncWarning::Failed {
                    target_id,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Look up a stored asset. Store errors are logged and reported as absent.
    pub async fn fetch(&self, id: ImageId) -> Option<ImageAsset> {
        match self.images.get(id).await {
            Ok(asset) => asset,
            Err(e) => {
                error!(image_id = %id, "failed to load image: {e}");
                None
            }
        }
    }

    /// [`fetch`](Self::fetch) for an id taken from a URL; unparsable ids are absent.
    pub async fn fetch_by_key(&self, key: &str) -> Option<ImageAsset> {
        let id = key.parse::<ImageId>().ok()?;
        self.fetch(id).await
    }

    /// Delete a stored asset. Returns `true` only when a record was removed.
    pub async fn remove(&self, id: ImageId) -> bool {
        match self.images.delete(id).await {
            Ok(removed) => {
                if removed {
                    info!(image_id = %id, "deleted image");
                }
                removed
            }
            Err(e) => {
                error!(image_id = %id, "failed to delete image: {e}");
                false
            }
        }
    }

    pub async fn remove_by_key(&self, key: &str) -> bool {
        match key.parse::<ImageId>() {
            Ok(id) => self.remove(id).await,
            Err(_) => false,
        }
    }
}

/// `{tag}-{unix_millis}-{6 random alphanumerics}.{ext}`
fn generate_filename(destination: &str, unix_millis: i64, extension: &str) -> String {
    let tag: String = destination
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let tag = tag.trim_matches('-');
    let tag = if tag.is_empty() { "image" } else { tag };

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    format!("{tag}-{unix_millis}-{suffix}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CatalogError, Result,
        database::memory::{InMemoryImageStore, InMemoryPackageRepository},
        types::{Destination, Package, PackageDraft},
    };
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    struct UnavailableStore;

    #[async_trait]
    impl ImageStore for UnavailableStore {
        async fn insert(&self, _image: NewImageAsset) -> Result<ImageAsset> {
            Err(CatalogError::Internal("object store offline".into()))
        }

        async fn get(&self, _id: ImageId) -> Result<Option<ImageAsset>> {
            Err(CatalogError::Internal("object store offline".into()))
        }

        async fn delete(&self, _id: ImageId) -> Result<bool> {
            Err(CatalogError::Internal("object store offline".into()))
        }
    }

    struct Fixture {
        images: Arc<InMemoryImageStore>,
        packages: Arc<InMemoryPackageRepository>,
        ingestor: ImageIngestor,
    }

    fn fixture() -> Fixture {
        let images = Arc::new(InMemoryImageStore::new());
        let packages = Arc::new(InMemoryPackageRepository::new());
        let ingestor = ImageIngestor::new(
            images.clone(),
            packages.clone(),
            Arc::new(FallbackTable::builtin()),
            IngestPolicy::default(),
        );
        Fixture {
            images,
            packages,
            ingestor,
        }
    }

    fn png_payload(bytes: &[u8]) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    fn request(image: &str, destination: &str) -> IngestRequest {
        IngestRequest::new(Some(image.to_string()), destination)
    }

    #[tokio::test]
    async fn empty_input_uses_destination_fallback_without_writing() {
        let fx = fixture();

        for image in [None, Some(String::new()), Some("   ".to_string())] {
            let outcome = fx.ingestor.ingest(IngestRequest::new(image, "dubai")).await;
            assert_eq!(outcome.reference.as_str(), "/images/fallback/dubai.jpg");
            assert_eq!(outcome.fallback, Some(FallbackReason::Empty));
        }
        assert!(fx.images.is_empty());
    }

    #[tokio::test]
    async fn inline_png_is_stored_and_retrievable() {
        let fx = fixture();
        let bytes: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();

        let outcome = fx.ingestor.ingest(request(&png_payload(&bytes), "bali")).await;

        let id = outcome.reference.image_id().expect("stored reference");
        assert_eq!(outcome.reference.as_str(), format!("/api/images/{id}"));
        assert_eq!(outcome.fallback, None);

        let asset = fx.ingestor.fetch(id).await.expect("asset stored");
        assert_eq!(asset.data, bytes);
        assert_eq!(asset.content_type, "image/png");
        assert_eq!(asset.size_bytes, 1024);
        assert_eq!(asset.origin, "bali");
        assert_eq!(asset.uploaded_by, "admin");
        assert!(asset.filename.starts_with("bali-"));
        assert!(asset.filename.ends_with(".png"));

        let stored = outcome.stored.expect("stored metadata");
        assert_eq!(stored.id, id);
        assert_eq!(stored.filename, asset.filename);
    }

    #[tokio::test]
    async fn oversized_payload_falls_back_without_writing() {
        let fx = fixture();
        let raw = png_payload(&vec![0u8; 6 * 1024 * 1024]);

        for _ in 0..2 {
            let outcome = fx.ingestor.ingest(request(&raw, "unknownplace")).await;
            assert_eq!(outcome.reference.as_str(), DEFAULT_FALLBACK);
            assert_eq!(outcome.fallback, Some(FallbackReason::Oversized));
        }
        assert!(fx.images.is_empty());
    }

    #[tokio::test]
    async fn payload_at_ceiling_is_accepted() {
        let fx = fixture();
        let raw = png_payload(&vec![1u8; DEFAULT_MAX_KB * 1024]);

        let outcome = fx.ingestor.ingest(request(&raw, "bali")).await;
        assert!(outcome.stored.is_some());
        assert_eq!(fx.images.len(), 1);
    }

    #[tokio::test]
    async fn payload_one_byte_over_ceiling_falls_back() {
        let fx = fixture();
        let raw = png_payload(&vec![1u8; DEFAULT_MAX_KB * 1024 + 1]);

        let outcome = fx.ingestor.ingest(request(&raw, "bali")).await;
        assert_eq!(outcome.reference.as_str(), "/images/fallback/bali.jpg");
        assert_eq!(outcome.fallback, Some(FallbackReason::Oversized));
        assert!(fx.images.is_empty());
    }

    #[tokio::test]
    async fn malformed_inline_payload_falls_back() {
        let fx = fixture();

        for raw in [
            "data:image/png;base64,%%%not-base64%%%",
            "data:image/png,plain",
            "data:image;base64,AAAA",
        ] {
            let outcome = fx.ingestor.ingest(request(raw, "bali")).await;
            assert_eq!(outcome.reference.as_str(), "/images/fallback/bali.jpg", "{raw}");
            assert_eq!(outcome.fallback, Some(FallbackReason::Malformed));
        }
        assert!(fx.images.is_empty());
    }

    #[tokio::test]
    async fn paths_are_normalized_and_placeholders_fall_back() {
        let fx = fixture();

        let cases = [
            ("/images/bali/beach.jpg", "/images/bali/beach.jpg"),
            ("/img/a.jpg?v=2", "/img/a.jpg"),
            ("img/a.jpg", "/img/a.jpg"),
            ("https://cdn.example.com/a.jpg", "https://cdn.example.com/a.jpg"),
        ];
        for (raw, expected) in cases {
            let outcome = fx.ingestor.ingest(request(raw, "bali")).await;
            assert_eq!(outcome.reference.as_str(), expected);
            assert_eq!(outcome.fallback, None);
        }

        for raw in ["/", "null", "/null", "undefined", "/undefined"] {
            let outcome = fx.ingestor.ingest(request(raw, "thailand")).await;
            assert_eq!(outcome.reference.as_str(), "/images/fallback/thailand.jpg");
            assert_eq!(outcome.fallback, Some(FallbackReason::Placeholder));
        }
        assert!(fx.images.is_empty());
    }

    #[tokio::test]
    async fn store_failure_degrades_to_fallback() {
        let ingestor = ImageIngestor::new(
            Arc::new(UnavailableStore),
            Arc::new(InMemoryPackageRepository::new()),
            Arc::new(FallbackTable::builtin()),
            IngestPolicy::default(),
        );

        let outcome = ingestor.ingest(request(&png_payload(b"abc"), "maldives")).await;
        assert_eq!(outcome.reference.as_str(), "/images/fallback/maldives.jpg");
        assert_eq!(outcome.fallback, Some(FallbackReason::StoreFailed));

        assert!(ingestor.fetch(ImageId::new()).await.is_none());
        assert!(!ingestor.remove(ImageId::new()).await);
    }

    #[tokio::test]
    async fn target_package_receives_image_columns() {
        let fx = fixture();
        let destination = Destination::parse("bali").unwrap();
        let draft = PackageDraft {
            name: "Ubud Retreat".into(),
            price: 1200.0,
            ..Default::default()
        };
        let package = Package::from_draft(
            destination,
            draft,
            ImageFields::from_reference(ImageReference::path("/images/fallback/bali.jpg")),
            Utc::now(),
        );
        fx.packages.insert(&package).await.unwrap();

        let outcome = fx
            .ingestor
            .ingest(request(&png_payload(b"new cover"), "bali").with_target(package.id))
            .await;
        assert_eq!(outcome.sync_warning, None);

        let updated = fx.packages.get(package.id).await.unwrap().unwrap();
        let stored = outcome.stored.unwrap();
        assert_eq!(updated.cover.image, outcome.reference);
        assert_eq!(updated.cover.image_id, Some(stored.id));
        assert_eq!(updated.cover.image_type.as_deref(), Some("image/png"));
        assert_eq!(updated.cover.image_size, Some(9));
    }

    #[tokio::test]
    async fn missing_target_is_reported_but_image_kept() {
        let fx = fixture();
        let target_id = PackageId::new();

        let outcome = fx
            .ingestor
            .ingest(request(&png_payload(b"orphan"), "bali").with_target(target_id))
            .await;

        assert_eq!(outcome.sync_warning, Some(SyncWarning::TargetMissing { target_id }));
        let id = outcome.reference.image_id().unwrap();
        assert!(fx.ingestor.fetch(id).await.is_some());
    }

    #[tokio::test]
    async fn remove_then_fetch_reports_absent() {
        let fx = fixture();
        let outcome = fx.ingestor.ingest(request(&png_payload(b"gone"), "bali")).await;
        let id = outcome.reference.image_id().unwrap();

        assert!(fx.ingestor.remove(id).await);
        assert!(fx.ingestor.fetch(id).await.is_none());
        assert!(!fx.ingestor.remove(id).await);
        assert!(fx.ingestor.fetch_by_key("not-a-uuid").await.is_none());
        assert!(!fx.ingestor.remove_by_key("not-a-uuid").await);
    }

    #[test]
    fn filenames_follow_tag_time_suffix_pattern() {
        let name = generate_filename("Bali Island", 1_700_000_000_000, "png");
        let parts: Vec<&str> = name.rsplitn(2, '.').collect();
        assert_eq!(parts[0], "png");
        let stem = parts[1];
        assert!(stem.starts_with("bali-island-1700000000000-"));
        let suffix = stem.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));

        assert!(generate_filename("", 1, "jpg").starts_with("image-1-"));
    }
}

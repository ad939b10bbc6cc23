use async_trait::async_trait;

use crate::{
    Result,
    types::{Destination, ImageFields, Package, PackageId},
};

/// Image columns written onto an existing package after an upload.
pub type ImageSync = ImageFields;

#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Packages for one destination, newest first.
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Package>>;

    async fn get(&self, id: PackageId) -> Result<Option<Package>>;

    async fn insert(&self, package: &Package) -> Result<()>;

    /// Replace a stored package. Returns `false` when the id is unknown.
    async fn update(&self, package: &Package) -> Result<bool>;

    /// Remove a package and hand back what was stored.
    async fn delete(&self, id: PackageId) -> Result<Option<Package>>;

    /// Single-write update of the image columns only. Returns `false` when no
    /// row matched the id.
    async fn sync_image(&self, id: PackageId, image: &ImageSync) -> Result<bool>;
}

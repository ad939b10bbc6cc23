use async_trait::async_trait;

use crate::{
    Result,
    types::{ImageAsset, ImageId, NewImageAsset},
};

/// Binary object store for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist a new asset; the store assigns its id.
    async fn insert(&self, image: NewImageAsset) -> Result<ImageAsset>;

    async fn get(&self, id: ImageId) -> Result<Option<ImageAsset>>;

    /// Returns `false` when no asset had this id.
    async fn delete(&self, id: ImageId) -> Result<bool>;
}

//! Process-local adapters backed by `parking_lot` maps.
//!
//! Used by tests and by the server when no database URL is configured. Every
//! instance owns its own maps, so parallel tests never share state.

use std::{cmp::Reverse, collections::HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::ports::{ImageStore, ImageSync, ItineraryRepository, PackageRepository};
use crate::{
    Result,
    types::{
        Destination, ImageAsset, ImageId, Itinerary, ItineraryId, NewImageAsset, Package,
        PackageId,
    },
};

#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    images: RwLock<HashMap<ImageId, ImageAsset>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn insert(&self, image: NewImageAsset) -> Result<ImageAsset> {
        let asset = image.into_asset(ImageId::new());
        self.images.write().insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn get(&self, id: ImageId) -> Result<Option<ImageAsset>> {
        Ok(self.images.read().get(&id).cloned())
    }

    async fn delete(&self, id: ImageId) -> Result<bool> {
        Ok(self.images.write().remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPackageRepository {
    packages: RwLock<HashMap<PackageId, Package>>,
}

impl InMemoryPackageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Package>> {
        let mut packages: Vec<Package> = self
            .packages
            .read()
            .values()
            .filter(|p| &p.destination == destination)
            .cloned()
            .collect();
        packages.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(packages)
    }

    async fn get(&self, id: PackageId) -> Result<Option<Package>> {
        Ok(self.packages.read().get(&id).cloned())
    }

    async fn insert(&self, package: &Package) -> Result<()> {
        self.packages.write().insert(package.id, package.clone());
        Ok(())
    }

    async fn update(&self, package: &Package) -> Result<bool> {
        let mut packages = self.packages.write();
        match packages.get_mut(&package.id) {
            Some(existing) => {
                *existing = package.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: PackageId) -> Result<Option<Package>> {
        Ok(self.packages.write().remove(&id))
    }

    async fn sync_image(&self, id: PackageId, image: &ImageSync) -> Result<bool> {
        let mut packages = self.packages.write();
        match packages.get_mut(&id) {
            Some(existing) => {
                existing.cover = image.clone();
                existing.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryItineraryRepository {
    itineraries: RwLock<HashMap<ItineraryId, Itinerary>>,
}

impl InMemoryItineraryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryRepository for InMemoryItineraryRepository {
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Itinerary>> {
        let mut itineraries: Vec<Itinerary> = self
            .itineraries
            .read()
            .values()
            .filter(|i| &i.destination == destination)
            .cloned()
            .collect();
        itineraries.sort_by_key(|i| Reverse((i.created_at, i.id)));
        Ok(itineraries)
    }

    async fn get(&self, id: ItineraryId) -> Result<Option<Itinerary>> {
        Ok(self.itineraries.read().get(&id).cloned())
    }

    async fn insert(&self, itinerary: &Itinerary) -> Result<()> {
        self.itineraries
            .write()
            .insert(itinerary.id, itinerary.clone());
        Ok(())
    }

    async fn update(&self, itinerary: &Itinerary) -> Result<bool> {
        let mut itineraries = self.itineraries.write();
        match itineraries.get_mut(&itinerary.id) {
            Some(existing) => {
                *existing = itinerary.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ItineraryId) -> Result<Option<Itinerary>> {
        Ok(self.itineraries.write().remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::types::{ImageFields, ImageReference, PackageDraft};

    fn package(destination: &str, name: &str, age_minutes: i64) -> Package {
        let mut package = Package::from_draft(
            Destination::parse(destination).unwrap(),
            PackageDraft {
                name: name.into(),
                price: 100.0,
                ..Default::default()
            },
            ImageFields::from_reference(ImageReference::path("/images/x.jpg")),
            Utc::now() - Duration::minutes(age_minutes),
        );
        package.updated_at = package.created_at;
        package
    }

    #[tokio::test]
    async fn lists_only_matching_destination_newest_first() {
        let repo = InMemoryPackageRepository::new();
        repo.insert(&package("bali", "old", 30)).await.unwrap();
        repo.insert(&package("bali", "new", 1)).await.unwrap();
        repo.insert(&package("dubai", "other", 5)).await.unwrap();

        let bali = Destination::parse("bali").unwrap();
        let names: Vec<String> = repo
            .list_by_destination(&bali)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["new".to_string(), "old".to_string()]);
    }

    #[tokio::test]
    async fn sync_image_reports_unmatched_ids() {
        let repo = InMemoryPackageRepository::new();
        let stored = package("bali", "with image", 0);
        repo.insert(&stored).await.unwrap();

        let id = ImageId::new();
        let sync = ImageFields {
            image: ImageReference::stored(id),
            image_type: Some("image/png".into()),
            image_id: Some(id),
            image_filename: Some("bali.png".into()),
            image_size: Some(10),
        };

        assert!(repo.sync_image(stored.id, &sync).await.unwrap());
        assert!(!repo.sync_image(PackageId::new(), &sync).await.unwrap());

        let reloaded = repo.get(stored.id).await.unwrap().unwrap();
        assert_eq!(reloaded.cover, sync);
    }

    #[tokio::test]
    async fn image_delete_is_reported_once() {
        let store = InMemoryImageStore::new();
        let asset = store
            .insert(NewImageAsset {
                data: vec![1, 2, 3],
                content_type: "image/png".into(),
                origin: "bali".into(),
                filename: "a.png".into(),
                uploaded_by: "admin".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(asset.size_bytes, 3);
        assert!(store.delete(asset.id).await.unwrap());
        assert!(!store.delete(asset.id).await.unwrap());
        assert!(store.get(asset.id).await.unwrap().is_none());
    }
}

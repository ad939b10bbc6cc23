use std::{
    any::type_name_of_val,
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

#[cfg(feature = "database")]
use crate::database::postgres::PostgresDatabase;
use crate::{
    database::{
        memory::{InMemoryImageStore, InMemoryItineraryRepository, InMemoryPackageRepository},
        ports::{ImageStore, ItineraryRepository, PackageRepository},
    },
    error::{CatalogError, Result},
    ingest::{
        FallbackReason, FallbackTable, ImageIngestor, IngestOutcome, IngestPolicy, IngestRequest,
    },
    types::{
        Destination, ImageId, Itinerary, ItineraryDay,
        ItineraryDraft, ItineraryId, Package, PackageDraft, PackageId,
    },
};

/// Repository ports the catalog service works against.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub images: Arc<dyn ImageStore>,
    pub packages: Arc<dyn PackageRepository>,
    pub itineraries: Arc<dyn ItineraryRepository>,
}

impl fmt::Debug for CatalogRepositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRepositories")
            .field("images", &type_name_of_val(self.images.as_ref()))
            .field("packages", &type_name_of_val(self.packages.as_ref()))
            .field("itineraries", &type_name_of_val(self.itineraries.as_ref()))
            .finish()
    }
}

impl CatalogRepositories {
    /// Process-local storage for development and tests.
    pub fn in_memory() -> Self {
        Self {
            images: Arc::new(InMemoryImageStore::new()),
            packages: Arc::new(InMemoryPackageRepository::new()),
            itineraries: Arc::new(InMemoryItineraryRepository::new()),
        }
    }

    #[cfg(feature = "database")]
    pub fn postgres(db: &PostgresDatabase) -> Self {
        Self {
            images: Arc::new(db.images()),
            packages: Arc::new(db.packages()),
            itineraries: Arc::new(db.itineraries()),
        }
    }
}

/// Result of a create or update.
#[derive(Debug, Clone)]
pub struct Saved<T> {
    pub record: T,
    /// How the cover image was resolved; `None` when it was left unchanged.
    pub image: Option<IngestOutcome>,
    /// Non-fatal problems an admin should see.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted<Id> {
    pub id: Id,
    /// Stored images owned by the record that were removed with it.
    pub images_removed: usize,
}

/// Package and itinerary operations scoped by destination.
///
/// Images supplied with a record go through the [`ImageIngestor`] before the
/// record is written, so every saved record carries a displayable image.
#[derive(Clone, Debug)]
pub struct Catalog {
    repos: CatalogRepositories,
    ingestor: ImageIngestor,
}

impl Catalog {
    pub fn new(repos: CatalogRepositories, fallbacks: FallbackTable, policy: IngestPolicy) -> Self {
        let ingestor = ImageIngestor::new(
            repos.images.clone(),
            repos.packages.clone(),
            Arc::new(fallbacks),
            policy,
        );
        Self { repos, ingestor }
    }

    pub fn ingestor(&self) -> &ImageIngestor {
        &self.ingestor
    }

    pub fn repositories(&self) -> &CatalogRepositories {
        &self.repos
    }

    pub async fn list_packages(&self, destination: &Destination) -> Result<Vec<Package>> {
        self.repos.packages.list_by_destination(destination).await
    }

    /// Records under another destination are reported as missing.
    pub async fn get_package(&self, destination: &Destination, id: PackageId) -> Result<Package> {
        match self.repos.packages.get(id).await? {
            Some(package) if &package.destination == destination => Ok(package),
            _ => Err(CatalogError::not_found(format!(
                "package {id} in {destination}"
            ))),
        }
    }

    pub async fn create_package(
        &self,
        destination: &Destination,
        mut draft: PackageDraft,
    ) -> Result<Saved<Package>> {
        draft.validate()?;

        let outcome = self
            .ingestor
            .ingest(IngestRequest::new(draft.image.take(), destination.as_str()))
            .await;
        let package =
            Package::from_draft(destination.clone(), draft, outcome.image_fields(), Utc::now());

        if let Err(e) = self.repos.packages.insert(&package).await {
            self.release_images(outcome.stored.iter().map(|s| s.id).collect::<Vec<_>>(), &HashSet::new())
                .await;
            return Err(e);
        }

        info!(package_id = %package.id, %destination, "package created");
        Ok(Saved {
            record: package,
            warnings: outcome_warnings(&outcome),
            image: Some(outcome),
        })
    }

    /// Full update. An absent `image` keeps the current cover; a new inline
    /// image is linked to the package as soon as it is stored.
    pub async fn update_package(
        &self,
        destination: &Destination,
        id: PackageId,
        mut draft: PackageDraft,
    ) -> Result<Saved<Package>> {
        draft.validate()?;
        let mut package = self.get_package(destination, id).await?;
        let previous = package.cover.owned_image();

        let outcome = match draft.image.take() {
            Some(raw) if raw.trim() != package.cover.image.as_str() => {
                let request =
                    IngestRequest::new(Some(raw), destination.as_str()).with_target(package.id);
                Some(self.ingestor.ingest(request).await)
            }
            _ => None,
        };

        package.apply(draft, Utc::now());
        if let Some(outcome) = &outcome {
            package.cover = outcome.image_fields();
        }

        if !self.repos.packages.update(&package).await? {
            return Err(CatalogError::not_found(format!("package {id} in {destination}")));
        }

        let keep: HashSet<ImageId> = package.cover.owned_image().into_iter().collect();
        self.release_images(previous, &keep).await;

        info!(package_id = %package.id, %destination, "package updated");
        Ok(Saved {
            warnings: outcome.as_ref().map(outcome_warnings).unwrap_or_default(),
            record: package,
            image: outcome,
        })
    }

    pub async fn delete_package(
        &self,
        destination: &Destination,
        id: PackageId,
    ) -> Result<Deleted<PackageId>> {
        self.get_package(destination, id).await?;
        let package = self
            .repos
            .packages
            .delete(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("package {id} in {destination}")))?;

        let images_removed = self
            .release_images(package.cover.owned_image(), &HashSet::new())
            .await;

        info!(package_id = %id, %destination, images_removed, "package deleted");
        Ok(Deleted { id, images_removed })
    }

    pub async fn list_itineraries(&self, destination: &Destination) -> Result<Vec<Itinerary>> {
        self.repos.itineraries.list_by_destination(destination).await
    }

    pub async fn get_itinerary(
        &self,
        destination: &Destination,
        id: ItineraryId,
    ) -> Result<Itinerary> {
        match self.repos.itineraries.get(id).await? {
            Some(itinerary) if &itinerary.destination == destination => Ok(itinerary),
            _ => Err(CatalogError::not_found(format!(
                "itinerary {id} in {destination}"
            ))),
        }
    }

    pub async fn create_itinerary(
        &self,
        destination: &Destination,
        mut draft: ItineraryDraft,
    ) -> Result<Saved<Itinerary>> {
        draft.validate()?;

        let outcome = self
            .ingestor
            .ingest(IngestRequest::new(draft.image.take(), destination.as_str()))
            .await;
        let mut warnings = outcome_warnings(&outcome);
        draft.days = self
            .ingest_days(destination, draft.days, &HashMap::new(), &mut warnings)
            .await;

        let itinerary =
            Itinerary::from_draft(destination.clone(), draft, outcome.image_fields(), Utc::now());

        if let Err(e) = self.repos.itineraries.insert(&itinerary).await {
            self.release_images(itinerary_images(&itinerary), &HashSet::new())
                .await;
            return Err(e);
        }

        info!(itinerary_id = %itinerary.id, %destination, "itinerary created");
        Ok(Saved {
            record: itinerary,
            image: Some(outcome),
            warnings,
        })
    }

    /// Full update. Itinerary image columns are written by the record update
    /// itself, so no separate link step runs.
    pub async fn update_itinerary(
        &self,
        destination: &Destination,
        id: ItineraryId,
        mut draft: ItineraryDraft,
    ) -> Result<Saved<Itinerary>> {
        draft.validate()?;
        let mut itinerary = self.get_itinerary(destination, id).await?;
        let previous = itinerary_images(&itinerary);

        let outcome = match draft.image.take() {
            Some(raw) if raw.trim() != itinerary.cover.image.as_str() => Some(
                self.ingestor
                    .ingest(IngestRequest::new(Some(raw), destination.as_str()))
                    .await,
            ),
            _ => None,
        };
        let mut warnings = outcome.as_ref().map(outcome_warnings).unwrap_or_default();
        let owned_days = owned_day_images(&itinerary);
        draft.days = self
            .ingest_days(destination, draft.days, &owned_days, &mut warnings)
            .await;

        itinerary.apply(draft, Utc::now());
        if let Some(outcome) = &outcome {
            itinerary.cover = outcome.image_fields();
        }

        if !self.repos.itineraries.update(&itinerary).await? {
            return Err(CatalogError::not_found(format!(
                "itinerary {id} in {destination}"
            )));
        }

        let keep: HashSet<ImageId> = itinerary_images(&itinerary).into_iter().collect();
        self.release_images(previous, &keep).await;

        info!(itinerary_id = %itinerary.id, %destination, "itinerary updated");
        Ok(Saved {
            record: itinerary,
            image: outcome,
            warnings,
        })
    }

    pub async fn delete_itinerary(
        &self,
        destination: &Destination,
        id: ItineraryId,
    ) -> Result<Deleted<ItineraryId>> {
        self.get_itinerary(destination, id).await?;
        let itinerary = self
            .repos
            .itineraries
            .delete(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("itinerary {id} in {destination}")))?;

        let images_removed = self
            .release_images(itinerary_images(&itinerary), &HashSet::new())
            .await;

        info!(itinerary_id = %id, %destination, images_removed, "itinerary deleted");
        Ok(Deleted { id, images_removed })
    }

    /// Day images are optional: blank values are dropped rather than replaced
    /// by the destination fallback. Values in `owned` are day images this
    /// itinerary already stored; they keep their id instead of being ingested
    /// again. Client-supplied ids are ignored.
    async fn ingest_days(
        &self,
        destination: &Destination,
        days: Vec<ItineraryDay>,
        owned: &HashMap<String, ImageId>,
        warnings: &mut Vec<String>,
    ) -> Vec<ItineraryDay> {
        let mut resolved = Vec::with_capacity(days.len());
        for mut day in days {
            day.image_id = None;
            let raw = day
                .image
                .take()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty());

            if let Some(raw) = raw {
                if let Some(id) = owned.get(&raw) {
                    day.image_id = Some(*id);
                    day.image = Some(raw);
                } else {
                    let outcome = self
                        .ingestor
                        .ingest(IngestRequest::new(Some(raw), destination.as_str()))
                        .await;
                    warnings.extend(
                        outcome_warnings(&outcome)
                            .into_iter()
                            .map(|w| format!("day {}: {w}", day.day)),
                    );
                    day.image_id = outcome.stored.as_ref().map(|stored| stored.id);
                    day.image = Some(outcome.reference.into_string());
                }
            }
            resolved.push(day);
        }
        resolved
    }

    /// Best-effort removal of stored images that are no longer referenced.
    async fn release_images(
        &self,
        ids: impl IntoIterator<Item = ImageId>,
        keep: &HashSet<ImageId>,
    ) -> usize {
        let mut removed = 0;
        for id in ids {
            if keep.contains(&id) {
                continue;
            }
            if self.ingestor.remove(id).await {
                removed += 1;
            } else {
                warn!(image_id = %id, "stored image was not removed");
            }
        }
        removed
    }
}

fn itinerary_images(itinerary: &Itinerary) -> Vec<ImageId> {
    let mut ids: Vec<ImageId> = itinerary.cover.owned_image().into_iter().collect();
    ids.extend(itinerary.days.iter().filter_map(|day| day.image_id));
    ids
}

/// Day image references this itinerary stored, keyed by reference.
fn owned_day_images(itinerary: &Itinerary) -> HashMap<String, ImageId> {
    itinerary
        .days
        .iter()
        .filter_map(|day| Some((day.image.clone()?, day.image_id?)))
        .collect()
}

fn outcome_warnings(outcome: &IngestOutcome) -> Vec<String> {
    let mut warnings = Vec::new();
    match outcome.fallback {
        Some(FallbackReason::Malformed) => {
            warnings.push("image could not be decoded; fallback image used".to_string())
        }
        Some(FallbackReason::Oversized) => {
            warnings.push("image exceeds the size limit; fallback image used".to_string())
        }
        Some(FallbackReason::StoreFailed) => {
            warnings.push("image could not be stored; fallback image used".to_string())
        }
        Some(FallbackReason::Empty | FallbackReason::Placeholder) | None => {}
    }
    if let Some(sync) = &outcome.sync_warning {
        warnings.push(sync.to_string());
    }
    warnings
}

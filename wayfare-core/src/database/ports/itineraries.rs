use async_trait::async_trait;

use crate::{
    Result,
    types::{Destination, Itinerary, ItineraryId},
};

#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    /// Itineraries for one destination, newest first.
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Itinerary>>;

    async fn get(&self, id: ItineraryId) -> Result<Option<Itinerary>>;

    async fn insert(&self, itinerary: &Itinerary) -> Result<()>;

    /// Replace a stored itinerary. Returns `false` when the id is unknown.
    async fn update(&self, itinerary: &Itinerary) -> Result<bool>;

    async fn delete(&self, id: ItineraryId) -> Result<Option<Itinerary>>;
}

pub mod destination;
pub mod ids;
pub mod image;
pub mod itinerary;
pub mod package;

pub use destination::Destination;
pub use ids::{ImageId, ItineraryId, PackageId};
pub use image::{
    IMAGE_ROUTE_PREFIX, ImageAsset, ImageFields, ImageReference, NewImageAsset, StoredImage,
};
pub use itinerary::{Itinerary, ItineraryDay, ItineraryDraft};
pub use package::{MAX_RATING, Package, PackageDraft};

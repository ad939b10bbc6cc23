//! Repository ports (interfaces) grouped by record type.
//!
//! Application code depends on these traits only; Postgres and in-memory
//! adapters live beside them in [`crate::database`].

pub mod images;
pub mod itineraries;
pub mod packages;

pub use images::ImageStore;
pub use itineraries::ItineraryRepository;
pub use packages::{ImageSync, PackageRepository};

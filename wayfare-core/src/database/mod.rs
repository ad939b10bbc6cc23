//! Persistence: repository ports plus the adapters that implement them.

pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{InMemoryImageStore, InMemoryItineraryRepository, InMemoryPackageRepository};
pub use ports::{ImageStore, ImageSync, ItineraryRepository, PackageRepository};
#[cfg(feature = "database")]
pub use postgres::{
    PostgresDatabase, PostgresImageStore, PostgresItineraryRepository, PostgresPackageRepository,
};

//! # Wayfare Core
//!
//! Domain types and services behind the Wayfare travel back-office: travel
//! packages and itineraries per destination, and the image pipeline that
//! keeps every record pointing at something displayable.
//!
//! ## Overview
//!
//! - **Catalog records**: [`types::Package`], [`types::Itinerary`] and their drafts
//! - **Image ingestion**: [`ingest::ImageIngestor`] turns inline uploads, paths
//!   and URLs into an [`types::ImageReference`], falling back per destination
//! - **City filters**: [`city_filters::CityFilterRegistry`], process-lifetime lists
//! - **Persistence**: repository ports with Postgres and in-memory adapters
//!
//! ## Feature Flags
//!
//! - `database`: Postgres adapters and embedded migrations (SQLx)
//! - `postgres-tests`: runs the adapter tests against `DATABASE_URL`
//!
//! ## Examples
//!
//! ```no_run
//! use wayfare_core::{
//!     catalog::{Catalog, CatalogRepositories},
//!     ingest::{FallbackTable, IngestPolicy},
//!     types::{Destination, PackageDraft},
//! };
//!
//! async fn add_package() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new(
//!         CatalogRepositories::in_memory(),
//!         FallbackTable::builtin(),
//!         IngestPolicy::default(),
//!     );
//!     let bali = Destination::parse("bali")?;
//!     let draft = PackageDraft {
//!         name: "Bali Bliss".to_string(),
//!         price: 899.0,
//!         ..Default::default()
//!     };
//!     let saved = catalog.create_package(&bali, draft).await?;
//!     println!("cover image: {}", saved.record.cover.image);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Package and itinerary operations scoped by destination
pub mod catalog;

/// In-memory city filter lists
pub mod city_filters;

/// Repository ports and their Postgres / in-memory adapters
pub mod database;

/// Error types
pub mod error;

/// Image ingestion pipeline and fallback table
pub mod ingest;

/// Domain records and identifiers
pub mod types;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use catalog::{Catalog, CatalogRepositories, Deleted, Saved};
pub use city_filters::{CityFilterRegistry, CityFilters};
pub use error::{CatalogError, Result};
pub use ingest::{
    FallbackReason, FallbackTable, ImageIngestor, IngestOutcome, IngestPolicy, IngestRequest,
    SyncWarning,
};

#![cfg(feature = "postgres-tests")]

use chrono::{Duration, Utc};
use sqlx::PgPool;
use wayfare_core::{
    database::{
        PostgresDatabase,
        ports::{ImageStore, ItineraryRepository, PackageRepository},
    },
    types::{
        Destination, ImageFields, ImageId, ImageReference, Itinerary, ItineraryDay,
        ItineraryDraft, NewImageAsset, Package, PackageDraft,
    },
};

fn bali() -> Destination {
    Destination::parse("bali").unwrap()
}

fn package(name: &str) -> Package {
    Package::from_draft(
        bali(),
        PackageDraft {
            name: name.into(),
            price: 640.0,
            duration: "4D/3N".into(),
            category: "adventure".into(),
            package_type: "international".into(),
            rating: 4.0,
            description: Some("Volcano sunrise trek".into()),
            image: None,
        },
        ImageFields::from_reference(ImageReference::path("/images/fallback/bali.jpg")),
        Utc::now(),
    )
}

#[sqlx::test(migrator = "wayfare_core::MIGRATOR")]
async fn image_assets_round_trip(pool: PgPool) {
    let store = PostgresDatabase::from_pool(pool).images();

    let asset = store
        .insert(NewImageAsset {
            data: vec![0x89, 0x50, 0x4E, 0x47],
            content_type: "image/png".into(),
            origin: "bali".into(),
            filename: "bali-1-abcdef.png".into(),
            uploaded_by: "admin".into(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let loaded = store.get(asset.id).await.unwrap().expect("asset present");
    assert_eq!(loaded.data, vec![0x89, 0x50, 0x4E, 0x47]);
    assert_eq!(loaded.size_bytes, 4);
    assert_eq!(loaded.content_type, "image/png");

    assert!(store.delete(asset.id).await.unwrap());
    assert!(store.get(asset.id).await.unwrap().is_none());
    assert!(!store.delete(asset.id).await.unwrap());
}

#[sqlx::test(migrator = "wayfare_core::MIGRATOR")]
async fn packages_list_newest_first_and_sync_image(pool: PgPool) {
    let repo = PostgresDatabase::from_pool(pool).packages();

    let mut older = package("Older");
    older.created_at = Utc::now() - Duration::hours(1);
    let newer = package("Newer");
    repo.insert(&older).await.unwrap();
    repo.insert(&newer).await.unwrap();

    let listed = repo.list_by_destination(&bali()).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Newer", "Older"]);

    let image_id = ImageId::new();
    let sync = ImageFields {
        image: ImageReference::stored(image_id),
        image_type: Some("image/webp".into()),
        image_id: Some(image_id),
        image_filename: Some("bali-2-zyxwvu.webp".into()),
        image_size: Some(2048),
    };
    assert!(repo.sync_image(older.id, &sync).await.unwrap());
    assert!(!repo.sync_image(wayfare_core::types::PackageId::new(), &sync).await.unwrap());

    let synced = repo.get(older.id).await.unwrap().unwrap();
    assert_eq!(synced.cover, sync);
    assert_eq!(synced.name, "Older");

    let deleted = repo.delete(newer.id).await.unwrap().expect("row returned");
    assert_eq!(deleted.name, "Newer");
    assert!(repo.get(newer.id).await.unwrap().is_none());
}

#[sqlx::test(migrator = "wayfare_core::MIGRATOR")]
async fn itineraries_keep_days_and_highlights(pool: PgPool) {
    let repo = PostgresDatabase::from_pool(pool).itineraries();

    let mut itinerary = Itinerary::from_draft(
        bali(),
        ItineraryDraft {
            title: "Temples & Rice Terraces".into(),
            duration: "3 days".into(),
            highlights: vec!["Tegallalang".into(), "Tanah Lot".into()],
            days: vec![ItineraryDay {
                day: 1,
                title: "Ubud".into(),
                description: "Monkey forest and market".into(),
                activities: vec!["Walk".into()],
                image: Some("/images/bali/ubud.jpg".into()),
                image_id: None,
            }],
            ..Default::default()
        },
        ImageFields::from_reference(ImageReference::path("/images/bali/cover.jpg")),
        Utc::now(),
    );
    repo.insert(&itinerary).await.unwrap();

    let loaded = repo.get(itinerary.id).await.unwrap().unwrap();
    assert_eq!(loaded.highlights, itinerary.highlights);
    assert_eq!(loaded.days, itinerary.days);

    itinerary.price = Some(450.0);
    assert!(repo.update(&itinerary).await.unwrap());
    let loaded = repo.get(itinerary.id).await.unwrap().unwrap();
    assert_eq!(loaded.price, Some(450.0));

    let other = Destination::parse("dubai").unwrap();
    assert!(repo.list_by_destination(&other).await.unwrap().is_empty());
}

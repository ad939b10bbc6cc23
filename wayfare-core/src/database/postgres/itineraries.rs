use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    Result,
    database::ports::ItineraryRepository,
    types::{
        Destination, ImageFields, ImageId, ImageReference, Itinerary, ItineraryDay, ItineraryId,
    },
};

const ITINERARY_COLUMNS: &str = "id, destination, title, subtitle, duration, price, image, \
     image_type, image_id, image_filename, image_size, highlights, days, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresItineraryRepository {
    pool: PgPool,
}

impl PostgresItineraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ItineraryRow {
    id: Uuid,
    destination: String,
    title: String,
    subtitle: Option<String>,
    duration: String,
    price: Option<f64>,
    image: String,
    image_type: Option<String>,
    image_id: Option<Uuid>,
    image_filename: Option<String>,
    image_size: Option<i64>,
    highlights: Json<Vec<String>>,
    days: Json<Vec<ItineraryDay>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItineraryRow> for Itinerary {
    fn from(row: ItineraryRow) -> Self {
        Itinerary {
            id: ItineraryId(row.id),
            destination: Destination::from_trusted(row.destination),
            title: row.title,
            subtitle: row.subtitle,
            duration: row.duration,
            price: row.price,
            cover: ImageFields {
                image: ImageReference::path(row.image),
                image_type: row.image_type,
                image_id: row.image_id.map(ImageId),
                image_filename: row.image_filename,
                image_size: row.image_size,
            },
            highlights: row.highlights.0,
            days: row.days.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ItineraryRepository for PostgresItineraryRepository {
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Itinerary>> {
        let sql = format!(
            "SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE destination = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ItineraryRow>(&sql)
            .bind(destination.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Itinerary::from).collect())
    }

    async fn get(&self, id: ItineraryId) -> Result<Option<Itinerary>> {
        let sql = format!("SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE id = $1");
        let row = sqlx::query_as::<_, ItineraryRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Itinerary::from))
    }

    async fn insert(&self, itinerary: &Itinerary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO itineraries (
                id, destination, title, subtitle, duration, price, image, image_type,
                image_id, image_filename, image_size, highlights, days, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(itinerary.id.to_uuid())
        .bind(itinerary.destination.as_str())
        .bind(&itinerary.title)
        .bind(&itinerary.subtitle)
        .bind(&itinerary.duration)
        .bind(itinerary.price)
        .bind(itinerary.cover.image.as_str())
        .bind(&itinerary.cover.image_type)
        .bind(itinerary.cover.image_id.map(|id| id.to_uuid()))
        .bind(&itinerary.cover.image_filename)
        .bind(itinerary.cover.image_size)
        .bind(Json(&itinerary.highlights))
        .bind(Json(&itinerary.days))
        .bind(itinerary.created_at)
        .bind(itinerary.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, itinerary: &Itinerary) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE itineraries SET
                destination = $2, title = $3, subtitle = $4, duration = $5, price = $6,
                image = $7, image_type = $8, image_id = $9, image_filename = $10,
                image_size = $11, highlights = $12, days = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(itinerary.id.to_uuid())
        .bind(itinerary.destination.as_str())
        .bind(&itinerary.title)
        .bind(&itinerary.subtitle)
        .bind(&itinerary.duration)
        .bind(itinerary.price)
        .bind(itinerary.cover.image.as_str())
        .bind(&itinerary.cover.image_type)
        .bind(itinerary.cover.image_id.map(|id| id.to_uuid()))
        .bind(&itinerary.cover.image_filename)
        .bind(itinerary.cover.image_size)
        .bind(Json(&itinerary.highlights))
        .bind(Json(&itinerary.days))
        .bind(itinerary.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: ItineraryId) -> Result<Option<Itinerary>> {
        let sql = format!("DELETE FROM itineraries WHERE id = $1 RETURNING {ITINERARY_COLUMNS}");
        let row = sqlx::query_as::<_, ItineraryRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Itinerary::from))
    }
}

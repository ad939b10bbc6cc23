use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    Result,
    database::ports::{ImageSync, PackageRepository},
    types::{Destination, ImageFields, ImageId, ImageReference, Package, PackageId},
};

const PACKAGE_COLUMNS: &str = "id, destination, name, price, duration, category, package_type, \
     rating, description, image, image_type, image_id, image_filename, image_size, \
     created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresPackageRepository {
    pool: PgPool,
}

impl PostgresPackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    destination: String,
    name: String,
    price: f64,
    duration: String,
    category: String,
    package_type: String,
    rating: f32,
    description: Option<String>,
    image: String,
    image_type: Option<String>,
    image_id: Option<Uuid>,
    image_filename: Option<String>,
    image_size: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PackageRow> for Package {
    fn from(row: PackageRow) -> Self {
        Package {
            id: PackageId(row.id),
            // Rows are only written from parsed destinations.
            destination: Destination::from_trusted(row.destination),
            name: row.name,
            price: row.price,
            duration: row.duration,
            category: row.category,
            package_type: row.package_type,
            rating: row.rating,
            description: row.description,
            cover: ImageFields {
                image: ImageReference::path(row.image),
                image_type: row.image_type,
                image_id: row.image_id.map(ImageId),
                image_filename: row.image_filename,
                image_size: row.image_size,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PackageRepository for PostgresPackageRepository {
    async fn list_by_destination(&self, destination: &Destination) -> Result<Vec<Package>> {
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE destination = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, PackageRow>(&sql)
            .bind(destination.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Package::from).collect())
    }

    async fn get(&self, id: PackageId) -> Result<Option<Package>> {
        let sql = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = $1");
        let row = sqlx::query_as::<_, PackageRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Package::from))
    }

    async fn insert(&self, package: &Package) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO packages (
                id, destination, name, price, duration, category, package_type,
                rating, description, image, image_type, image_id, image_filename,
                image_size, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(package.id.to_uuid())
        .bind(package.destination.as_str())
        .bind(&package.name)
        .bind(package.price)
        .bind(&package.duration)
        .bind(&package.category)
        .bind(&package.package_type)
        .bind(package.rating)
        .bind(&package.description)
        .bind(package.cover.image.as_str())
        .bind(&package.cover.image_type)
        .bind(package.cover.image_id.map(|id| id.to_uuid()))
        .bind(&package.cover.image_filename)
        .bind(package.cover.image_size)
        .bind(package.created_at)
        .bind(package.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(package_id = %package.id, destination = %package.destination, "package inserted");
        Ok(())
    }

    async fn update(&self, package: &Package) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE packages SET
                destination = $2, name = $3, price = $4, duration = $5, category = $6,
                package_type = $7, rating = $8, description = $9, image = $10,
                image_type = $11, image_id = $12, image_filename = $13, image_size = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(package.id.to_uuid())
        .bind(package.destination.as_str())
        .bind(&package.name)
        .bind(package.price)
        .bind(&package.duration)
        .bind(&package.category)
        .bind(&package.package_type)
        .bind(package.rating)
        .bind(&package.description)
        .bind(package.cover.image.as_str())
        .bind(&package.cover.image_type)
        .bind(package.cover.image_id.map(|id| id.to_uuid()))
        .bind(&package.cover.image_filename)
        .bind(package.cover.image_size)
        .bind(package.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: PackageId) -> Result<Option<Package>> {
        let sql = format!("DELETE FROM packages WHERE id = $1 RETURNING {PACKAGE_COLUMNS}");
        let row = sqlx::query_as::<_, PackageRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Package::from))
    }

    async fn sync_image(&self, id: PackageId, image: &ImageSync) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE packages SET
                image = $2, image_type = $3, image_id = $4, image_filename = $5,
                image_size = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .bind(image.image.as_str())
        .bind(&image.image_type)
        .bind(image.image_id.map(|id| id.to_uuid()))
        .bind(&image.image_filename)
        .bind(image.image_size)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

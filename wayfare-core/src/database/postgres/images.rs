use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    Result,
    database::ports::ImageStore,
    types::{ImageAsset, ImageId, NewImageAsset},
};

#[derive(Clone, Debug)]
pub struct PostgresImageStore {
    pool: PgPool,
}

impl PostgresImageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ImageAssetRow {
    id: Uuid,
    data: Vec<u8>,
    content_type: String,
    size_bytes: i64,
    origin: String,
    filename: String,
    uploaded_by: String,
    created_at: DateTime<Utc>,
}

impl From<ImageAssetRow> for ImageAsset {
    fn from(row: ImageAssetRow) -> Self {
        ImageAsset {
            id: ImageId(row.id),
            data: row.data,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            origin: row.origin,
            filename: row.filename,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ImageStore for PostgresImageStore {
    async fn insert(&self, image: NewImageAsset) -> Result<ImageAsset> {
        let asset = image.into_asset(ImageId::new());

        sqlx::query(
            r#"
            INSERT INTO image_assets
                (id, data, content_type, size_bytes, origin, filename, uploaded_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(asset.id.to_uuid())
        .bind(&asset.data)
        .bind(&asset.content_type)
        .bind(asset.size_bytes)
        .bind(&asset.origin)
        .bind(&asset.filename)
        .bind(&asset.uploaded_by)
        .bind(asset.created_at)
        .execute(&self.pool)
        .await?;

        debug!(image_id = %asset.id, size = asset.size_bytes, "image asset stored");
        Ok(asset)
    }

    async fn get(&self, id: ImageId) -> Result<Option<ImageAsset>> {
        let row = sqlx::query_as::<_, ImageAssetRow>(
            r#"
            SELECT id, data, content_type, size_bytes, origin, filename, uploaded_by, created_at
            FROM image_assets
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ImageAsset::from))
    }

    async fn delete(&self, id: ImageId) -> Result<bool> {
        let res = sqlx::query("DELETE FROM image_assets WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

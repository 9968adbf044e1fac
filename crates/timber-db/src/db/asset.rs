use sqlx::{PgPool, Postgres};
use timber_core::{
    models::{Asset, AssetType, CreateAssetRequest, ExtractedAsset, UpdateAssetRequest},
    AppError,
};
use uuid::Uuid;

const ASSET_COLUMNS: &str =
    "id, user_id, name, asset_type, current_value, details, created_at, updated_at";

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Asset>, AppError> {
        let assets = sqlx::query_as::<Postgres, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "assets", db.operation = "insert"))]
    pub async fn create(&self, user_id: &str, request: &CreateAssetRequest) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            INSERT INTO assets (user_id, name, asset_type, current_value, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.asset_type)
        .bind(request.current_value)
        .bind(&request.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        request: &UpdateAssetRequest,
    ) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            UPDATE assets
            SET name = COALESCE($3, name),
                asset_type = COALESCE($4, asset_type),
                current_value = COALESCE($5, current_value),
                details = COALESCE($6, details),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.asset_type)
        .bind(request.current_value)
        .bind(&request.details)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Import an asset found in a document, refreshing one with the same name
    #[tracing::instrument(skip(self, extracted), fields(db.table = "assets", db.operation = "upsert"))]
    pub async fn upsert_extracted(
        &self,
        user_id: &str,
        extracted: &ExtractedAsset,
    ) -> Result<Asset, AppError> {
        let name = extracted.name.trim();

        let updated = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            UPDATE assets
            SET current_value = $3,
                details = COALESCE($4, details),
                updated_at = NOW()
            WHERE id = (
                SELECT id FROM assets
                WHERE user_id = $1 AND lower(name) = lower($2)
                ORDER BY created_at ASC
                LIMIT 1
            )
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(extracted.value)
        .bind(&extracted.details)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(asset) = updated {
            return Ok(asset);
        }

        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            INSERT INTO assets (user_id, name, asset_type, current_value, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(AssetType::from_label(&extracted.asset_type))
        .bind(extracted.value)
        .bind(&extracted.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }
}

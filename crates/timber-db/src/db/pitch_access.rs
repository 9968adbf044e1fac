use sqlx::{PgPool, Postgres};
use timber_core::{
    models::{CreatePitchAccessRequest, PitchAccessToken},
    AppError,
};
use uuid::Uuid;

const TOKEN_COLUMNS: &str = "id, token, recipient_email, recipient_name, expires_at, max_uses, \
     usage_count, is_active, created_at, last_used_at";

/// Repository for shareable pitch page tokens
#[derive(Clone)]
pub struct PitchAccessRepository {
    pool: PgPool,
}

impl PitchAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, token, request), fields(db.table = "pitch_access_tokens", db.operation = "insert"))]
    pub async fn create(
        &self,
        token: &str,
        request: &CreatePitchAccessRequest,
    ) -> Result<PitchAccessToken, AppError> {
        let created = sqlx::query_as::<Postgres, PitchAccessToken>(&format!(
            r#"
            INSERT INTO pitch_access_tokens (token, recipient_email, recipient_name, expires_at, max_uses)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(&request.recipient_email)
        .bind(&request.recipient_name)
        .bind(request.expires_at)
        .bind(request.max_uses)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pitch_access_tokens", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<PitchAccessToken>, AppError> {
        let tokens = sqlx::query_as::<Postgres, PitchAccessToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM pitch_access_tokens ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    #[tracing::instrument(skip(self), fields(db.table = "pitch_access_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE pitch_access_tokens SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "pitch_access_tokens", db.operation = "select"))]
    pub async fn get_by_token(&self, token: &str) -> Result<Option<PitchAccessToken>, AppError> {
        let found = sqlx::query_as::<Postgres, PitchAccessToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM pitch_access_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    /// Count one use of a token if it is still usable. Checks and increment
    /// run as a single statement.
    #[tracing::instrument(skip(self, token), fields(db.table = "pitch_access_tokens", db.operation = "update"))]
    pub async fn consume(&self, token: &str) -> Result<Option<PitchAccessToken>, AppError> {
        let consumed = sqlx::query_as::<Postgres, PitchAccessToken>(&format!(
            r#"
            UPDATE pitch_access_tokens
            SET usage_count = usage_count + 1, last_used_at = NOW()
            WHERE token = $1
              AND is_active
              AND (expires_at IS NULL OR expires_at > NOW())
              AND (max_uses IS NULL OR usage_count < max_uses)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(consumed)
    }
}

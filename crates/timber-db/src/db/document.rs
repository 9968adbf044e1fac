use serde_json::Value;
use sqlx::{PgPool, Postgres};
use timber_core::{
    models::{Document, DocumentOutcome, DocumentStatus, DocumentType},
    AppError,
};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, user_id, file_name, file_type, document_type, status, \
     size_bytes, pages, analysis_data, needs_review, uploaded_at, processed_at, updated_at";

/// Fields of a freshly uploaded document
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub user_id: &'a str,
    pub file_name: &'a str,
    pub file_type: &'a str,
    pub document_type: DocumentType,
    pub size_bytes: i64,
}

/// Repository for uploaded financial documents
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a document in `processing` state
    #[tracing::instrument(skip(self, new), fields(db.table = "documents", db.operation = "insert"))]
    pub async fn create(&self, new: NewDocument<'_>) -> Result<Document, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            INSERT INTO documents (user_id, file_name, file_type, document_type, status, size_bytes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.file_name)
        .bind(new.file_type)
        .bind(new.document_type)
        .bind(DocumentStatus::Processing)
        .bind(new.size_bytes)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    /// Store the result of processing and stamp `processed_at`
    #[tracing::instrument(skip(self, outcome), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    pub async fn record_outcome(
        &self,
        id: Uuid,
        outcome: &DocumentOutcome,
    ) -> Result<Document, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            UPDATE documents
            SET status = $2,
                pages = $3,
                analysis_data = $4,
                needs_review = $5,
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(outcome.status)
        .bind(outcome.pages)
        .bind(&outcome.analysis_data)
        .bind(outcome.needs_review)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    /// Newest first
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS}
            FROM documents
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    pub async fn get_for_user(&self, user_id: &str, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Returns false when the document does not exist or belongs to someone else
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_for_user(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Analysis payloads of the user's completed statement documents
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn completed_statement_analyses(&self, user_id: &str) -> Result<Vec<Value>, AppError> {
        let analyses = sqlx::query_scalar::<Postgres, Value>(
            r#"
            SELECT analysis_data
            FROM documents
            WHERE user_id = $1
              AND status = $2
              AND document_type IN ($3, $4)
              AND analysis_data IS NOT NULL
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .bind(DocumentStatus::Completed)
        .bind(DocumentType::BankStatement)
        .bind(DocumentType::CreditCard)
        .fetch_all(&self.pool)
        .await?;

        Ok(analyses)
    }

    /// Documents flagged for manual review, or every document when
    /// `needs_review` is false
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn list_for_review(
        &self,
        needs_review: bool,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS}
            FROM documents
            WHERE ($1 = FALSE OR needs_review)
            ORDER BY uploaded_at DESC
            LIMIT $2
            "#
        ))
        .bind(needs_review)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Save a reviewer's corrections and clear the review flag
    #[tracing::instrument(skip(self, analysis_data), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    pub async fn apply_review_edit(
        &self,
        id: Uuid,
        analysis_data: &Value,
        document_type: Option<DocumentType>,
    ) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            UPDATE documents
            SET analysis_data = $2,
                document_type = COALESCE($3, document_type),
                needs_review = FALSE,
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(analysis_data)
        .bind(document_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    pub async fn approve(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            UPDATE documents
            SET status = $2,
                needs_review = FALSE,
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(DocumentStatus::Completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }
}

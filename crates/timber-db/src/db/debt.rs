use sqlx::{PgPool, Postgres};
use timber_core::{
    models::{CreateDebtRequest, Debt, DebtType, ExtractedDebt, UpdateDebtRequest},
    AppError,
};
use uuid::Uuid;

const DEBT_COLUMNS: &str = "id, user_id, creditor, debt_type, current_balance, original_balance, \
     apr, minimum_payment, due_day, source_document_id, created_at, updated_at";

#[derive(Clone)]
pub struct DebtRepository {
    pool: PgPool,
}

impl DebtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "debts", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Debt>, AppError> {
        let debts = sqlx::query_as::<Postgres, Debt>(&format!(
            "SELECT {DEBT_COLUMNS} FROM debts WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(debts)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "debts", db.operation = "insert"))]
    pub async fn create(&self, user_id: &str, request: &CreateDebtRequest) -> Result<Debt, AppError> {
        let debt = sqlx::query_as::<Postgres, Debt>(&format!(
            r#"
            INSERT INTO debts (
                user_id, creditor, debt_type, current_balance, original_balance,
                apr, minimum_payment, due_day
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DEBT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(request.creditor.trim())
        .bind(request.debt_type)
        .bind(request.current_balance)
        .bind(request.original_balance)
        .bind(request.apr)
        .bind(request.minimum_payment)
        .bind(request.due_day)
        .fetch_one(&self.pool)
        .await?;

        Ok(debt)
    }

    /// Patch a debt; returns None when it is not the user's
    #[tracing::instrument(skip(self, request), fields(db.table = "debts", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        request: &UpdateDebtRequest,
    ) -> Result<Option<Debt>, AppError> {
        let debt = sqlx::query_as::<Postgres, Debt>(&format!(
            r#"
            UPDATE debts
            SET creditor = COALESCE($3, creditor),
                debt_type = COALESCE($4, debt_type),
                current_balance = COALESCE($5, current_balance),
                original_balance = COALESCE($6, original_balance),
                apr = COALESCE($7, apr),
                minimum_payment = COALESCE($8, minimum_payment),
                due_day = COALESCE($9, due_day),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {DEBT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(request.creditor.as_deref().map(str::trim))
        .bind(request.debt_type)
        .bind(request.current_balance)
        .bind(request.original_balance)
        .bind(request.apr)
        .bind(request.minimum_payment)
        .bind(request.due_day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(debt)
    }

    #[tracing::instrument(skip(self), fields(db.table = "debts", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM debts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Import a debt found in a document. An existing debt with the same
    /// creditor (case-insensitive) is refreshed instead of duplicated.
    #[tracing::instrument(skip(self, extracted), fields(db.table = "debts", db.operation = "upsert"))]
    pub async fn upsert_extracted(
        &self,
        user_id: &str,
        extracted: &ExtractedDebt,
        debt_type: DebtType,
        source_document_id: Uuid,
    ) -> Result<Debt, AppError> {
        let creditor = extracted.creditor.trim();

        let updated = sqlx::query_as::<Postgres, Debt>(&format!(
            r#"
            UPDATE debts
            SET current_balance = $3,
                apr = COALESCE($4, apr),
                minimum_payment = COALESCE($5, minimum_payment),
                source_document_id = $6,
                updated_at = NOW()
            WHERE id = (
                SELECT id FROM debts
                WHERE user_id = $1 AND lower(creditor) = lower($2)
                ORDER BY created_at ASC
                LIMIT 1
            )
            RETURNING {DEBT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(creditor)
        .bind(extracted.balance)
        .bind(extracted.apr)
        .bind(extracted.minimum_payment)
        .bind(source_document_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(debt) = updated {
            return Ok(debt);
        }

        let debt = sqlx::query_as::<Postgres, Debt>(&format!(
            r#"
            INSERT INTO debts (
                user_id, creditor, debt_type, current_balance, original_balance,
                apr, minimum_payment, source_document_id
            )
            VALUES ($1, $2, $3, $4, $4, COALESCE($5, 0), COALESCE($6, 0), $7)
            RETURNING {DEBT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(creditor)
        .bind(debt_type)
        .bind(extracted.balance)
        .bind(extracted.apr)
        .bind(extracted.minimum_payment)
        .bind(source_document_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(debt)
    }
}

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use timber_core::{
    models::{FinancialProfile, UpdateProfileRequest},
    AppError,
};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "financial_profiles", db.operation = "select"))]
    pub async fn get(&self, user_id: &str) -> Result<Option<FinancialProfile>, AppError> {
        let profile = sqlx::query_as::<Postgres, FinancialProfile>(
            r#"
            SELECT user_id, monthly_income, monthly_expenses, credit_score, updated_at
            FROM financial_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Create or merge the profile; fields left out of the request keep their value
    #[tracing::instrument(skip(self, request), fields(db.table = "financial_profiles", db.operation = "upsert"))]
    pub async fn upsert(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<FinancialProfile, AppError> {
        let profile = sqlx::query_as::<Postgres, FinancialProfile>(
            r#"
            INSERT INTO financial_profiles (user_id, monthly_income, monthly_expenses, credit_score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET monthly_income = COALESCE(EXCLUDED.monthly_income, financial_profiles.monthly_income),
                monthly_expenses = COALESCE(EXCLUDED.monthly_expenses, financial_profiles.monthly_expenses),
                credit_score = COALESCE(EXCLUDED.credit_score, financial_profiles.credit_score),
                updated_at = NOW()
            RETURNING user_id, monthly_income, monthly_expenses, credit_score, updated_at
            "#,
        )
        .bind(user_id)
        .bind(request.monthly_income)
        .bind(request.monthly_expenses)
        .bind(request.credit_score)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Record income found in an uploaded document
    pub async fn set_monthly_income(
        &self,
        user_id: &str,
        monthly_income: Decimal,
    ) -> Result<FinancialProfile, AppError> {
        self.upsert(
            user_id,
            &UpdateProfileRequest {
                monthly_income: Some(monthly_income),
                ..Default::default()
            },
        )
        .await
    }
}

use timber_core::{
    models::{SubscriptionPlan, SubscriptionStatus, SubscriptionUpdate, User},
    AppError,
};
use sqlx::{PgPool, Postgres};

const USER_COLUMNS: &str = "id, email, first_name, last_name, subscription_plan, \
     subscription_status, stripe_customer_id, stripe_subscription_id, created_at, updated_at";

/// Repository for application users, keyed by the external auth subject
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user on first sight, refreshing the email when one is supplied
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "upsert"))]
    pub async fn upsert(&self, id: &str, email: Option<&str>) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Set names on an existing user (used by the seeder)
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_names(
        &self,
        id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record a confirmed checkout for a user
    #[tracing::instrument(skip(self, update), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_subscription(
        &self,
        id: &str,
        update: &SubscriptionUpdate,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            UPDATE users
            SET subscription_plan = $2,
                subscription_status = $3,
                stripe_customer_id = COALESCE($4, stripe_customer_id),
                stripe_subscription_id = COALESCE($5, stripe_subscription_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.plan)
        .bind(update.status)
        .bind(&update.stripe_customer_id)
        .bind(&update.stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update the status of whoever owns a Stripe customer. Returns the number
    /// of users touched.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_status_by_customer(
        &self,
        stripe_customer_id: &str,
        status: SubscriptionStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET subscription_status = $2, updated_at = NOW()
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(stripe_customer_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drop a customer back to the free plan once their subscription is gone
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn cancel_by_customer(&self, stripe_customer_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET subscription_plan = $2,
                subscription_status = $3,
                stripe_subscription_id = NULL,
                updated_at = NOW()
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(stripe_customer_id)
        .bind(SubscriptionPlan::Free)
        .bind(SubscriptionStatus::Canceled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use timber_core::models::{AnalyticsSummary, EventCount, NewTipEvent, TipCount};
use timber_core::AppError;

/// Storage for Timber tip analytics events
#[async_trait::async_trait]
pub trait AnalyticsRepositoryTrait: Send + Sync {
    async fn record_event(&self, event: &NewTipEvent) -> Result<(), AppError>;

    /// Totals per event name and per tip hash in `[since, until)`. Tip ids
    /// are left unresolved.
    async fn summary(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary, AppError>;
}

#[derive(Clone)]
pub struct PostgresAnalyticsRepository {
    pool: PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TipCountRow {
    tip_hash: i64,
    count: i64,
}

#[async_trait::async_trait]
impl AnalyticsRepositoryTrait for PostgresAnalyticsRepository {
    #[tracing::instrument(skip(self, event), fields(
        db.system = "postgresql",
        db.table = "timber_analytics_events",
        db.operation = "insert"
    ))]
    async fn record_event(&self, event: &NewTipEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO timber_analytics_events (event, path, tip_hash, uid, ip, client_ts)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&event.event)
        .bind(&event.path)
        .bind(event.tip_hash)
        .bind(&event.uid)
        .bind(&event.ip)
        .bind(event.client_ts)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, event = %event.event, "Failed to insert analytics event");
            e
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "timber_analytics_events",
        db.operation = "aggregate"
    ))]
    async fn summary(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary, AppError> {
        let by_event = sqlx::query_as::<Postgres, EventCount>(
            r#"
            SELECT event, COUNT(*)::BIGINT AS count
            FROM timber_analytics_events
            WHERE ($1::TIMESTAMPTZ IS NULL OR received_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR received_at < $2)
            GROUP BY event
            ORDER BY count DESC, event ASC
            "#,
        )
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        let by_tip = sqlx::query_as::<Postgres, TipCountRow>(
            r#"
            SELECT tip_hash, COUNT(*)::BIGINT AS count
            FROM timber_analytics_events
            WHERE tip_hash IS NOT NULL
              AND ($1::TIMESTAMPTZ IS NULL OR received_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR received_at < $2)
            GROUP BY tip_hash
            ORDER BY count DESC, tip_hash ASC
            "#,
        )
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| TipCount {
            tip_hash: row.tip_hash,
            tip_id: None,
            count: row.count,
        })
        .collect();

        Ok(AnalyticsSummary {
            total_events: by_event.iter().map(|e| e.count).sum(),
            by_event,
            by_tip,
        })
    }
}

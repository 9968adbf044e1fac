use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::debt::validate_money;

/// Per-user income, expenses and credit score. One row per user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub user_id: String,
    pub monthly_income: Option<Decimal>,
    pub monthly_expenses: Option<Decimal>,
    pub credit_score: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_money"))]
    pub monthly_income: Option<Decimal>,
    #[validate(custom(function = "validate_money"))]
    pub monthly_expenses: Option<Decimal>,
    #[validate(range(min = 300, max = 850))]
    pub credit_score: Option<i32>,
}

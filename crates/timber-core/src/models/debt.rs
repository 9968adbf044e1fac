use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::document::DocumentType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "debt_type", rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum DebtType {
    CreditCard,
    Loan,
    Mortgage,
    #[default]
    Other,
}

impl DebtType {
    /// Debt type implied by the kind of document it was imported from.
    pub fn from_document_type(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::CreditCard => DebtType::CreditCard,
            DocumentType::Loan => DebtType::Loan,
            _ => DebtType::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: Uuid,
    pub user_id: String,
    pub creditor: String,
    pub debt_type: DebtType,
    pub current_balance: Decimal,
    pub original_balance: Option<Decimal>,
    /// Annual percentage rate, in percent
    pub apr: Decimal,
    pub minimum_payment: Decimal,
    pub due_day: Option<i32>,
    pub source_document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount")
            .with_message("Amount must not be negative".into()));
    }
    Ok(())
}

fn validate_apr(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(1000) {
        return Err(ValidationError::new("apr_out_of_range")
            .with_message("APR must be between 0 and 1000".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDebtRequest {
    #[validate(length(min = 1, max = 200))]
    pub creditor: String,
    #[serde(default)]
    pub debt_type: DebtType,
    #[validate(custom(function = "validate_money"))]
    pub current_balance: Decimal,
    #[validate(custom(function = "validate_money"))]
    pub original_balance: Option<Decimal>,
    #[validate(custom(function = "validate_apr"))]
    pub apr: Decimal,
    #[validate(custom(function = "validate_money"))]
    pub minimum_payment: Decimal,
    #[validate(range(min = 1, max = 28))]
    pub due_day: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDebtRequest {
    #[validate(length(min = 1, max = 200))]
    pub creditor: Option<String>,
    pub debt_type: Option<DebtType>,
    #[validate(custom(function = "validate_money"))]
    pub current_balance: Option<Decimal>,
    #[validate(custom(function = "validate_money"))]
    pub original_balance: Option<Decimal>,
    #[validate(custom(function = "validate_apr"))]
    pub apr: Option<Decimal>,
    #[validate(custom(function = "validate_money"))]
    pub minimum_payment: Option<Decimal>,
    #[validate(range(min = 1, max = 28))]
    pub due_day: Option<i32>,
}

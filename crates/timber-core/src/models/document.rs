use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of financial document the user says they uploaded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "document_type", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    BankStatement,
    CreditCard,
    Loan,
    Receipt,
    Invoice,
    Income,
    CreditReport,
    PayStub,
    #[default]
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::BankStatement => "bank-statement",
            DocumentType::CreditCard => "credit-card",
            DocumentType::Loan => "loan",
            DocumentType::Receipt => "receipt",
            DocumentType::Invoice => "invoice",
            DocumentType::Income => "income",
            DocumentType::CreditReport => "credit-report",
            DocumentType::PayStub => "pay-stub",
            DocumentType::Other => "other",
        }
    }

    /// Statements carry transaction lines whose totals feed cashflow estimates.
    pub fn is_statement(&self) -> bool {
        matches!(self, DocumentType::BankStatement | DocumentType::CreditCard)
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bank-statement" => Ok(DocumentType::BankStatement),
            "credit-card" => Ok(DocumentType::CreditCard),
            "loan" => Ok(DocumentType::Loan),
            "receipt" => Ok(DocumentType::Receipt),
            "invoice" => Ok(DocumentType::Invoice),
            "income" => Ok(DocumentType::Income),
            "credit-report" => Ok(DocumentType::CreditReport),
            "pay-stub" => Ok(DocumentType::PayStub),
            "other" => Ok(DocumentType::Other),
            other => Err(anyhow::anyhow!("Invalid document type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "document_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Uploaded financial document and its analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub size_bytes: i64,
    pub pages: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub analysis_data: Option<serde_json::Value>,
    pub needs_review: bool,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written once a document has been processed (or failed to).
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub status: DocumentStatus,
    pub pages: Option<i32>,
    pub analysis_data: Option<serde_json::Value>,
    pub needs_review: bool,
}

/// Admin correction of a document's extracted summary
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEditRequest {
    pub total: Option<String>,
    pub date: Option<String>,
    pub vendor: Option<String>,
    pub document_type: Option<DocumentType>,
    pub notes: Option<Vec<String>>,
}

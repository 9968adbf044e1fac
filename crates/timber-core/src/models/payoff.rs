use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::debt::Debt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Highest APR first
    Avalanche,
    /// Smallest balance first
    Snowball,
}

impl PayoffStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Snowball => "snowball",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "Avalanche",
            PayoffStrategy::Snowball => "Snowball",
        }
    }
}

impl Display for PayoffStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PayoffStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avalanche" => Ok(PayoffStrategy::Avalanche),
            "snowball" => Ok(PayoffStrategy::Snowball),
            other => Err(anyhow::anyhow!("Invalid payoff strategy: {}", other)),
        }
    }
}

/// Engine input for a single debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffDebt {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub creditor: String,
    pub balance: Decimal,
    pub apr: Decimal,
    pub minimum_payment: Decimal,
}

impl From<&Debt> for PayoffDebt {
    fn from(debt: &Debt) -> Self {
        PayoffDebt {
            id: Some(debt.id),
            creditor: debt.creditor.clone(),
            balance: debt.current_balance,
            apr: debt.apr,
            minimum_payment: debt.minimum_payment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlanRequest {
    pub strategy: PayoffStrategy,
    pub monthly_budget: Decimal,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffCompareRequest {
    pub monthly_budget: Decimal,
    pub start_date: Option<NaiveDate>,
}

/// One month of payments to one debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffScheduleEntry {
    pub month: u32,
    /// Calendar month, `YYYY-MM`
    pub date: String,
    pub debt_name: String,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub remaining_balance: Decimal,
    pub is_payoff_month: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffSummary {
    pub creditor: String,
    pub payoff_month: u32,
    pub total_interest_paid: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub total_months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    /// Month of the final payment, e.g. `March 2027`
    pub debt_free_date: String,
    pub monthly_payment: Decimal,
    pub schedule: Vec<PayoffScheduleEntry>,
    pub debt_order: Vec<DebtPayoffSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffPlan,
    pub snowball: PayoffPlan,
    /// Interest avoided by choosing avalanche over snowball
    pub interest_saved: Decimal,
    /// Months avoided by choosing avalanche over snowball (may be negative)
    pub months_saved: i64,
    pub recommended: PayoffStrategy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Html,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(anyhow::anyhow!("Invalid export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// `csv` (default), `html` or `json`
    pub format: Option<ExportFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "Avalanche".parse::<PayoffStrategy>().unwrap(),
            PayoffStrategy::Avalanche
        );
        assert!("hybrid".parse::<PayoffStrategy>().is_err());
    }

    #[test]
    fn test_plan_request_deserializes_camel_case() {
        let req: PayoffPlanRequest = serde_json::from_value(serde_json::json!({
            "strategy": "snowball",
            "monthlyBudget": 1250.5,
            "startDate": "2025-01-01"
        }))
        .unwrap();
        assert_eq!(req.strategy, PayoffStrategy::Snowball);
        assert_eq!(req.monthly_budget, Decimal::new(12505, 1));
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
    }
}

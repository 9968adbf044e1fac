use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the monthly expense figure came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSource {
    Profile,
    Documents,
    None,
}

/// 50/30/20 split of monthly income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetBreakdown {
    pub needs: Decimal,
    pub wants: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashflowAnalysis {
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub expense_source: ExpenseSource,
    pub total_minimum_payments: Decimal,
    pub monthly_surplus: Decimal,
    /// Whole dollars recommended for extra debt payments
    pub safe_monthly_extra: Decimal,
    /// Minimum payments as a percentage of income
    pub debt_to_income_ratio: Decimal,
    pub budget_breakdown: BudgetBreakdown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum CreditRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    pub total_assets: Decimal,
    pub total_debts: Decimal,
    pub net_worth: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub savings_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_rating: Option<CreditRating>,
}

//! Cashflow analysis and headline financial stats

use rust_decimal::{Decimal, RoundingStrategy};
use timber_core::models::{
    Asset, BudgetBreakdown, CashflowAnalysis, Debt, ExpenseSource, FinancialProfile,
    FinancialStats,
};

use crate::credit::credit_rating;

/// Share of the surplus recommended for extra debt payments
const SAFE_EXTRA_SHARE: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Monthly expenses from the profile when set, otherwise the average of the
/// statement totals, otherwise zero.
pub fn resolve_expenses(
    profile: Option<&FinancialProfile>,
    statement_totals: &[Decimal],
) -> (Decimal, ExpenseSource) {
    if let Some(expenses) = profile.and_then(|p| p.monthly_expenses) {
        return (expenses, ExpenseSource::Profile);
    }

    if !statement_totals.is_empty() {
        let sum: Decimal = statement_totals.iter().copied().sum();
        let average = (sum / Decimal::from(statement_totals.len())).round_dp(2);
        return (average, ExpenseSource::Documents);
    }

    (Decimal::ZERO, ExpenseSource::None)
}

/// Percentage of `part` in `whole` with one decimal; zero when `whole` is zero.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::from(100)).round_dp(1)
}

fn monthly_income(profile: Option<&FinancialProfile>) -> Decimal {
    profile
        .and_then(|p| p.monthly_income)
        .unwrap_or(Decimal::ZERO)
}

pub fn analyze_cashflow(
    profile: Option<&FinancialProfile>,
    debts: &[Debt],
    statement_totals: &[Decimal],
) -> CashflowAnalysis {
    let income = monthly_income(profile);
    let (expenses, expense_source) = resolve_expenses(profile, statement_totals);

    let total_minimum_payments: Decimal = debts
        .iter()
        .filter(|d| d.current_balance > Decimal::ZERO)
        .map(|d| d.minimum_payment)
        .sum();

    let monthly_surplus = income - expenses - total_minimum_payments;
    let safe_monthly_extra = (monthly_surplus.max(Decimal::ZERO) * SAFE_EXTRA_SHARE)
        .round_dp_with_strategy(0, RoundingStrategy::ToNegativeInfinity);

    let split = |share: i64| (income * Decimal::new(share, 2)).round_dp(2);

    CashflowAnalysis {
        monthly_income: income,
        monthly_expenses: expenses,
        expense_source,
        total_minimum_payments,
        monthly_surplus,
        safe_monthly_extra,
        debt_to_income_ratio: percent_of(total_minimum_payments, income),
        budget_breakdown: BudgetBreakdown {
            needs: split(50),
            wants: split(30),
            savings: split(20),
        },
    }
}

pub fn financial_stats(
    profile: Option<&FinancialProfile>,
    debts: &[Debt],
    assets: &[Asset],
    monthly_expenses: Decimal,
) -> FinancialStats {
    let total_assets: Decimal = assets.iter().map(|a| a.current_value).sum();
    let total_debts: Decimal = debts.iter().map(|d| d.current_balance).sum();
    let income = monthly_income(profile);
    let credit_score = profile.and_then(|p| p.credit_score);

    FinancialStats {
        total_assets,
        total_debts,
        net_worth: total_assets - total_debts,
        monthly_income: income,
        monthly_expenses,
        savings_rate: percent_of(income - monthly_expenses, income),
        credit_score,
        credit_rating: credit_score.map(credit_rating),
    }
}

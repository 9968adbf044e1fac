//! Month-by-month debt payoff simulation
//!
//! Priority order is fixed before the first month. Each month every open debt
//! accrues interest and receives its minimum payment, then the rest of the
//! budget is applied in priority order. Money freed by a debt that reaches zero
//! cascades to the next debt in the same month.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use timber_core::models::{
    DebtPayoffSummary, PayoffDebt, PayoffPlan, PayoffScheduleEntry, PayoffStrategy,
    StrategyComparison,
};

/// Simulation horizon; plans that need longer are rejected.
pub const MAX_PAYOFF_MONTHS: u32 = 600;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayoffError {
    #[error("Monthly budget {budget} is below the total minimum payments {minimums}")]
    BudgetBelowMinimums { budget: Decimal, minimums: Decimal },

    #[error("Invalid debt '{creditor}': {reason}")]
    InvalidDebt {
        creditor: String,
        reason: &'static str,
    },

    #[error("Debts are not paid off within {months} months; increase the monthly budget")]
    NonConverging { months: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct PayoffOptions {
    pub strategy: PayoffStrategy,
    pub monthly_budget: Decimal,
    pub start_date: NaiveDate,
}

#[derive(Debug)]
struct OpenDebt {
    creditor: String,
    balance: Decimal,
    apr: Decimal,
    minimum: Decimal,
    interest_paid: Decimal,
    payoff_month: Option<u32>,
}

impl OpenDebt {
    fn is_open(&self) -> bool {
        self.payoff_month.is_none()
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

fn half_cent() -> Decimal {
    Decimal::new(5, 3)
}

/// One month of interest at `apr` percent, or `None` when the balance has grown
/// past what `Decimal` can hold.
fn monthly_interest(balance: Decimal, apr: Decimal) -> Option<Decimal> {
    let yearly = balance.checked_mul(apr)?;
    Some(round2(yearly / Decimal::from(1200)))
}

fn month_start(start: NaiveDate, offset: u32) -> NaiveDate {
    let first = start.with_day0(0).unwrap_or(start);
    first.checked_add_months(Months::new(offset)).unwrap_or(first)
}

fn validate_debts(debts: &[PayoffDebt]) -> Result<(), PayoffError> {
    for debt in debts {
        let reason = if debt.balance.is_sign_negative() && !debt.balance.is_zero() {
            Some("balance must not be negative")
        } else if debt.apr.is_sign_negative() && !debt.apr.is_zero() {
            Some("APR must not be negative")
        } else if debt.minimum_payment.is_sign_negative() && !debt.minimum_payment.is_zero() {
            Some("minimum payment must not be negative")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(PayoffError::InvalidDebt {
                creditor: debt.creditor.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Sort debts into payment priority. The sort is stable so remaining ties keep
/// input order.
fn prioritize(debts: &mut [OpenDebt], strategy: PayoffStrategy) {
    match strategy {
        PayoffStrategy::Avalanche => {
            debts.sort_by(|a, b| b.apr.cmp(&a.apr).then(a.balance.cmp(&b.balance)))
        }
        PayoffStrategy::Snowball => {
            debts.sort_by(|a, b| a.balance.cmp(&b.balance).then(b.apr.cmp(&a.apr)))
        }
    }
}

/// Generate a payoff plan for `debts` under a fixed monthly budget.
pub fn generate_payoff_plan(
    debts: &[PayoffDebt],
    options: PayoffOptions,
) -> Result<PayoffPlan, PayoffError> {
    validate_debts(debts)?;

    let budget = round2(options.monthly_budget);
    let mut open: Vec<OpenDebt> = debts
        .iter()
        .map(|d| OpenDebt {
            creditor: d.creditor.clone(),
            balance: round2(d.balance),
            apr: d.apr,
            minimum: round2(d.minimum_payment),
            interest_paid: Decimal::ZERO,
            payoff_month: None,
        })
        .filter(|d| d.balance >= half_cent())
        .collect();

    if open.is_empty() {
        return Ok(PayoffPlan {
            strategy: options.strategy,
            total_months: 0,
            total_interest: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            debt_free_date: options.start_date.format("%B %Y").to_string(),
            monthly_payment: budget,
            schedule: Vec::new(),
            debt_order: Vec::new(),
        });
    }

    let minimums: Decimal = open.iter().map(|d| d.minimum.min(d.balance)).sum();
    if budget < minimums {
        return Err(PayoffError::BudgetBelowMinimums { budget, minimums });
    }

    prioritize(&mut open, options.strategy);

    let mut schedule = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut last_month = 0;

    for month in 1..=MAX_PAYOFF_MONTHS {
        if open.iter().all(|d| !d.is_open()) {
            break;
        }
        last_month = month;
        let date = month_start(options.start_date, month - 1)
            .format("%Y-%m")
            .to_string();

        let mut interest = vec![Decimal::ZERO; open.len()];
        let mut payment = vec![Decimal::ZERO; open.len()];
        let mut remaining = budget;

        for (i, debt) in open.iter_mut().enumerate().filter(|(_, d)| d.is_open()) {
            // Interest outrunning the payment compounds until it overflows
            let accrued = monthly_interest(debt.balance, debt.apr).and_then(|amount| {
                Some((
                    amount,
                    debt.balance.checked_add(amount)?,
                    debt.interest_paid.checked_add(amount)?,
                ))
            });
            let Some((amount, balance, interest_paid)) = accrued else {
                return Err(PayoffError::NonConverging {
                    months: MAX_PAYOFF_MONTHS,
                });
            };
            interest[i] = amount;
            debt.balance = balance;
            debt.interest_paid = interest_paid;
        }

        for (i, debt) in open.iter_mut().enumerate().filter(|(_, d)| d.is_open()) {
            let pay = debt.minimum.min(debt.balance).min(remaining);
            debt.balance -= pay;
            payment[i] += pay;
            remaining -= pay;
        }

        for (i, debt) in open.iter_mut().enumerate().filter(|(_, d)| d.is_open()) {
            if remaining <= Decimal::ZERO {
                break;
            }
            let extra = remaining.min(debt.balance);
            debt.balance -= extra;
            payment[i] += extra;
            remaining -= extra;
        }

        for (i, debt) in open.iter_mut().enumerate().filter(|(_, d)| d.is_open()) {
            total_interest = total_interest.checked_add(interest[i]).ok_or(
                PayoffError::NonConverging {
                    months: MAX_PAYOFF_MONTHS,
                },
            )?;
            total_paid += payment[i];

            let paid_off = debt.balance < half_cent();
            if paid_off {
                debt.balance = Decimal::ZERO;
                debt.payoff_month = Some(month);
            }

            if payment[i] > Decimal::ZERO {
                schedule.push(PayoffScheduleEntry {
                    month,
                    date: date.clone(),
                    debt_name: debt.creditor.clone(),
                    payment: payment[i],
                    principal: payment[i] - interest[i],
                    interest: interest[i],
                    remaining_balance: debt.balance,
                    is_payoff_month: paid_off,
                });
            }
        }
    }

    if open.iter().any(OpenDebt::is_open) {
        return Err(PayoffError::NonConverging {
            months: MAX_PAYOFF_MONTHS,
        });
    }

    let mut debt_order: Vec<DebtPayoffSummary> = open
        .iter()
        .map(|d| DebtPayoffSummary {
            creditor: d.creditor.clone(),
            payoff_month: d.payoff_month.unwrap_or(last_month),
            total_interest_paid: d.interest_paid,
        })
        .collect();
    debt_order.sort_by_key(|d| d.payoff_month);

    Ok(PayoffPlan {
        strategy: options.strategy,
        total_months: last_month,
        total_interest,
        total_paid,
        debt_free_date: month_start(options.start_date, last_month.saturating_sub(1))
            .format("%B %Y")
            .to_string(),
        monthly_payment: budget,
        schedule,
        debt_order,
    })
}

/// Run both strategies and report what avalanche saves over snowball.
pub fn compare_strategies(
    debts: &[PayoffDebt],
    monthly_budget: Decimal,
    start_date: NaiveDate,
) -> Result<StrategyComparison, PayoffError> {
    let avalanche = generate_payoff_plan(
        debts,
        PayoffOptions {
            strategy: PayoffStrategy::Avalanche,
            monthly_budget,
            start_date,
        },
    )?;
    let snowball = generate_payoff_plan(
        debts,
        PayoffOptions {
            strategy: PayoffStrategy::Snowball,
            monthly_budget,
            start_date,
        },
    )?;

    let interest_saved = snowball.total_interest - avalanche.total_interest;
    let months_saved = i64::from(snowball.total_months) - i64::from(avalanche.total_months);
    // Ties go to snowball
    let recommended = if interest_saved > Decimal::ZERO {
        PayoffStrategy::Avalanche
    } else {
        PayoffStrategy::Snowball
    };

    Ok(StrategyComparison {
        avalanche,
        snowball,
        interest_saved,
        months_saved,
        recommended,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn debt(creditor: &str, balance: &str, apr: &str, minimum: &str) -> PayoffDebt {
        PayoffDebt {
            id: None,
            creditor: creditor.to_string(),
            balance: dec(balance),
            apr: dec(apr),
            minimum_payment: dec(minimum),
        }
    }

    fn options(strategy: PayoffStrategy, budget: &str) -> PayoffOptions {
        PayoffOptions {
            strategy,
            monthly_budget: dec(budget),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_single_debt_without_interest() {
        let plan = generate_payoff_plan(
            &[debt("Store Card", "300", "0", "50")],
            options(PayoffStrategy::Avalanche, "100"),
        )
        .unwrap();

        assert_eq!(plan.total_months, 3);
        assert_eq!(plan.total_interest, Decimal::ZERO);
        assert_eq!(plan.total_paid, dec("300"));
        assert_eq!(plan.debt_free_date, "March 2025");
        assert_eq!(plan.schedule.len(), 3);
        assert_eq!(plan.schedule[0].date, "2025-01");
        assert_eq!(plan.schedule[2].date, "2025-03");
        assert!(plan.schedule[2].is_payoff_month);
        assert!(!plan.schedule[1].is_payoff_month);
        assert_eq!(plan.schedule[2].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_interest_accrues_before_payment() {
        // 1000 at 12% APR accrues 10.00 in month one.
        let plan = generate_payoff_plan(
            &[debt("Card", "1000", "12", "25")],
            options(PayoffStrategy::Avalanche, "500"),
        )
        .unwrap();

        let first = &plan.schedule[0];
        assert_eq!(first.interest, dec("10.00"));
        assert_eq!(first.payment, dec("500"));
        assert_eq!(first.principal, dec("490.00"));
        assert_eq!(first.remaining_balance, dec("510.00"));

        // Month two: 510 accrues 5.10 and the full budget leaves 15.10.
        let second = &plan.schedule[1];
        assert_eq!(second.interest, dec("5.10"));
        assert_eq!(second.payment, dec("500"));
        assert_eq!(second.remaining_balance, dec("15.10"));
        assert!(!second.is_payoff_month);

        let third = &plan.schedule[2];
        assert_eq!(third.interest, dec("0.15"));
        assert_eq!(third.payment, dec("15.25"));
        assert!(third.is_payoff_month);

        assert_eq!(plan.total_months, 3);
        assert_eq!(plan.total_interest, dec("15.25"));
        assert_eq!(plan.total_paid, dec("1015.25"));
    }

    #[test]
    fn test_avalanche_targets_highest_apr() {
        let debts = [
            debt("Low APR", "1000", "5", "20"),
            debt("High APR", "1000", "25", "20"),
        ];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Avalanche, "500")).unwrap();

        assert_eq!(plan.schedule[0].debt_name, "High APR");
        assert!(plan.schedule[0].payment > plan.schedule[1].payment);
        assert_eq!(plan.debt_order[0].creditor, "High APR");
    }

    #[test]
    fn test_snowball_targets_smallest_balance() {
        let debts = [
            debt("Big", "5000", "25", "100"),
            debt("Small", "400", "5", "25"),
        ];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Snowball, "600")).unwrap();

        assert_eq!(plan.schedule[0].debt_name, "Small");
        assert_eq!(plan.debt_order[0].creditor, "Small");
        assert_eq!(plan.debt_order[0].payoff_month, 1);
    }

    #[test]
    fn test_freed_money_cascades_in_same_month() {
        let debts = [debt("A", "50", "0", "10"), debt("B", "500", "0", "10")];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Snowball, "200")).unwrap();

        let month_one: Vec<_> = plan.schedule.iter().filter(|e| e.month == 1).collect();
        assert_eq!(month_one.len(), 2);
        assert_eq!(month_one[0].debt_name, "A");
        assert_eq!(month_one[0].payment, dec("50"));
        assert!(month_one[0].is_payoff_month);
        assert_eq!(month_one[1].payment, dec("150"));
        assert_eq!(month_one[1].remaining_balance, dec("350"));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let debts = [
            debt("First", "100", "10", "10"),
            debt("Second", "100", "10", "10"),
        ];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Avalanche, "50")).unwrap();
        assert_eq!(plan.schedule[0].debt_name, "First");
        assert_eq!(plan.debt_order[0].creditor, "First");
    }

    #[test]
    fn test_zero_balance_debts_are_ignored() {
        let debts = [debt("Paid", "0", "20", "35"), debt("Open", "100", "0", "10")];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Avalanche, "100")).unwrap();
        assert_eq!(plan.total_months, 1);
        assert!(plan.schedule.iter().all(|e| e.debt_name == "Open"));
        assert_eq!(plan.debt_order.len(), 1);
    }

    #[test]
    fn test_no_debts_gives_empty_plan() {
        let plan = generate_payoff_plan(&[], options(PayoffStrategy::Snowball, "100")).unwrap();
        assert_eq!(plan.total_months, 0);
        assert!(plan.schedule.is_empty());
        assert_eq!(plan.total_paid, Decimal::ZERO);
        assert_eq!(plan.debt_free_date, "January 2025");
    }

    #[test]
    fn test_budget_below_minimums() {
        let debts = [debt("A", "1000", "10", "60"), debt("B", "1000", "10", "60")];
        let err = generate_payoff_plan(&debts, options(PayoffStrategy::Avalanche, "100")).unwrap_err();
        assert_eq!(
            err,
            PayoffError::BudgetBelowMinimums {
                budget: dec("100"),
                minimums: dec("120"),
            }
        );
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = generate_payoff_plan(
            &[debt("Bad", "100", "-1", "10")],
            options(PayoffStrategy::Avalanche, "100"),
        )
        .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidDebt { .. }));
    }

    #[test]
    fn test_interest_exceeding_budget_does_not_converge() {
        // 100,000 at 24% accrues 2,000/month against a 1,000 budget.
        let err = generate_payoff_plan(
            &[debt("Huge", "100000", "24", "500")],
            options(PayoffStrategy::Avalanche, "1000"),
        )
        .unwrap_err();
        assert_eq!(err, PayoffError::NonConverging { months: 600 });
    }

    #[test]
    fn test_runaway_interest_stops_without_overflow() {
        // 400% APR on 1,000 grows by a third each month against a 10 payment.
        let err = generate_payoff_plan(
            &[debt("Payday", "1000", "400", "10")],
            options(PayoffStrategy::Avalanche, "10"),
        )
        .unwrap_err();
        assert_eq!(err, PayoffError::NonConverging { months: 600 });

        let err = compare_strategies(
            &[debt("Payday", "1000", "1000", "10")],
            dec("10"),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, PayoffError::NonConverging { .. }));
    }

    #[test]
    fn test_monthly_interest_reports_overflow() {
        assert_eq!(monthly_interest(dec("1000"), dec("12")), Some(dec("10.00")));
        assert_eq!(monthly_interest(Decimal::MAX, dec("400")), None);
    }

    #[test]
    fn test_totals_match_schedule() {
        let debts = [
            debt("Visa", "4200", "22.9", "120"),
            debt("Auto", "9800", "6.5", "280"),
            debt("Store", "650", "27", "35"),
        ];
        let plan = generate_payoff_plan(&debts, options(PayoffStrategy::Avalanche, "900")).unwrap();

        let paid: Decimal = plan.schedule.iter().map(|e| e.payment).sum();
        let interest: Decimal = plan.schedule.iter().map(|e| e.interest).sum();
        assert_eq!(paid, plan.total_paid);
        assert_eq!(interest, plan.total_interest);
        assert_eq!(plan.total_paid, dec("14650") + plan.total_interest);
        assert!(plan.schedule.iter().all(|e| e.payment <= dec("900")));
        assert_eq!(
            plan.debt_order.last().map(|d| d.payoff_month),
            Some(plan.total_months)
        );
    }

    #[test]
    fn test_compare_strategies_prefers_avalanche_when_cheaper() {
        let debts = [
            debt("Small low", "500", "3", "25"),
            debt("Large high", "6000", "29.99", "150"),
        ];
        let comparison = compare_strategies(
            &debts,
            dec("600"),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap();

        assert!(comparison.interest_saved > Decimal::ZERO);
        assert_eq!(comparison.recommended, PayoffStrategy::Avalanche);
        assert_eq!(
            comparison.interest_saved,
            comparison.snowball.total_interest - comparison.avalanche.total_interest
        );
    }
}

use rust_decimal::Decimal;
use timber_core::models::{Asset, Debt, FinancialProfile};

/// The user's figures summarised for the advisor prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialContext {
    pub total_debt: Option<Decimal>,
    pub debt_count: usize,
    pub total_assets: Option<Decimal>,
    pub monthly_income: Option<Decimal>,
    pub credit_score: Option<i32>,
}

impl FinancialContext {
    pub fn from_records(
        debts: &[Debt],
        assets: &[Asset],
        profile: Option<&FinancialProfile>,
    ) -> Self {
        Self {
            total_debt: (!debts.is_empty()).then(|| debts.iter().map(|d| d.current_balance).sum()),
            debt_count: debts.len(),
            total_assets: (!assets.is_empty())
                .then(|| assets.iter().map(|a| a.current_value).sum()),
            monthly_income: profile
                .and_then(|p| p.monthly_income)
                .filter(|income| !income.is_zero()),
            credit_score: profile.and_then(|p| p.credit_score),
        }
    }

    /// One line per known figure; unknown figures are left out
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(total) = self.total_debt {
            lines.push(format!("Total debt: ${}", format_amount(total)));
            lines.push(format!("Number of debts: {}", self.debt_count));
        }
        if let Some(total) = self.total_assets {
            lines.push(format!("Total assets: ${}", format_amount(total)));
        }
        if let Some(income) = self.monthly_income {
            lines.push(format!("Monthly income: ${}", format_amount(income)));
        }
        if let Some(score) = self.credit_score {
            lines.push(format!("Credit score: {}", score));
        }
        lines
    }
}

pub fn advice_message(question: &str, context: &FinancialContext) -> String {
    let lines = context.lines();
    if lines.is_empty() {
        format!("User's question: {}", question)
    } else {
        format!(
            "User's financial context:\n{}\n\nUser's question: {}",
            lines.join("\n"),
            question
        )
    }
}

/// Render an amount with thousands separators and at most two decimals,
/// dropping trailing zeros (12000 -> "12,000", 1234.50 -> "1,234.5").
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (int_part, fraction) = match text.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("0")), "0");
        assert_eq!(format_amount(dec("999")), "999");
        assert_eq!(format_amount(dec("12000.00")), "12,000");
        assert_eq!(format_amount(dec("1234.50")), "1,234.5");
        assert_eq!(format_amount(dec("1234567.891")), "1,234,567.89");
        assert_eq!(format_amount(dec("-4500")), "-4,500");
    }

    #[test]
    fn test_advice_message_with_context() {
        let context = FinancialContext {
            total_debt: Some(dec("15250.75")),
            debt_count: 3,
            total_assets: None,
            monthly_income: Some(dec("4500")),
            credit_score: Some(640),
        };

        assert_eq!(
            advice_message("Should I consolidate?", &context),
            "User's financial context:\nTotal debt: $15,250.75\nNumber of debts: 3\nMonthly income: $4,500\nCredit score: 640\n\nUser's question: Should I consolidate?"
        );
    }

    #[test]
    fn test_advice_message_without_context() {
        assert_eq!(
            advice_message("What is APR?", &FinancialContext::default()),
            "User's question: What is APR?"
        );
    }

    #[test]
    fn test_from_records_skips_zero_income() {
        let profile = FinancialProfile {
            user_id: "user_1".to_string(),
            monthly_income: Some(Decimal::ZERO),
            monthly_expenses: None,
            credit_score: Some(700),
            updated_at: chrono::Utc::now(),
        };
        let context = FinancialContext::from_records(&[], &[], Some(&profile));
        assert_eq!(context.total_debt, None);
        assert_eq!(context.monthly_income, None);
        assert_eq!(context.lines(), vec!["Credit score: 700".to_string()]);
    }
}

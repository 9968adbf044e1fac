pub mod fixtures;

use anyhow::Context;
use timber_core::models::PayoffDebt;

/// Read engine input from a JSON array of `{creditor, balance, apr, minimumPayment}`.
pub fn parse_payoff_debts(json: &str) -> anyhow::Result<Vec<PayoffDebt>> {
    serde_json::from_str(json).context("Input must be a JSON array of debts")
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays
/// clean for exports.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parse_payoff_debts_reads_camel_case() {
        let debts = parse_payoff_debts(
            r#"[{"creditor": "Visa", "balance": 1200.5, "apr": 19.99, "minimumPayment": 35}]"#,
        )
        .unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].creditor, "Visa");
        assert_eq!(debts[0].minimum_payment, Decimal::new(35, 0));
        assert!(debts[0].id.is_none());
    }

    #[test]
    fn parse_payoff_debts_rejects_objects() {
        let err = parse_payoff_debts(r#"{"creditor": "Visa"}"#).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}

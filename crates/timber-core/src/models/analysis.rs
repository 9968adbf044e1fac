//! Document analysis payloads
//!
//! `EnrichedAnalysis` is the output of the heuristic enrichment pass,
//! `DocumentAiAnalysis` is what the AI service extracts, and `StoredAnalysis`
//! is the combination persisted in `documents.analysis_data`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Stated figures found on the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisSummary {
    pub total: Option<String>,
    pub date: Option<String>,
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatementPeriod {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A transaction line recognised in the document text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedTransaction {
    pub date: String,
    pub desc: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisValidations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_matches: Option<bool>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichedAnalysis {
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub summary: AnalysisSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<StatementPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<ExtractedTransaction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations: Option<AnalysisValidations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<String>>,
}

impl EnrichedAnalysis {
    /// True when a stated total was checked and did not match the transactions.
    pub fn total_mismatch(&self) -> bool {
        self.validations
            .as_ref()
            .and_then(|v| v.total_matches)
            .map(|matches| !matches)
            .unwrap_or(false)
    }

    /// Sum of the positive transaction amounts.
    pub fn positive_total(&self) -> Decimal {
        self.transactions
            .iter()
            .flatten()
            .filter(|t| t.amount > Decimal::ZERO)
            .map(|t| t.amount)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDebt {
    pub creditor: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub balance: Decimal,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub apr: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    pub minimum_payment: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedAsset {
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub value: Decimal,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIncome {
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_amount: Decimal,
    #[serde(default)]
    pub source: Option<String>,
}

/// Structured data the AI service pulled out of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedFinancialData {
    #[serde(default)]
    pub debts: Vec<ExtractedDebt>,
    #[serde(default)]
    pub assets: Vec<ExtractedAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<ExtractedIncome>,
}

impl ExtractedFinancialData {
    pub fn is_empty(&self) -> bool {
        self.debts.is_empty() && self.assets.is_empty() && self.income.is_none()
    }
}

/// Response of the AI document analysis call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAiAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub statement: AnalysisSummary,
    #[serde(default)]
    pub extracted_data: ExtractedFinancialData,
}

/// Persisted shape of `documents.analysis_data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    #[serde(flatten)]
    pub enrichment: EnrichedAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedFinancialData>,
}

/// Strip everything except digits, `.` and `-` and parse what remains.
pub fn parse_money(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_decimal(self) -> Option<Decimal> {
        match self {
            NumberOrString::Number(n) => Decimal::from_f64_retain(n).map(|d| d.round_dp(2)),
            NumberOrString::Text(s) => parse_money(&s),
        }
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .into_decimal()
        .ok_or_else(|| serde::de::Error::custom("expected a monetary amount"))
}

fn lenient_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.and_then(|v| v.into_decimal()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_money_strips_currency_formatting() {
        assert_eq!(parse_money("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_money("-$45.00"), Some(dec("-45.00")));
        assert_eq!(parse_money("USD"), None);
        assert_eq!(parse_money("1.2.3"), None);
    }

    #[test]
    fn test_extracted_data_accepts_numbers_and_strings() {
        let json = serde_json::json!({
            "debts": [
                {"creditor": "Chase", "balance": 5400.25, "apr": "24.99%", "minimumPayment": 150},
                {"creditor": "Navient", "balance": "$12,000"}
            ],
            "income": {"monthlyAmount": 4500}
        });
        let data: ExtractedFinancialData = serde_json::from_value(json).unwrap();
        assert_eq!(data.debts.len(), 2);
        assert_eq!(data.debts[0].balance, dec("5400.25"));
        assert_eq!(data.debts[0].apr, Some(dec("24.99")));
        assert_eq!(data.debts[1].balance, dec("12000"));
        assert_eq!(data.debts[1].minimum_payment, None);
        assert!(data.assets.is_empty());
        assert_eq!(
            data.income.map(|i| i.monthly_amount),
            Some(dec("4500"))
        );
    }

    #[test]
    fn test_stored_analysis_flattens_enrichment() {
        let stored = StoredAnalysis {
            enrichment: EnrichedAnalysis {
                doc_type: "receipt".to_string(),
                summary: AnalysisSummary {
                    total: Some("12.50".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            ai_summary: Some("Coffee shop receipt".to_string()),
            extracted_data: None,
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["type"], "receipt");
        assert_eq!(json["summary"]["total"], "12.50");
        assert_eq!(json["aiSummary"], "Coffee shop receipt");
        assert!(json.get("extractedData").is_none());
    }

    #[test]
    fn test_total_mismatch_only_when_checked() {
        let mut analysis = EnrichedAnalysis::default();
        assert!(!analysis.total_mismatch());

        analysis.validations = Some(AnalysisValidations {
            total_matches: Some(false),
            notes: vec![],
        });
        assert!(analysis.total_mismatch());
    }
}

//! Heuristic enrichment of document analysis
//!
//! A single pass over the raw document text that finds the statement period,
//! lenient transaction lines, and cross-checks the stated total against the
//! sum of the positive transaction amounts. Pure, no I/O.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use timber_core::models::{
    parse_money, AnalysisValidations, EnrichedAnalysis, ExtractedTransaction, StatementPeriod,
};

/// Lines considered per document
pub const MAX_LINES: usize = 2000;
/// Transactions kept in the output
pub const MAX_TRANSACTIONS: usize = 500;
/// Description length after whitespace collapsing
pub const MAX_DESC_CHARS: usize = 120;

// Digits and the keyword boundary are ASCII-only; fullwidth or other script
// digits are not dates or amounts here.
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^0-9A-Za-z_])(period|from)\s*[:-]?\s*([0-9]{1,2}[/.\-][0-9]{1,2}[/.\-]20[0-9]{2})\s*(to|-|through)\s*([0-9]{1,2}[/.\-][0-9]{1,2}[/.\-]20[0-9]{2})",
    )
    .expect("period pattern is valid")
});

static TRANSACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{1,2}[/\-][0-9]{1,2})(?:[/\-]([0-9]{2,4}))?\s+(.+?)\s+(-?\$?[0-9]{1,3}(?:,[0-9]{3})*(?:\.[0-9]{2})?)$",
    )
    .expect("transaction pattern is valid")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Enrich `base` with period, transactions and total validation found in `text`.
pub fn enrich(base: EnrichedAnalysis, text: &str) -> EnrichedAnalysis {
    let mut out = EnrichedAnalysis {
        validations: Some(AnalysisValidations::default()),
        ..base
    };

    if let Some(caps) = PERIOD_RE.captures(text) {
        out.period = Some(StatementPeriod {
            start: caps.get(2).map(|m| m.as_str().to_string()),
            end: caps.get(4).map(|m| m.as_str().to_string()),
        });
    }

    let transactions: Vec<ExtractedTransaction> = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !line.is_empty())
        .take(MAX_LINES)
        .filter_map(parse_transaction)
        .collect();

    if !transactions.is_empty() {
        // Only a missing or empty total skips the check
        let stated = out.summary.total.as_deref().filter(|raw| !raw.is_empty());
        if let Some(raw) = stated {
            let sum: Decimal = transactions
                .iter()
                .filter(|t| t.amount > Decimal::ZERO)
                .map(|t| t.amount)
                .sum();
            let (matches, shown) = match parse_stated_total(raw) {
                Some(stated) => (
                    (sum - stated).abs() < Decimal::new(1, 2),
                    stated.normalize().to_string(),
                ),
                None => (false, raw.trim().to_string()),
            };

            let validations = out.validations.get_or_insert_with(Default::default);
            validations.total_matches = Some(matches);
            if !matches {
                validations
                    .notes
                    .push(format!("Sum {} != stated {}", sum.normalize(), shown));
            }
        }

        out.transactions = Some(transactions.into_iter().take(MAX_TRANSACTIONS).collect());
    }

    out
}

/// Stated totals with no digits left after cleaning (`"N/A"`, `"USD"`) count as
/// zero. `None` means the cleaned text is not a number at all, e.g. `"1.2.3"`.
fn parse_stated_total(raw: &str) -> Option<Decimal> {
    let has_number_chars = raw
        .chars()
        .any(|c| c.is_ascii_digit() || c == '.' || c == '-');
    if has_number_chars {
        parse_money(raw)
    } else {
        Some(Decimal::ZERO)
    }
}

fn parse_transaction(line: &str) -> Option<ExtractedTransaction> {
    let caps = TRANSACTION_RE.captures(line)?;

    let mut date = caps.get(1)?.as_str().to_string();
    if let Some(year) = caps.get(2) {
        date.push('/');
        date.push_str(year.as_str());
    }

    let desc: String = WHITESPACE_RE
        .replace_all(caps.get(3)?.as_str(), " ")
        .chars()
        .take(MAX_DESC_CHARS)
        .collect();

    let amount = parse_money(caps.get(4)?.as_str())?;

    Some(ExtractedTransaction { date, desc, amount })
}

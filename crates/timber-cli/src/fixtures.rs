//! Test users and mock documents written by `timber-seed`.
//!
//! Three profiles cover the payoff strategies and the review queue:
//! heavy card debt (avalanche), many small balances (snowball) and a
//! healthy household with a large document history.

use chrono::{Duration, NaiveDate};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;
use timber_core::models::{
    AnalysisSummary, AssetType, DebtType, DocumentStatus, DocumentType, EnrichedAnalysis,
    ExtractedTransaction, StatementPeriod, StoredAnalysis, SubscriptionPlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedProfile {
    Avalanche,
    Snowball,
    Healthy,
}

impl SeedProfile {
    /// Weights for completed, processing, failed, pending
    pub fn status_weights(&self) -> [u32; 4] {
        match self {
            SeedProfile::Healthy => [80, 10, 5, 5],
            SeedProfile::Snowball => [60, 20, 15, 5],
            SeedProfile::Avalanche => [70, 15, 10, 5],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeedDebt {
    pub creditor: &'static str,
    pub debt_type: DebtType,
    pub balance: i64,
    /// APR in hundredths of a percent
    pub apr_hundredths: i64,
    pub minimum_payment: i64,
}

impl SeedDebt {
    pub fn apr(&self) -> Decimal {
        Decimal::new(self.apr_hundredths, 2)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeedAsset {
    pub name: &'static str,
    pub asset_type: AssetType,
    pub value: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub id: &'static str,
    pub email: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub plan: SubscriptionPlan,
    pub profile: SeedProfile,
    pub monthly_income: i64,
    pub credit_score: i32,
    /// Original balance as a multiple of today's, in tenths
    pub original_balance_tenths: i64,
    pub debts: &'static [SeedDebt],
    pub assets: &'static [SeedAsset],
    pub document_count: usize,
}

impl SeedUser {
    pub fn original_balance(&self, debt: &SeedDebt) -> Decimal {
        Decimal::from(debt.balance) * Decimal::new(self.original_balance_tenths, 1)
    }

    pub fn total_debt(&self) -> i64 {
        self.debts.iter().map(|d| d.balance).sum()
    }

    pub fn total_assets(&self) -> i64 {
        self.assets.iter().map(|a| a.value).sum()
    }
}

const fn debt(
    creditor: &'static str,
    debt_type: DebtType,
    balance: i64,
    apr_hundredths: i64,
    minimum_payment: i64,
) -> SeedDebt {
    SeedDebt {
        creditor,
        debt_type,
        balance,
        apr_hundredths,
        minimum_payment,
    }
}

const fn asset(name: &'static str, asset_type: AssetType, value: i64) -> SeedAsset {
    SeedAsset {
        name,
        asset_type,
        value,
    }
}

pub const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        id: "test-user-avalanche",
        email: "avalanche@timbermoney.test",
        first_name: "Alex",
        last_name: "Avalanche",
        plan: SubscriptionPlan::ProMonthly,
        profile: SeedProfile::Avalanche,
        monthly_income: 4500,
        credit_score: 620,
        original_balance_tenths: 15,
        debts: &[
            debt("Chase Sapphire", DebtType::CreditCard, 8500, 2499, 255),
            debt("Capital One Venture", DebtType::CreditCard, 6200, 2149, 186),
            debt("Discover It", DebtType::CreditCard, 4800, 1999, 144),
            debt("Citi Double Cash", DebtType::CreditCard, 3200, 1824, 96),
            debt("Personal Loan", DebtType::Loan, 12000, 1250, 350),
        ],
        assets: &[
            asset("Checking Account", AssetType::Savings, 2500),
            asset("Emergency Fund", AssetType::Savings, 1000),
            asset("2015 Honda Civic", AssetType::Vehicle, 8000),
        ],
        document_count: 8,
    },
    SeedUser {
        id: "test-user-snowball",
        email: "snowball@timbermoney.test",
        first_name: "Sam",
        last_name: "Snowball",
        plan: SubscriptionPlan::Free,
        profile: SeedProfile::Snowball,
        monthly_income: 3200,
        credit_score: 580,
        original_balance_tenths: 13,
        debts: &[
            debt("Medical Bill - Hospital", DebtType::Loan, 850, 0, 50),
            debt("Store Credit - Best Buy", DebtType::CreditCard, 1200, 2699, 50),
            debt("Payday Loan", DebtType::Loan, 500, 39900, 150),
            debt("Credit Card - Target", DebtType::CreditCard, 680, 2299, 35),
            debt("Student Loan", DebtType::Loan, 15000, 550, 180),
            debt("Car Loan", DebtType::Loan, 8500, 725, 285),
            debt("Furniture Financing", DebtType::Loan, 1800, 0, 75),
        ],
        assets: &[
            asset("Checking Account", AssetType::Savings, 800),
            asset("2018 Toyota Corolla", AssetType::Vehicle, 12000),
        ],
        document_count: 12,
    },
    SeedUser {
        id: "test-user-healthy",
        email: "healthy@timbermoney.test",
        first_name: "Harper",
        last_name: "Healthy",
        plan: SubscriptionPlan::FamilyMonthly,
        profile: SeedProfile::Healthy,
        monthly_income: 9500,
        credit_score: 780,
        original_balance_tenths: 11,
        debts: &[
            debt("Mortgage", DebtType::Mortgage, 185000, 375, 1200),
            debt("Chase Sapphire Reserve", DebtType::CreditCard, 1200, 1899, 50),
        ],
        assets: &[
            asset("Primary Residence", AssetType::Property, 350000),
            asset("401(k)", AssetType::Investment, 125000),
            asset("Roth IRA", AssetType::Investment, 45000),
            asset("Brokerage Account", AssetType::Investment, 28000),
            asset("Emergency Fund", AssetType::Savings, 25000),
            asset("Checking Account", AssetType::Savings, 8500),
            asset("2022 Tesla Model 3", AssetType::Vehicle, 38000),
        ],
        document_count: 25,
    },
];

const DOCUMENT_TYPES: [DocumentType; 6] = [
    DocumentType::BankStatement,
    DocumentType::CreditCard,
    DocumentType::Loan,
    DocumentType::Receipt,
    DocumentType::Invoice,
    DocumentType::Income,
];

const STATUSES: [DocumentStatus; 4] = [
    DocumentStatus::Completed,
    DocumentStatus::Processing,
    DocumentStatus::Failed,
    DocumentStatus::Pending,
];

const BANKS: [&str; 4] = ["Chase Bank", "Wells Fargo", "Bank of America", "Capital One"];

const MERCHANTS: [&str; 9] = [
    "Whole Foods",
    "Target",
    "Walmart",
    "Costco",
    "Home Depot",
    "Starbucks",
    "McDonald's",
    "Shell Gas",
    "CVS Pharmacy",
];

const TRANSACTION_DESCRIPTIONS: [&str; 7] = [
    "Grocery Store",
    "Gas Station",
    "Restaurant",
    "Online Shopping",
    "Utility Bill",
    "Insurance Payment",
    "Subscription Service",
];

const RECEIPT_CATEGORIES: [&str; 3] = ["Foraging", "Building Material", "Obstacles"];

/// A document row as the seeder inserts it
#[derive(Debug, Clone)]
pub struct MockDocument {
    pub file_name: String,
    pub file_type: &'static str,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub size_bytes: i64,
    pub pages: Option<i32>,
    pub analysis: Option<StoredAnalysis>,
    pub needs_review: bool,
}

fn money<R: Rng + ?Sized>(rng: &mut R, low_cents: i64, high_cents: i64) -> Decimal {
    Decimal::new(rng.random_range(low_cents..=high_cents), 2)
}

fn days_before(today: NaiveDate, days: i64) -> String {
    (today - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn file_name<R: Rng + ?Sized>(rng: &mut R, document_type: DocumentType, date: &str) -> String {
    match document_type {
        DocumentType::BankStatement => format!("bank_statement_{}.pdf", date),
        DocumentType::CreditCard => format!("cc_statement_{}.pdf", date),
        DocumentType::Loan => format!("loan_statement_{}.pdf", date),
        DocumentType::Receipt => format!("receipt_{}.jpg", date),
        DocumentType::Invoice => format!("invoice_{}.pdf", rng.random_range(1000..=9999)),
        DocumentType::Income => format!("paystub_{}.pdf", date),
        other => format!("{}_{}.pdf", other.as_str(), date),
    }
}

fn statement_analysis<R: Rng + ?Sized>(
    rng: &mut R,
    document_type: DocumentType,
    today: NaiveDate,
) -> StoredAnalysis {
    let count = rng.random_range(5..=15);
    let transactions = (0..count)
        .map(|_| ExtractedTransaction {
            date: days_before(today, rng.random_range(1..=30)),
            desc: TRANSACTION_DESCRIPTIONS
                .choose(rng)
                .copied()
                .unwrap_or_default()
                .to_string(),
            amount: money(rng, 1_000, 20_000),
        })
        .collect();

    StoredAnalysis {
        enrichment: EnrichedAnalysis {
            doc_type: document_type.as_str().to_string(),
            summary: AnalysisSummary {
                total: Some(money(rng, 50_000, 500_000).to_string()),
                date: Some(days_before(today, 0)),
                vendor: BANKS.choose(rng).map(|b| b.to_string()),
            },
            period: Some(StatementPeriod {
                start: Some(days_before(today, 30)),
                end: Some(days_before(today, 0)),
            }),
            transactions: Some(transactions),
            ..EnrichedAnalysis::default()
        },
        ..StoredAnalysis::default()
    }
}

fn receipt_analysis<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> StoredAnalysis {
    StoredAnalysis {
        enrichment: EnrichedAnalysis {
            doc_type: DocumentType::Receipt.as_str().to_string(),
            summary: AnalysisSummary {
                total: Some(money(rng, 1_000, 15_000).to_string()),
                date: Some(days_before(today, rng.random_range(1..=30))),
                vendor: MERCHANTS.choose(rng).map(|m| m.to_string()),
            },
            ..EnrichedAnalysis::default()
        },
        ai_summary: RECEIPT_CATEGORIES
            .choose(rng)
            .map(|c| format!("Category: {}", c)),
        ..StoredAnalysis::default()
    }
}

/// One mock document. Completed statements and receipts carry analysis
/// data; failed ones and a tenth of completed ones are flagged for review.
pub fn mock_document<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &WeightedIndex<u32>,
    today: NaiveDate,
) -> MockDocument {
    let document_type = DOCUMENT_TYPES
        .choose(rng)
        .copied()
        .unwrap_or(DocumentType::Other);
    let status = STATUSES[weights.sample(rng)];

    let date = days_before(today, rng.random_range(1..=90));
    let file_name = file_name(rng, document_type, &date);
    let is_pdf = file_name.ends_with(".pdf");

    let analysis = match (status, document_type) {
        (DocumentStatus::Completed, DocumentType::BankStatement | DocumentType::CreditCard) => {
            Some(statement_analysis(rng, document_type, today))
        }
        (DocumentStatus::Completed, DocumentType::Receipt) => Some(receipt_analysis(rng, today)),
        _ => None,
    };

    let needs_review = match status {
        DocumentStatus::Failed => true,
        DocumentStatus::Completed => rng.random_bool(0.1),
        _ => false,
    };

    MockDocument {
        file_name,
        file_type: if is_pdf { "pdf" } else { "image" },
        document_type,
        status,
        size_bytes: rng.random_range(50_000..=5_000_000),
        pages: is_pdf.then(|| rng.random_range(1..=10)),
        analysis,
        needs_review,
    }
}

/// `count` mock documents with the profile's status mix
pub fn mock_documents<R: Rng + ?Sized>(
    rng: &mut R,
    profile: SeedProfile,
    count: usize,
    today: NaiveDate,
) -> anyhow::Result<Vec<MockDocument>> {
    let weights = WeightedIndex::new(profile.status_weights())?;
    Ok((0..count)
        .map(|_| mock_document(rng, &weights, today))
        .collect())
}

//! Timber processing
//!
//! Pure domain logic: upload validation, document text extraction and
//! enrichment, the payoff engine and its exports, cashflow and credit
//! summaries, Timber tips and analytics event normalisation.

pub mod analytics;
pub mod cashflow;
pub mod credit;
pub mod document;
pub mod payoff;
pub mod tips;
pub mod validator;

pub use cashflow::{analyze_cashflow, financial_stats, resolve_expenses};
pub use credit::credit_rating;
pub use document::{enrich, extract_text, DocumentFormat, ExtractedText};
pub use payoff::{
    compare_strategies, export_plan, generate_payoff_plan, ExportError, PayoffError,
    PayoffOptions, ScheduleExport,
};
pub use validator::{DocumentValidator, ValidationError};

//! Debt payoff schedules

pub mod engine;
pub mod export;

pub use engine::{
    compare_strategies, generate_payoff_plan, PayoffError, PayoffOptions, MAX_PAYOFF_MONTHS,
};
pub use export::{export_plan, to_csv, to_html, ExportError, ScheduleExport};

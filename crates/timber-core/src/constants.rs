//! Limits shared between the API and processing crates.

/// Longest string kept from an analytics event field
pub const ANALYTICS_FIELD_MAX_LEN: usize = 200;

/// Page size cap for document listings
pub const MAX_DOCUMENT_LIST_LIMIT: i64 = 100;

/// Default page size for document listings
pub const DEFAULT_DOCUMENT_LIST_LIMIT: i64 = 50;

/// Number of previous chat turns sent along with a Timber message
pub const CHAT_HISTORY_TURNS: usize = 10;

/// Lines of document text kept as a preview in the analysis
pub const ANALYSIS_PREVIEW_LINES: usize = 5;

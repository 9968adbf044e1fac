//! Document format detection, text extraction and heuristic enrichment

pub mod enrichment;
pub mod format;

pub use enrichment::enrich;
pub use format::{extract_text, DocumentFormat, ExtractedText};

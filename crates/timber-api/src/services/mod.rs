//! Request-independent workflows used by the handlers

pub mod billing;
pub mod document_processing;

use timber_core::Config;

/// OpenAI model for a user: the larger model for paying subscribers
pub fn model_for(config: &Config, is_paid: bool) -> &str {
    if is_paid {
        config.openai_paid_model()
    } else {
        config.openai_free_model()
    }
}

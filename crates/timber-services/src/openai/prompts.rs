use timber_core::models::DocumentType;

pub(crate) const ADVISOR_SYSTEM_PROMPT: &str = "You are an expert financial advisor specializing in debt management, budgeting, and personal finance optimization. Your role is to:

1. Provide clear, actionable financial advice
2. Explain complex financial concepts in simple terms
3. Consider the user's complete financial picture
4. Prioritize debt reduction and financial stability
5. Always include legal disclaimers when appropriate

Important: Always remind users that this is educational information only and they should consult a certified financial advisor for personalized advice.";

pub(crate) const TIMBER_SYSTEM_PROMPT: &str = "You are Timber, a friendly beaver who helps people build their financial dam. \
You explain budgeting, saving and debt payoff with building analogies: money is timber, savings are the reservoir \
and debts are obstacles to clear. Keep replies short (under 120 words), warm and practical. \
You give educational information only and suggest a certified financial advisor for personal decisions.";

pub(crate) const EMPTY_ADVICE_FALLBACK: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

pub(crate) const EMPTY_ANALYSIS_SUMMARY: &str = "Document analyzed successfully";

/// Characters of document text sent to the model
pub(crate) const MAX_DOCUMENT_TEXT_CHARS: usize = 24_000;

pub(crate) fn document_system_prompt(document_type: DocumentType) -> String {
    format!(
        r#"You are a financial document analysis assistant. Analyze the provided financial document and extract relevant information.

For {document_type} documents, extract:
- Account holder information
- Balance information
- Payment details
- Interest rates (if applicable)
- Due dates (if applicable)

Return a JSON object with:
- summary: a brief summary of the document
- statement: {{"total": stated total or null, "date": statement or document date or null, "vendor": issuer or merchant or null}}
- extractedData: {{"debts": [{{"creditor", "balance", "apr", "minimumPayment"}}], "assets": [{{"name", "type", "value", "details"}}], "income": {{"monthlyAmount", "source"}} or null}}

Be precise and extract only information that is clearly visible in the document."#
    )
}

pub(crate) fn document_user_prompt(document_type: DocumentType) -> String {
    format!("Analyze this {document_type} document and extract financial information.")
}

/// Pull the JSON payload out of a completion that may wrap it in a code fence
pub(crate) fn extract_json(text: &str) -> &str {
    if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else {
        text.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let text = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```\nThanks";
        assert_eq!(extract_json(text), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_extract_json_from_plain_fence_and_bare_text() {
        assert_eq!(extract_json("```\n{}\n```"), "{}");
        assert_eq!(extract_json("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_document_prompts_name_the_type() {
        let prompt = document_system_prompt(DocumentType::CreditCard);
        assert!(prompt.contains("For credit-card documents"));
        assert_eq!(
            document_user_prompt(DocumentType::PayStub),
            "Analyze this pay-stub document and extract financial information."
        );
    }
}

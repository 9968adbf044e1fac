//! Upload pipeline: text extraction, AI analysis, enrichment and import of
//! the extracted debts, assets and income.

use crate::auth::UserContext;
use crate::services::model_for;
use crate::state::AppState;
use crate::utils::upload::DocumentUpload;
use timber_core::constants::ANALYSIS_PREVIEW_LINES;
use timber_core::models::{
    DebtType, Document, DocumentAiAnalysis, DocumentOutcome, DocumentStatus, DocumentType,
    EnrichedAnalysis, ExtractedFinancialData, StoredAnalysis,
};
use timber_core::AppError;
use timber_db::NewDocument;
use timber_processing::{enrich, extract_text, DocumentFormat, ExtractedText};
use timber_services::{DocumentAnalysisRequest, DocumentContent};
use uuid::Uuid;

/// Store an already-validated upload and run it through analysis.
///
/// AI failures are recorded on the document (`failed`, `needsReview`) rather
/// than returned, so the caller always gets the stored document back.
pub async fn process_upload(
    state: &AppState,
    user: &UserContext,
    upload: DocumentUpload,
) -> Result<Document, AppError> {
    let DocumentUpload {
        data,
        filename,
        content_type,
        document_type,
    } = upload;

    let document = state
        .db
        .documents
        .create(NewDocument {
            user_id: &user.user_id,
            file_name: &filename,
            file_type: &content_type,
            document_type,
            size_bytes: i64::try_from(data.len()).unwrap_or(i64::MAX),
        })
        .await?;

    let format = DocumentFormat::detect(&data);
    let (data, extracted) = extract_blocking(data, format).await;
    tracing::debug!(
        document_id = %document.id,
        format = ?format,
        text_len = extracted.text.as_ref().map(|t| t.len()).unwrap_or(0),
        pages = ?extracted.pages,
        "Document text extracted"
    );

    let ai = match analyze(state, user, document_type, format, &data, &extracted).await {
        Ok(ai) => ai,
        Err(e) => {
            tracing::warn!(document_id = %document.id, error = %e, "Document analysis failed");
            let failed = state
                .db
                .documents
                .record_outcome(
                    document.id,
                    &DocumentOutcome {
                        status: DocumentStatus::Failed,
                        pages: extracted.pages,
                        analysis_data: None,
                        needs_review: true,
                    },
                )
                .await?;
            return Ok(failed);
        }
    };

    let stored = build_stored_analysis(document_type, extracted.text.as_deref(), ai.as_ref());

    let mut import_failed = false;
    if let Some(data) = stored.extracted_data.as_ref() {
        if let Err(e) = import_extracted(state, &user.user_id, document.id, document_type, data).await
        {
            tracing::warn!(document_id = %document.id, error = %e, "Importing extracted data failed");
            import_failed = true;
        }
    }

    let needs_review = needs_review(&stored, extracted.text.is_some()) || import_failed;
    let analysis_data = serde_json::to_value(&stored)?;

    let document = state
        .db
        .documents
        .record_outcome(
            document.id,
            &DocumentOutcome {
                status: DocumentStatus::Completed,
                pages: extracted.pages,
                analysis_data: Some(analysis_data),
                needs_review,
            },
        )
        .await?;

    tracing::info!(
        document_id = %document.id,
        user_id = %user.user_id,
        document_type = %document_type,
        needs_review,
        "Document processed"
    );
    Ok(document)
}

/// PDF parsing is CPU bound; run it off the async workers
async fn extract_blocking(data: Vec<u8>, format: DocumentFormat) -> (Vec<u8>, ExtractedText) {
    let handle = tokio::task::spawn_blocking(move || {
        let result = extract_text(&data, format);
        (data, result)
    });

    match handle.await {
        Ok((data, Ok(text))) => (data, text),
        Ok((data, Err(e))) => {
            tracing::warn!(error = %e, "Text extraction failed");
            (data, ExtractedText::default())
        }
        Err(e) => {
            tracing::error!(error = %e, "Text extraction task panicked");
            (Vec::new(), ExtractedText::default())
        }
    }
}

/// `Ok(None)` when there is no assistant or nothing to send it
async fn analyze(
    state: &AppState,
    user: &UserContext,
    document_type: DocumentType,
    format: DocumentFormat,
    data: &[u8],
    extracted: &ExtractedText,
) -> Result<Option<DocumentAiAnalysis>, AppError> {
    let Some(assistant) = state.services.assistant.as_ref() else {
        return Ok(None);
    };

    let content = if format.is_image() {
        DocumentContent::Image {
            data,
            mime_type: format.mime_type(),
        }
    } else if let Some(text) = extracted.text.as_deref() {
        DocumentContent::Text(text)
    } else {
        return Ok(None);
    };

    let analysis = assistant
        .analyze_document(DocumentAnalysisRequest {
            model: model_for(&state.config, user.is_paid),
            document_type,
            content,
        })
        .await
        .map_err(|e| AppError::AiService(e.to_string()))?;

    Ok(Some(analysis))
}

/// Combine the AI result with the enrichment pass over the raw text
pub fn build_stored_analysis(
    document_type: DocumentType,
    text: Option<&str>,
    ai: Option<&DocumentAiAnalysis>,
) -> StoredAnalysis {
    let base = EnrichedAnalysis {
        doc_type: document_type.as_str().to_string(),
        summary: ai.map(|a| a.statement.clone()).unwrap_or_default(),
        preview: text.map(preview_lines).filter(|lines| !lines.is_empty()),
        ..Default::default()
    };

    let enrichment = match text {
        Some(text) => enrich(base, text),
        None => base,
    };

    StoredAnalysis {
        enrichment,
        ai_summary: ai
            .map(|a| a.summary.trim().to_string())
            .filter(|s| !s.is_empty()),
        extracted_data: ai
            .map(|a| a.extracted_data.clone())
            .filter(|d| !d.is_empty()),
    }
}

/// Review is needed when the stated total disagrees with the transactions,
/// or when neither text nor AI data was obtained.
pub fn needs_review(stored: &StoredAnalysis, has_text: bool) -> bool {
    let has_ai_data = stored.ai_summary.is_some() || stored.extracted_data.is_some();
    stored.enrichment.total_mismatch() || (!has_text && !has_ai_data)
}

fn preview_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(ANALYSIS_PREVIEW_LINES)
        .map(String::from)
        .collect()
}

async fn import_extracted(
    state: &AppState,
    user_id: &str,
    document_id: Uuid,
    document_type: DocumentType,
    data: &ExtractedFinancialData,
) -> Result<(), AppError> {
    let debt_type = DebtType::from_document_type(document_type);
    for debt in data.debts.iter().filter(|d| !d.creditor.trim().is_empty()) {
        state
            .db
            .debts
            .upsert_extracted(user_id, debt, debt_type, document_id)
            .await?;
    }

    for asset in data.assets.iter().filter(|a| !a.name.trim().is_empty()) {
        state.db.assets.upsert_extracted(user_id, asset).await?;
    }

    if let Some(income) = data.income.as_ref().filter(|i| !i.monthly_amount.is_zero()) {
        state
            .db
            .profiles
            .set_monthly_income(user_id, income.monthly_amount)
            .await?;
    }

    tracing::debug!(
        user_id = user_id,
        debts = data.debts.len(),
        assets = data.assets.len(),
        income = data.income.is_some(),
        "Imported extracted financial data"
    );
    Ok(())
}

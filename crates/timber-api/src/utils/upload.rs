//! Multipart parsing for document uploads

use axum::extract::Multipart;
use timber_core::models::DocumentType;
use timber_core::AppError;

/// A document upload read from a multipart form
#[derive(Debug)]
pub struct DocumentUpload {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub document_type: DocumentType,
}

/// Extract the `file` field and the optional `documentType` field.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_document_upload(mut multipart: Multipart) -> Result<DocumentUpload, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut document_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file_data.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s: &str| s.to_string());
                content_type = field.content_type().map(|s: &str| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "documentType" => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read documentType: {}", e))
                })?;
                document_type = Some(value);
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(DocumentUpload {
        data,
        filename: filename.unwrap_or_else(|| "unknown".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        document_type: parse_document_type(document_type.as_deref())?,
    })
}

/// Blank means `other`; anything else must be a known type
fn parse_document_type(value: Option<&str>) -> Result<DocumentType, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DocumentType::Other),
        Some(v) => v
            .parse::<DocumentType>()
            .map_err(|_| AppError::InvalidInput(format!("Unknown documentType '{}'", v))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_defaults_to_other() {
        assert_eq!(parse_document_type(None).unwrap(), DocumentType::Other);
        assert_eq!(parse_document_type(Some("  ")).unwrap(), DocumentType::Other);
    }

    #[test]
    fn test_document_type_parses_known_values() {
        assert_eq!(
            parse_document_type(Some("bank-statement")).unwrap(),
            DocumentType::BankStatement
        );
    }

    #[test]
    fn test_unknown_document_type_is_rejected() {
        assert!(matches!(
            parse_document_type(Some("tax-return-ish")),
            Err(AppError::InvalidInput(_))
        ));
    }
}

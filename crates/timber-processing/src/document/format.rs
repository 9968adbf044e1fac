//! Document format detection and text extraction

use anyhow::{Context, Result};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
    Webp,
    Text,
    Unknown,
}

impl DocumentFormat {
    /// Determine format from magic bytes, falling back to UTF-8 text.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(b"%PDF") {
            DocumentFormat::Pdf
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            DocumentFormat::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            DocumentFormat::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            DocumentFormat::Webp
        } else if !data.is_empty() && std::str::from_utf8(data).is_ok() {
            DocumentFormat::Text
        } else {
            DocumentFormat::Unknown
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            DocumentFormat::Png | DocumentFormat::Jpeg | DocumentFormat::Webp
        )
    }

    /// MIME type used when the document is sent inline to the AI service.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Png => "image/png",
            DocumentFormat::Jpeg => "image/jpeg",
            DocumentFormat::Webp => "image/webp",
            DocumentFormat::Text => "text/plain",
            DocumentFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Text and page count pulled out of an uploaded document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: Option<String>,
    pub pages: Option<i32>,
}

/// Extract plain text from PDFs and text files. Images yield no text.
pub fn extract_text(data: &[u8], format: DocumentFormat) -> Result<ExtractedText> {
    match format {
        DocumentFormat::Pdf => {
            let pages = pdf_page_count(data);
            let text = extract_pdf_text(data)?;
            Ok(ExtractedText { text, pages })
        }
        DocumentFormat::Text => {
            let text = String::from_utf8_lossy(data).trim().to_string();
            Ok(ExtractedText {
                text: Some(text).filter(|t| !t.is_empty()),
                pages: Some(1),
            })
        }
        _ => Ok(ExtractedText {
            text: None,
            pages: format.is_image().then_some(1),
        }),
    }
}

fn extract_pdf_text(data: &[u8]) -> Result<Option<String>> {
    let mut temp = tempfile::NamedTempFile::new().context("Failed to create temp file for PDF")?;
    temp.write_all(data)
        .context("Failed to write PDF to temp file")?;
    temp.flush().context("Failed to flush temp file")?;

    match pdf_extract::extract_text(temp.path()) {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                tracing::warn!("PDF text extraction returned empty");
                Ok(None)
            } else {
                tracing::debug!(text_len = trimmed.len(), "PDF text extracted");
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(e) => {
            // Scanned PDFs have no text layer
            tracing::warn!(error = %e, "PDF text extraction failed");
            Ok(None)
        }
    }
}

/// Read the page count from the first `/Count` entry of the page tree.
fn pdf_page_count(data: &[u8]) -> Option<i32> {
    let data_str = String::from_utf8_lossy(data);
    data_str.split("/Count").nth(1).and_then(|s| {
        let num_str = s
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();
        num_str.parse::<i32>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_magic_bytes() {
        assert_eq!(DocumentFormat::detect(b"%PDF-1.7\n"), DocumentFormat::Pdf);
        assert_eq!(
            DocumentFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            DocumentFormat::Png
        );
        assert_eq!(
            DocumentFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            DocumentFormat::Jpeg
        );
        assert_eq!(
            DocumentFormat::detect(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            DocumentFormat::Webp
        );
        assert_eq!(
            DocumentFormat::detect(b"01/02 Coffee 4.50"),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::detect(&[0x00, 0xFF, 0xFE, 0x80]),
            DocumentFormat::Unknown
        );
        assert_eq!(DocumentFormat::detect(b""), DocumentFormat::Unknown);
    }

    #[test]
    fn test_extract_text_from_plain_text() {
        let extracted = extract_text(b"  Period: 01/01/2025 to 01/31/2025\n", DocumentFormat::Text)
            .unwrap();
        assert_eq!(
            extracted.text.as_deref(),
            Some("Period: 01/01/2025 to 01/31/2025")
        );
        assert_eq!(extracted.pages, Some(1));
    }

    #[test]
    fn test_extract_text_from_image_is_empty() {
        let extracted = extract_text(&[0xFF, 0xD8, 0xFF], DocumentFormat::Jpeg).unwrap();
        assert_eq!(extracted.text, None);
        assert_eq!(extracted.pages, Some(1));
    }

    #[test]
    fn test_pdf_page_count() {
        let pdf = b"%PDF-1.4\n1 0 obj << /Type /Pages /Count 3 /Kids [] >> endobj";
        assert_eq!(pdf_page_count(pdf), Some(3));
        assert_eq!(pdf_page_count(b"%PDF-1.4\n"), None);
    }
}

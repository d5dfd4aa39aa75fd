//! Resume intake: PDF upload checks, text extraction, and truncation.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Rejects uploads that are obviously not PDFs before spending time on extraction.
pub fn check_pdf_upload(file_name: Option<&str>, data: &[u8]) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded resume is empty".to_string()));
    }
    let name = file_name.unwrap_or("resume.pdf");
    if !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(AppError::DocumentParse(
            "File does not look like a PDF".to_string(),
        ));
    }
    Ok(())
}

/// Extracts all page text from a PDF. Runs on the blocking pool; `pdf-extract`
/// is synchronous and CPU-bound.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed inputs.
            if e.is_panic() {
                warn!(bytes = size, "PDF extraction panicked");
                AppError::DocumentParse("Failed to parse PDF: malformed document".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in PDF extraction: {e}"
                ))
            }
        })?
        .map_err(|e| {
            warn!(bytes = size, error = %e, "PDF extraction failed");
            AppError::DocumentParse(format!("Failed to parse PDF: {e}"))
        })?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::DocumentParse(
            "No extractable text found in PDF".to_string(),
        ));
    }

    debug!(bytes = size, chars = text.chars().count(), "PDF text extracted");
    Ok(text)
}

/// Truncated resume text plus whether anything was cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedResume {
    pub text: String,
    pub truncated: bool,
}

/// Keeps the first `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> TrimmedResume {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => TrimmedResume {
            text: text[..cut].to_string(),
            truncated: true,
        },
        None => TrimmedResume {
            text: text.to_string(),
            truncated: false,
        },
    }
}

/// First `max_chars` characters, for upload confirmation previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars).text
}

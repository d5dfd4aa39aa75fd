//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::analyzer::{run_analysis, AnalysisResponse};
use crate::analysis::resume::{check_pdf_upload, extract_pdf_text, preview};
use crate::analysis::settings::{describe_settings, AnalysisSettings, SettingsDescriptor};
use crate::errors::AppError;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct UploadedFile {
    file_name: Option<String>,
    data: Bytes,
}

/// Multipart form posted by the page.
#[derive(Debug, Default)]
struct AnalyzeForm {
    job_description: Option<String>,
    resume: Option<UploadedFile>,
    temperature: Option<String>,
    max_resume_chars: Option<String>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "job_description" => form.job_description = Some(field.text().await?),
                "temperature" => form.temperature = Some(field.text().await?),
                "max_resume_chars" => form.max_resume_chars = Some(field.text().await?),
                "resume" => {
                    let file_name = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    // Browsers send an empty part when no file was picked.
                    if !data.is_empty() || file_name.as_deref().is_some_and(|n| !n.is_empty()) {
                        form.resume = Some(UploadedFile { file_name, data });
                    }
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Reports every missing input at once, the way the page shows them.
    fn require_inputs(self) -> Result<(String, UploadedFile), AppError> {
        let jd = self
            .job_description
            .filter(|jd| !jd.trim().is_empty());

        match (jd, self.resume) {
            (Some(jd), Some(resume)) => Ok((jd, resume)),
            (jd, resume) => {
                let mut problems = Vec::new();
                if jd.is_none() {
                    problems.push("Please paste a Job Description.");
                }
                if resume.is_none() {
                    problems.push("Please upload a valid PDF resume.");
                }
                Err(AppError::Validation(problems.join(" ")))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub message: &'static str,
    pub chars: usize,
    pub preview: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart: `job_description`, `resume` (PDF), optional `temperature` and
/// `max_resume_chars`. Returns all three reports; per-report provider failures
/// are inside the response, not HTTP errors.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let form = AnalyzeForm::read(multipart).await?;
    let settings = AnalysisSettings::from_form(
        form.temperature.as_deref(),
        form.max_resume_chars.as_deref(),
    )?;
    let (jd, upload) = form.require_inputs()?;

    check_pdf_upload(upload.file_name.as_deref(), &upload.data)?;
    let resume_text = extract_pdf_text(upload.data).await?;

    let response = run_analysis(&state.generator, &jd, &resume_text, settings).await;
    Ok(Json(response))
}

/// POST /api/v1/resume/extract
///
/// Parses an uploaded resume and returns a short preview, so the page can
/// confirm the upload before analysis.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let form = AnalyzeForm::read(multipart).await?;
    let upload = form
        .resume
        .ok_or_else(|| AppError::Validation("Please upload a valid PDF resume.".to_string()))?;

    check_pdf_upload(upload.file_name.as_deref(), &upload.data)?;
    let text = extract_pdf_text(upload.data).await?;
    let chars = text.chars().count();

    info!(
        file_name = upload.file_name.as_deref().unwrap_or("resume.pdf"),
        chars,
        "Resume uploaded"
    );

    Ok(Json(ExtractResponse {
        message: "Resume uploaded successfully!",
        chars,
        preview: preview(&text, PREVIEW_CHARS),
    }))
}

/// GET /api/v1/settings
pub async fn handle_settings() -> Json<SettingsDescriptor> {
    Json(describe_settings())
}

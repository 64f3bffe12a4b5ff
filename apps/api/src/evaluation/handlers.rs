use std::num::NonZeroUsize;

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};

use crate::errors::AppError;
use crate::evaluation::models::{BulkEvaluation, EvaluateTextRequest, EvaluationResult, Upload};
use crate::extract::Document;
use crate::state::AppState;

const DEFAULT_RESUME_NAME: &str = "resume.txt";
const DEFAULT_JD_NAME: &str = "jd.txt";

/// POST /evaluate_resume_with_jd/
/// Multipart form with one `resume` file and one `jd_file` file.
pub async fn handle_evaluate_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EvaluationResult>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut resume = None;
    let mut jd = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => resume = Some(read_upload(field).await?),
            Some("jd_file") => jd = Some(read_upload(field).await?),
            _ => {}
        }
    }

    let resume = resume.ok_or_else(|| missing_field("resume"))?;
    let jd = jd.ok_or_else(|| missing_field("jd_file"))?;

    let result = state.evaluator.evaluate_uploads(resume, jd).await?;
    Ok(Json(result))
}

/// POST /api/v1/evaluate
/// Same evaluation for callers that already hold the text.
pub async fn handle_evaluate_text(
    State(state): State<AppState>,
    body: Result<Json<EvaluateTextRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let resume = Document::new(
        req.resume_file.unwrap_or_else(|| DEFAULT_RESUME_NAME.to_string()),
        req.resume_text,
    );
    let jd = Document::new(
        req.jd_file.unwrap_or_else(|| DEFAULT_JD_NAME.to_string()),
        req.jd_text,
    );

    let result = state.evaluator.evaluate(resume, jd).await?;
    Ok(Json(result))
}

/// POST /api/v1/evaluate/bulk
/// Multipart form with repeated `resumes` files, repeated `jd_files` files (`jd_file`
/// is accepted too) and an optional `top_n`.
pub async fn handle_evaluate_bulk(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BulkEvaluation>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let mut resumes = Vec::new();
    let mut jds = Vec::new();
    let mut top_n = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resumes") => resumes.push(read_upload(field).await?),
            Some("jd_files" | "jd_file") => jds.push(read_upload(field).await?),
            Some("top_n") => {
                let raw = field.text().await?;
                let n = raw.trim().parse::<NonZeroUsize>().map_err(|_| {
                    AppError::Validation(format!("top_n must be a positive integer, got '{raw}'"))
                })?;
                top_n = Some(n);
            }
            _ => {}
        }
    }

    if resumes.is_empty() {
        return Err(missing_field("resumes"));
    }
    if jds.is_empty() {
        return Err(missing_field("jd_files"));
    }

    let bulk = state.evaluator.evaluate_bulk(resumes, jds, top_n).await?;
    Ok(Json(bulk))
}

async fn read_upload(field: Field<'_>) -> Result<Upload, AppError> {
    let filename = field
        .file_name()
        .or(field.name())
        .unwrap_or_default()
        .to_string();
    let bytes = field.bytes().await?;
    Ok(Upload { filename, bytes })
}

fn missing_field(name: &str) -> AppError {
    AppError::Validation(format!("missing multipart field '{name}'"))
}

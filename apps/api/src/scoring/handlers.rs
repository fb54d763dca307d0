use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::catalog::GuideSummary;
use crate::scoring::engine::ScoreRequest;
use crate::scoring::guide::{Guide, InvalidGuideError};
use crate::scoring::normalizer::normalize_bytes;
use crate::scoring::report::ScoreReport;
use crate::state::AppState;

fn default_domain() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequestBody {
    pub document_text: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Guide definition for this request only. Overrides the catalog guide.
    #[serde(default)]
    pub guide: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub report_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub domain: String,
    pub guide_title: String,
    pub scorer_backend: String,
    pub report: ScoreReport,
}

/// POST /api/v1/reports/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequestBody>,
) -> Result<Json<ScoreResponse>, AppError> {
    let explicit = match req.guide {
        Some(definition) => Some(parse_guide(move || Guide::from_value(&definition)).await?),
        None => None,
    };
    let response = run_scoring(&state, req.document_text, req.domain, explicit).await?;
    Ok(Json(response))
}

/// POST /api/v1/reports/score/upload
///
/// Parts: `document` (file, required), `domain` (text), `guide` (file, optional).
pub async fn handle_score_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let mut document: Option<(String, Bytes)> = None;
    let mut guide_upload: Option<(String, Bytes)> = None;
    let mut domain = default_domain();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        match name.as_str() {
            "document" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Cannot read document: {e}")))?;
                document = Some((file_name, bytes));
            }
            "guide" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Cannot read guide: {e}")))?;
                guide_upload = Some((file_name, bytes));
            }
            "domain" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Cannot read domain: {e}")))?;
                if !text.trim().is_empty() {
                    domain = text.trim().to_string();
                }
            }
            other => debug!(part = other, "Ignoring unknown multipart part"),
        }
    }

    let (document_name, document_bytes) = document
        .ok_or_else(|| AppError::Validation("Missing 'document' part".to_string()))?;

    let explicit = match guide_upload {
        Some((file_name, bytes)) => {
            Some(parse_guide(move || Guide::from_upload(&file_name, &bytes)).await?)
        }
        None => None,
    };

    let max_chars = state.config.max_text_chars;
    let text = tokio::task::spawn_blocking(move || normalize_bytes(&document_bytes, max_chars))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
        })?;

    info!(
        document = %document_name,
        text_chars = text.len(),
        "Extracted uploaded document"
    );

    let response = run_scoring(&state, text, domain, explicit).await?;
    Ok(Json(response))
}

/// GET /api/v1/guides
pub async fn handle_list_guides(State(state): State<AppState>) -> Json<Vec<GuideSummary>> {
    Json(state.guides.summaries())
}

/// GET /api/v1/guides/:domain
pub async fn handle_get_guide(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<GuideSummary>, AppError> {
    let guide = state
        .guides
        .for_domain(&domain)
        .ok_or_else(|| AppError::NotFound(format!("No guide for domain '{domain}'")))?;
    Ok(Json(GuideSummary::new(Some(&domain.trim().to_lowercase()), &guide)))
}

/// POST /api/v1/guides/validate
pub async fn handle_validate_guide(
    Json(definition): Json<Value>,
) -> Result<Json<GuideSummary>, AppError> {
    let guide = parse_guide(move || Guide::from_value(&definition)).await?;
    Ok(Json(GuideSummary::new(None, &guide)))
}

/// Compiles a caller-supplied guide on a blocking thread; patterns may be large.
async fn parse_guide<F>(parse: F) -> Result<Guide, AppError>
where
    F: FnOnce() -> Result<Guide, InvalidGuideError> + Send + 'static,
{
    let guide = tokio::task::spawn_blocking(parse).await.map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in guide parsing: {e}"))
    })??;
    Ok(guide)
}

/// Resolves the guide (explicit → catalog → engine default) and runs the scorer.
async fn run_scoring(
    state: &AppState,
    document_text: String,
    domain: String,
    explicit: Option<Guide>,
) -> Result<ScoreResponse, AppError> {
    let guide = explicit
        .map(Arc::new)
        .or_else(|| state.guides.for_domain(&domain));
    let guide_title = guide
        .as_ref()
        .map(|g| g.title.clone())
        .unwrap_or_else(|| Guide::default_guide().title.clone());

    let report = state
        .scorer
        .score(ScoreRequest {
            document_text,
            domain: domain.clone(),
            guide,
        })
        .await?;

    info!(
        domain = %domain,
        guide = %guide_title,
        overall_score = report.overall_score,
        "Report scored"
    );

    Ok(ScoreResponse {
        report_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        domain,
        guide_title,
        scorer_backend: state.scorer.backend().to_string(),
        report,
    })
}

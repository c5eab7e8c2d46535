// src/web/handlers.rs
use crate::core::order::{PartialSectionOrder, SectionOrder};
use crate::core::selector::Selection;
use crate::generator::{validate_selection, NoMatchingItems};
use crate::matching::{JobAnalysis, JobPosting, MatchClient};
use crate::types::Resume;
use crate::web::transform::TransformedResume;
use crate::web::types::*;
use anyhow::Context;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::info;

/// Cached resume with the stored section order applied
async fn ordered_resume(state: &AppState, resume: Arc<Resume>) -> Result<Resume, ApiError> {
    let order = SectionOrder::load_or_default(&state.order_path, &resume).await?;
    let mut resume = Resume::clone(&resume);
    order.apply(&mut resume);
    Ok(resume)
}

pub async fn get_resume_handler(state: &State<AppState>) -> Result<Json<TransformedResume>, ApiError> {
    let resume = state.cache.get().await?;
    let resume = ordered_resume(state, resume).await?;
    Ok(Json(TransformedResume::from(&resume)))
}

pub async fn reload_resume_handler(
    state: &State<AppState>,
) -> Result<Json<TransformedResume>, ApiError> {
    let resume = state.cache.reload().await?;
    info!("Resume reloaded on request");
    let resume = ordered_resume(state, resume).await?;
    Ok(Json(TransformedResume::from(&resume)))
}

pub async fn analyze_job_handler(
    request: AnalyzeRequest,
    state: &State<AppState>,
) -> Result<Json<JobAnalysis>, ApiError> {
    if request.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".to_string()));
    }

    let resume = state.cache.get().await?;
    let client = MatchClient::new(&state.scoring).map_err(anyhow::Error::from)?;

    let job = JobPosting {
        title: request.job_title,
        company: request.company,
        description: request.description,
    };
    let analysis = client
        .analyze(&resume, &job)
        .await
        .context("Failed to analyze job")?;

    Ok(Json(analysis))
}

pub async fn generate_handler(
    request: GenerateRequest,
    state: &State<AppState>,
) -> Result<PdfResponse, ApiError> {
    let resume = state.cache.get().await?;
    let resume = ordered_resume(state, resume).await?;

    let selection = Selection::by_ids(request.selections.into_values().flatten());
    validate_selection(&resume, &selection)
        .map_err(|e: NoMatchingItems| ApiError::BadRequest(e.to_string()))?;

    let generated = state
        .generator
        .generate(&resume, &selection, request.template.as_deref())
        .await?;

    Ok(PdfResponse::new(generated.pdf))
}

pub async fn get_order_handler(state: &State<AppState>) -> Result<Json<SectionOrder>, ApiError> {
    let resume = state.cache.get().await?;
    let order = SectionOrder::load_or_default(&state.order_path, &resume).await?;
    Ok(Json(order))
}

pub async fn update_order_handler(
    partial: PartialSectionOrder,
    state: &State<AppState>,
) -> Result<Json<SectionOrder>, ApiError> {
    let resume = state.cache.get().await?;
    let mut order = SectionOrder::load_or_default(&state.order_path, &resume).await?;
    order.merge(partial);
    order.save(&state.order_path).await?;
    Ok(Json(order))
}

pub async fn templates_handler(state: &State<AppState>) -> Json<TemplatesResponse> {
    let templates = state
        .generator
        .templates()
        .names()
        .into_iter()
        .map(String::from)
        .collect();
    Json(TemplatesResponse { templates })
}

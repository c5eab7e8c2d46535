// src/web/mod.rs
//! JSON API for the resume front-end

pub mod cache;
pub mod handlers;
pub mod transform;
pub mod types;

pub use cache::ResumeCache;
pub use types::*;

use crate::core::config_manager::ConfigManager;
use crate::core::fs_ops::FsOps;
use crate::core::order::{PartialSectionOrder, SectionOrder, DEFAULT_ORDER_FILE};
use crate::core::templates::TemplateRegistry;
use crate::generator::ResumeGenerator;
use crate::matching::JobAnalysis;
use crate::web::transform::TransformedResume;
use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use std::path::PathBuf;
use tracing::info;

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[get("/resume")]
pub async fn get_resume(state: &State<AppState>) -> Result<Json<TransformedResume>, ApiError> {
    handlers::get_resume_handler(state).await
}

#[post("/resume/reload")]
pub async fn reload_resume(state: &State<AppState>) -> Result<Json<TransformedResume>, ApiError> {
    handlers::reload_resume_handler(state).await
}

#[post("/job/analyze", data = "<request>")]
pub async fn analyze_job(
    request: Json<AnalyzeRequest>,
    state: &State<AppState>,
) -> Result<Json<JobAnalysis>, ApiError> {
    handlers::analyze_job_handler(request.into_inner(), state).await
}

#[post("/generate", data = "<request>")]
pub async fn generate(
    request: Json<GenerateRequest>,
    state: &State<AppState>,
) -> Result<PdfResponse, ApiError> {
    handlers::generate_handler(request.into_inner(), state).await
}

#[get("/order")]
pub async fn get_order(state: &State<AppState>) -> Result<Json<SectionOrder>, ApiError> {
    handlers::get_order_handler(state).await
}

#[put("/order", data = "<partial>")]
pub async fn update_order(
    partial: Json<PartialSectionOrder>,
    state: &State<AppState>,
) -> Result<Json<SectionOrder>, ApiError> {
    handlers::update_order_handler(partial.into_inner(), state).await
}

#[get("/templates")]
pub async fn get_templates(state: &State<AppState>) -> Json<TemplatesResponse> {
    handlers::templates_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Malformed JSON surfaces as 400, well-formed JSON of the wrong shape as 422
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    ErrorBody::new("invalid request body")
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    ErrorBody::new(format!("no route for {} {}", request.method(), request.uri()))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorBody> {
    ErrorBody::new("invalid request body")
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    ErrorBody::new("internal server error")
}

fn mount(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(state)
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                health,
                get_resume,
                reload_resume,
                analyze_job,
                generate,
                get_order,
                update_order,
                get_templates,
                options,
            ],
        )
}

/// Route table over `state` with Rocket's default configuration
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    mount(rocket::build(), state)
}

impl AppState {
    pub fn from_config(resume_path: PathBuf, config: &ConfigManager) -> Result<Self> {
        let templates = TemplateRegistry::discover(config.paths.templates_dir.as_deref())?;
        let order_path = config
            .paths
            .order_path
            .clone()
            .unwrap_or_else(|| FsOps::sibling(&resume_path, DEFAULT_ORDER_FILE));

        Ok(Self {
            cache: ResumeCache::new(resume_path),
            order_path,
            generator: ResumeGenerator::new(templates, config.toolchain.clone()),
            scoring: config.scoring.clone(),
        })
    }
}

pub async fn start_web_server(resume_path: PathBuf, config: ConfigManager, port: u16) -> Result<()> {
    if !resume_path.is_file() {
        anyhow::bail!("resume file not found: {}", resume_path.display());
    }

    let state = AppState::from_config(resume_path, &config)?;

    info!("Starting resume API server");
    info!("Resume: {}", state.cache.path().display());
    info!("Section order: {}", state.order_path.display());
    info!("Server: http://0.0.0.0:{}", port);

    // warm the cache so a broken source fails at startup
    state.cache.get().await.context("Failed to load resume")?;

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    mount(rocket::custom(figment), state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

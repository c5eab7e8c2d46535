// src/web/types.rs
use crate::core::config_manager::ScoringConfig;
use crate::generator::ResumeGenerator;
use crate::web::cache::ResumeCache;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, warn};

/// Shared state handed to every handler
pub struct AppState {
    pub cache: ResumeCache,
    pub order_path: PathBuf,
    pub generator: ResumeGenerator,
    pub scoring: ScoringConfig,
}

pub struct PdfResponse {
    pub data: Vec<u8>,
    pub filename: String,
}

impl PdfResponse {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            filename: "resume.pdf".to_string(),
        }
    }
}

impl<'r> Responder<'r, 'static> for PdfResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::PDF)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: message.into(),
        })
    }
}

/// Handler failure: 400 for request-shape problems, 500 for everything else
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                warn!("{} {}: {}", request.method(), request.uri(), message);
                (Status::BadRequest, message)
            }
            ApiError::Internal(e) => {
                let message = format!("{:#}", e);
                error!("{} {} failed: {}", request.method(), request.uri(), message);
                (Status::InternalServerError, message)
            }
        };

        Response::build_from(ErrorBody::new(message).respond_to(request)?)
            .status(status)
            .ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TemplatesResponse {
    pub templates: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct AnalyzeRequest {
    pub job_title: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct GenerateRequest {
    /// Section name -> selected ids; flattened into one set
    pub selections: BTreeMap<String, Vec<String>>,
    pub template: Option<String>,
}

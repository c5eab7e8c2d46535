// src/matching/mod.rs
//! Relevance scoring of resume content against a job description

pub mod client;
pub mod prompts;
pub mod response;

use crate::core::deadline::DeadlineExceeded;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use client::MatchClient;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("OPENROUTER_API_KEY environment variable not set")]
    MissingCredential,

    #[error("failed to make request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no response choices returned")]
    EmptyChoices,

    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    DeadlineExceeded(#[from] DeadlineExceeded),
}

/// Identifier -> relevance score in [0, 100]
pub type Scores = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    pub scores: Scores,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub keywords: Vec<String>,
    pub scores: Scores,
    pub suggested_items: Vec<String>,
}

/// Job posting fields the rich analysis works from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
}

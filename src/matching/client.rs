// src/matching/client.rs
//! OpenRouter chat-completions client

use super::prompts::{build_analysis_prompt, build_scoring_prompt};
use super::response::{parse_analysis, parse_scores};
use super::{JobAnalysis, JobPosting, MatchError, MatchResult};
use crate::core::config_manager::ScoringConfig;
use crate::core::deadline::run_with_deadline;
use crate::types::Resume;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// One request per call: no retries, no streaming, transport-default timeouts.
/// An optional outer deadline comes from configuration.
#[derive(Clone)]
pub struct MatchClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
    deadline: Option<Duration>,
}

impl MatchClient {
    /// Fails before any network activity when no credential is configured
    pub fn new(config: &ScoringConfig) -> Result<Self, MatchError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(MatchError::MissingCredential)?;

        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            model: config.model.clone(),
            url: config.url.clone(),
            deadline: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Score every bullet and leadership entry against the job description
    pub async fn score(&self, resume: &Resume, job_description: &str) -> Result<MatchResult, MatchError> {
        let prompt = build_scoring_prompt(resume, job_description);
        let content = self.complete(&prompt).await?;
        let scores = parse_scores(&content)?;
        info!("Scored {} resume items", scores.len());
        Ok(MatchResult { scores })
    }

    /// Keywords, scores and suggestions, restricted to identifiers the resume contains
    pub async fn analyze(&self, resume: &Resume, job: &JobPosting) -> Result<JobAnalysis, MatchError> {
        let all_ids = resume.all_item_ids();
        let prompt = build_analysis_prompt(resume, job, &all_ids);
        let content = self.complete(&prompt).await?;

        let known = all_ids.into_iter().collect();
        let analysis = parse_analysis(&content, &known)?;
        info!(
            "Job analysis: {} keywords, {} scores, {} suggestions",
            analysis.keywords.len(),
            analysis.scores.len(),
            analysis.suggested_items.len()
        );
        Ok(analysis)
    }

    async fn complete(&self, prompt: &str) -> Result<String, MatchError> {
        run_with_deadline(self.deadline, self.send(prompt)).await?
    }

    async fn send(&self, prompt: &str) -> Result<String, MatchError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!(
            "Calling scoring API with model {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(MatchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&body)?;
        let choice = envelope
            .choices
            .into_iter()
            .next()
            .ok_or(MatchError::EmptyChoices)?;

        debug!("Scoring reply: {} chars", choice.message.content.len());
        Ok(choice.message.content)
    }
}

// src/generator.rs
//! Selection -> rendered LaTeX -> PDF, shared by the CLI and the HTTP API

use crate::core::compiler::ArtifactCompiler;
use crate::core::config_manager::ToolchainConfig;
use crate::core::renderer::render_document;
use crate::core::selector::Selection;
use crate::core::templates::TemplateRegistry;
use crate::types::Resume;
use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
#[error("no items found matching the specified IDs/tags")]
pub struct NoMatchingItems;

/// Reject a subset that keeps no bullet or leadership entry of `resume`
pub fn validate_selection(resume: &Resume, selection: &Selection) -> Result<(), NoMatchingItems> {
    if !selection.is_unfiltered() && selection.matched_count(resume) == 0 {
        return Err(NoMatchingItems);
    }
    Ok(())
}

/// Rendered output of one generation
#[derive(Debug)]
pub struct GeneratedResume {
    pub template: String,
    pub latex: String,
    pub pdf: Vec<u8>,
}

pub struct ResumeGenerator {
    templates: TemplateRegistry,
    toolchain: ToolchainConfig,
}

impl ResumeGenerator {
    pub fn new(templates: TemplateRegistry, toolchain: ToolchainConfig) -> Self {
        Self {
            templates,
            toolchain,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Validate the selection and render the LaTeX source
    pub fn render(
        &self,
        resume: &Resume,
        selection: &Selection,
        template: Option<&str>,
    ) -> Result<(String, String)> {
        validate_selection(resume, selection)?;

        let template = self.templates.resolve(template);
        let latex = render_document(resume, selection, template)
            .context("Failed to generate LaTeX")?;
        Ok((template.name.clone(), latex))
    }

    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    /// Compile rendered LaTeX with the configured toolchain
    pub async fn compile(&self, latex: &str) -> Result<Vec<u8>> {
        let compiler = ArtifactCompiler::locate(&self.toolchain)?;
        compiler
            .compile(latex)
            .await
            .context("Failed to generate PDF")
    }

    /// Render and compile to PDF
    pub async fn generate(
        &self,
        resume: &Resume,
        selection: &Selection,
        template: Option<&str>,
    ) -> Result<GeneratedResume> {
        let (template, latex) = self.render(resume, selection, template)?;
        let pdf = self.compile(&latex).await?;

        info!(
            "Generated resume with template '{}' ({} bytes)",
            template,
            pdf.len()
        );
        Ok(GeneratedResume {
            template,
            latex,
            pdf,
        })
    }
}

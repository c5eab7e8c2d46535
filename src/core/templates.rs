// src/core/templates.rs
//! Template registry: the built-in layout plus any `*.tex` files from a directory

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_TEMPLATE: &str = "modern";

const MODERN_SOURCE: &str = include_str!("../../templates/modern.tex");

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    pub name: String,
    pub source: String,
}

impl TemplateSource {
    pub fn builtin() -> Self {
        Self {
            name: DEFAULT_TEMPLATE.to_string(),
            source: MODERN_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    fallback: TemplateSource,
    templates: BTreeMap<String, TemplateSource>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let fallback = TemplateSource::builtin();
        let mut templates = BTreeMap::new();
        templates.insert(fallback.name.clone(), fallback.clone());
        Self {
            fallback,
            templates,
        }
    }
}

impl TemplateRegistry {
    /// Built-in templates plus every `*.tex` file in `templates_dir`.
    /// A file named like a built-in template overrides it.
    pub fn discover(templates_dir: Option<&Path>) -> Result<Self> {
        let mut registry = Self::default();

        let Some(dir) = templates_dir else {
            return Ok(registry);
        };

        if !dir.is_dir() {
            warn!("Templates directory does not exist: {}", dir.display());
            return Ok(registry);
        }

        info!("Discovering templates in: {}", dir.display());
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read templates directory: {}", dir.display()))?;

        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            let is_tex = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tex"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !path.is_file() || !is_tex {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(source) => {
                    let name = stem.to_lowercase();
                    info!("Discovered template: {} at {}", name, path.display());
                    registry
                        .templates
                        .insert(name.clone(), TemplateSource { name, source });
                }
                Err(e) => warn!("Failed to load template from {}: {}", path.display(), e),
            }
        }

        info!("Loaded {} templates", registry.templates.len());
        Ok(registry)
    }

    /// Case-insensitive lookup; unknown or absent names fall back to the default template
    pub fn resolve(&self, name: Option<&str>) -> &TemplateSource {
        let requested = name.map(str::trim).filter(|n| !n.is_empty());

        if let Some(requested) = requested {
            if let Some(template) = self.templates.get(&requested.to_lowercase()) {
                return template;
            }
            warn!(
                "Unknown template '{}', falling back to '{}'",
                requested, DEFAULT_TEMPLATE
            );
        }

        self.templates
            .get(DEFAULT_TEMPLATE)
            .unwrap_or(&self.fallback)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

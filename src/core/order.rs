// src/core/order.rs
//! Persisted display order for the experience, projects and leadership sections

use crate::core::fs_ops::FsOps;
use crate::types::Resume;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const DEFAULT_ORDER_FILE: &str = "order.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionOrder {
    pub experience: Vec<String>,
    pub projects: Vec<String>,
    pub leadership: Vec<String>,
}

/// Update overlay: only the sections present replace the stored lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSectionOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leadership: Option<Vec<String>>,
}

impl SectionOrder {
    /// Ids in the order they appear in the source
    pub fn from_resume(resume: &Resume) -> Self {
        Self {
            experience: resume.experience.iter().map(|e| e.id.clone()).collect(),
            projects: resume.projects.iter().map(|p| p.id.clone()).collect(),
            leadership: resume.leadership.iter().map(|l| l.id.clone()).collect(),
        }
    }

    /// Read the ordering file, or derive the default order when it does not exist
    pub async fn load_or_default(path: &Path, resume: &Resume) -> Result<Self> {
        match FsOps::read_file_optional(path).await? {
            Some(content) => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse order file: {}", path.display())),
            None => Ok(Self::from_resume(resume)),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize section order")?;
        FsOps::write_file_safe(path, content).await?;
        info!("Saved section order to {}", path.display());
        Ok(())
    }

    pub fn merge(&mut self, partial: PartialSectionOrder) {
        if let Some(experience) = partial.experience {
            self.experience = experience;
        }
        if let Some(projects) = partial.projects {
            self.projects = projects;
        }
        if let Some(leadership) = partial.leadership {
            self.leadership = leadership;
        }
    }

    /// Reorder the resume sections: listed ids first in listed order,
    /// everything else afterwards in source order
    pub fn apply(&self, resume: &mut Resume) {
        reorder(&mut resume.experience, &self.experience, |e| &e.id);
        reorder(&mut resume.projects, &self.projects, |p| &p.id);
        reorder(&mut resume.leadership, &self.leadership, |l| &l.id);
    }
}

fn reorder<T>(items: &mut [T], order: &[String], id: impl Fn(&T) -> &String) {
    if order.is_empty() {
        return;
    }

    let mut rank: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (position, item_id) in order.iter().enumerate() {
        rank.entry(item_id.as_str()).or_insert(position);
    }

    // stable: unlisted items keep their relative order
    items.sort_by_key(|item| rank.get(id(item).as_str()).copied().unwrap_or(usize::MAX));
}

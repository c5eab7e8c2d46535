// src/types/resume.rs
//! Resume data model loaded from the structured source file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ===== Resume Structure =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    pub contact: ContactInfo,
    pub summary: String,
    pub education: Education,
    pub skills: Skills,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub leadership: Vec<LeadershipEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub minor: String,
    pub gpa: String,
    pub honors: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<SkillItem>,
    pub frameworks: Vec<SkillItem>,
    pub cloud: Vec<SkillItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillItem {
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub tags: Vec<String>,
    pub bullets: Vec<Bullet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub id: String,
    pub title: String,
    pub technologies: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    pub tags: Vec<String>,
    pub bullets: Vec<Bullet>,
}

/// Atomic selectable line of content. Ids are assumed unique across the resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bullet {
    pub id: String,
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadershipEntry {
    pub id: String,
    pub text: String,
    pub tags: Vec<String>,
}

// ===== Flattened Projection =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Experience,
    Projects,
    Leadership,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Experience, Section::Projects, Section::Leadership];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Experience => "Experience",
            Section::Projects => "Projects",
            Section::Leadership => "Leadership",
        }
    }
}

/// A bullet or leadership entry flattened for listing and scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWithId<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub tags: &'a [String],
    pub section: Section,
    /// Company for experience, title for projects, empty for leadership
    pub category: &'a str,
}

// ===== Source Loading =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }
}

impl Resume {
    /// Read and parse the resume source file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resume file: {}", path.display()))?;
        Self::parse(&content, SourceFormat::from_path(path))
            .with_context(|| format!("Failed to parse resume file: {}", path.display()))
    }

    pub fn parse(content: &str, format: SourceFormat) -> Result<Self> {
        match format {
            SourceFormat::Yaml => serde_yaml::from_str(content).context("Invalid resume YAML"),
            SourceFormat::Json => serde_json::from_str(content).context("Invalid resume JSON"),
        }
    }

    /// All selectable items in source order: experience bullets, project bullets, leadership
    pub fn all_items(&self) -> Vec<ItemWithId<'_>> {
        let experience = self.experience.iter().flat_map(|exp| {
            exp.bullets.iter().map(move |bullet| ItemWithId {
                id: &bullet.id,
                text: &bullet.text,
                tags: &bullet.tags,
                section: Section::Experience,
                category: &exp.company,
            })
        });

        let projects = self.projects.iter().flat_map(|proj| {
            proj.bullets.iter().map(move |bullet| ItemWithId {
                id: &bullet.id,
                text: &bullet.text,
                tags: &bullet.tags,
                section: Section::Projects,
                category: &proj.title,
            })
        });

        let leadership = self.leadership.iter().map(|lead| ItemWithId {
            id: &lead.id,
            text: &lead.text,
            tags: &lead.tags,
            section: Section::Leadership,
            category: "",
        });

        experience.chain(projects).chain(leadership).collect()
    }

    /// Every identifier a scoring reply may reference: synthetic skill ids,
    /// entry ids, bullet ids and leadership ids, in source order
    pub fn all_item_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .skills
            .iter()
            .map(|skill| skill_id(&skill.name))
            .collect();

        for exp in &self.experience {
            ids.push(exp.id.clone());
            ids.extend(exp.bullets.iter().map(|b| b.id.clone()));
        }

        for proj in &self.projects {
            ids.push(proj.id.clone());
            ids.extend(proj.bullets.iter().map(|b| b.id.clone()));
        }

        ids.extend(self.leadership.iter().map(|l| l.id.clone()));
        ids
    }

    pub fn known_ids(&self) -> BTreeSet<String> {
        self.all_item_ids().into_iter().collect()
    }
}

impl Skills {
    /// Named categories in display order
    pub fn categories(&self) -> [(&'static str, &[SkillItem]); 3] {
        [
            ("languages", self.languages.as_slice()),
            ("frameworks", self.frameworks.as_slice()),
            ("cloud", self.cloud.as_slice()),
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillItem> {
        self.languages
            .iter()
            .chain(&self.frameworks)
            .chain(&self.cloud)
    }
}

/// Synthetic identifier for a skill, e.g. "Spring Boot" -> "skill-spring-boot"
pub fn skill_id(name: &str) -> String {
    format!("skill-{}", name.replace(' ', "-").to_lowercase())
}


#[cfg(test)]
mod tests {
    use super::fixtures::{sample_resume, SAMPLE_YAML};
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_resume_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();

        let resume = Resume::load(file.path()).unwrap();
        assert_eq!(resume.contact.name, "Test User");
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].id, "test-exp");
        assert_eq!(resume.experience[0].bullets[0].id, "test-bullet");
        assert!(resume.skills.cloud[0].tags.is_empty());
        assert_eq!(resume.projects[0].github, None);
    }

    #[test]
    fn test_load_resume_file_not_found() {
        let err = Resume::load(Path::new("/nonexistent/file.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read resume file"));
    }

    #[test]
    fn test_json_source_is_parsed_as_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"contact": {"name": "Json User"}, "leadership": [{"id": "l1", "text": "x"}]}"#)
            .unwrap();

        let resume = Resume::load(file.path()).unwrap();
        assert_eq!(resume.contact.name, "Json User");
        assert_eq!(resume.leadership[0].id, "l1");
    }

    #[test]
    fn test_all_items_flattens_in_source_order() {
        let resume = sample_resume();
        let items = resume.all_items();

        let ids: Vec<&str> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["test-bullet", "proj-bullet", "lead"]);
        assert_eq!(items[0].category, "Test Company");
        assert_eq!(items[1].category, "Side Project");
        assert_eq!(items[2].section, Section::Leadership);
        assert_eq!(items[2].category, "");
    }

    #[test]
    fn test_all_item_ids_include_skills_and_entries() {
        let resume = sample_resume();
        assert_eq!(
            resume.all_item_ids(),
            vec![
                "skill-go",
                "skill-spring-boot",
                "skill-aws",
                "test-exp",
                "test-bullet",
                "proj",
                "proj-bullet",
                "lead",
            ]
        );
    }
}

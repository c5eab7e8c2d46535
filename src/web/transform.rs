// src/web/transform.rs
//! Resume shape served to the front-end: every item carries a `selected` flag

use crate::types::{Bullet, ContactInfo, Education, Resume, SkillItem};
use rocket::serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedResume {
    pub contact: ContactInfo,
    pub summary: String,
    pub education: Education,
    pub skills: Vec<SkillCategory>,
    pub experience: Vec<TransformedExperience>,
    pub projects: Vec<TransformedProject>,
    pub leadership: Vec<TransformedLeadership>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SkillCategory {
    pub category: String,
    pub items: Vec<TransformedSkill>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedSkill {
    pub name: String,
    pub tags: Vec<String>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedExperience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub tags: Vec<String>,
    pub bullets: Vec<TransformedBullet>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedProject {
    pub id: String,
    pub title: String,
    pub technologies: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    pub tags: Vec<String>,
    pub bullets: Vec<TransformedBullet>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedBullet {
    pub id: String,
    pub text: String,
    pub tags: Vec<String>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TransformedLeadership {
    pub id: String,
    pub text: String,
    pub tags: Vec<String>,
    pub selected: bool,
}

fn transform_skills(items: &[SkillItem]) -> Vec<TransformedSkill> {
    items
        .iter()
        .map(|item| TransformedSkill {
            name: item.name.clone(),
            tags: item.tags.clone(),
            selected: true,
        })
        .collect()
}

fn transform_bullets(bullets: &[Bullet]) -> Vec<TransformedBullet> {
    bullets
        .iter()
        .map(|bullet| TransformedBullet {
            id: bullet.id.clone(),
            text: bullet.text.clone(),
            tags: bullet.tags.clone(),
            selected: true,
        })
        .collect()
}

impl From<&Resume> for TransformedResume {
    fn from(resume: &Resume) -> Self {
        let skills = resume
            .skills
            .categories()
            .into_iter()
            .map(|(category, items)| SkillCategory {
                category: category.to_string(),
                items: transform_skills(items),
            })
            .collect();

        let experience = resume
            .experience
            .iter()
            .map(|entry| TransformedExperience {
                id: entry.id.clone(),
                title: entry.title.clone(),
                company: entry.company.clone(),
                location: entry.location.clone(),
                start_date: entry.start_date.clone(),
                end_date: entry.end_date.clone(),
                tags: entry.tags.clone(),
                bullets: transform_bullets(&entry.bullets),
                selected: true,
            })
            .collect();

        let projects = resume
            .projects
            .iter()
            .map(|entry| TransformedProject {
                id: entry.id.clone(),
                title: entry.title.clone(),
                technologies: entry.technologies.clone(),
                github: entry.github.clone().filter(|g| !g.is_empty()),
                tags: entry.tags.clone(),
                bullets: transform_bullets(&entry.bullets),
                selected: true,
            })
            .collect();

        let leadership = resume
            .leadership
            .iter()
            .map(|entry| TransformedLeadership {
                id: entry.id.clone(),
                text: entry.text.clone(),
                tags: entry.tags.clone(),
                selected: true,
            })
            .collect();

        Self {
            contact: resume.contact.clone(),
            summary: resume.summary.clone(),
            education: resume.education.clone(),
            skills,
            experience,
            projects,
            leadership,
        }
    }
}

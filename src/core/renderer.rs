// src/core/renderer.rs
//! Resume + selection -> typeset source document

use crate::core::selector::Selection;
use crate::core::template_engine::{Template, TemplateError};
use crate::core::templates::TemplateSource;
use crate::types::{Bullet, ContactInfo, Education, Resume};
use serde::Serialize;
use tracing::debug;

/// Escape free text for LaTeX.
///
/// Each input character is mapped exactly once, so the backslash replacement
/// is never re-escaped by the brace rules that follow it in the table.
pub fn escape_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '<' => out.push_str("\\textless{}"),
            '>' => out.push_str("\\textgreater{}"),
            '\u{2192}' => out.push_str("$\\rightarrow$"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct TemplateData<'a> {
    contact: &'a ContactInfo,
    summary: &'a str,
    education: &'a Education,
    include_skills: bool,
    skill_lines: Vec<SkillLine>,
    experience: Vec<ExperienceData<'a>>,
    projects: Vec<ProjectData<'a>>,
    leadership: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct SkillLine {
    label: &'static str,
    items: String,
}

#[derive(Debug, Serialize)]
struct ExperienceData<'a> {
    title: &'a str,
    company: &'a str,
    location: &'a str,
    start_date: &'a str,
    end_date: &'a str,
    bullets: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ProjectData<'a> {
    title: &'a str,
    technologies: &'a str,
    github: &'a str,
    bullets: Vec<&'a str>,
}

fn skill_label(category: &str) -> &'static str {
    match category {
        "languages" => "Languages",
        "frameworks" => "Frameworks",
        _ => "Cloud & Tools",
    }
}

fn selected_bullets<'a>(bullets: &'a [Bullet], selection: &Selection) -> Vec<&'a str> {
    bullets
        .iter()
        .filter(|bullet| selection.includes(&bullet.id))
        .map(|bullet| bullet.text.as_str())
        .collect()
}

fn prepare_template_data<'a>(resume: &'a Resume, selection: &Selection) -> TemplateData<'a> {
    let skill_lines = resume
        .skills
        .categories()
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(category, items)| SkillLine {
            label: skill_label(category),
            items: items
                .iter()
                .map(|skill| skill.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    // Entries only appear when at least one of their bullets survives
    let experience = resume
        .experience
        .iter()
        .filter_map(|exp| {
            let bullets = selected_bullets(&exp.bullets, selection);
            (!bullets.is_empty()).then(|| ExperienceData {
                title: &exp.title,
                company: &exp.company,
                location: &exp.location,
                start_date: &exp.start_date,
                end_date: &exp.end_date,
                bullets,
            })
        })
        .collect();

    let projects = resume
        .projects
        .iter()
        .filter_map(|proj| {
            let bullets = selected_bullets(&proj.bullets, selection);
            (!bullets.is_empty()).then(|| ProjectData {
                title: &proj.title,
                technologies: &proj.technologies,
                github: proj.github.as_deref().unwrap_or_default(),
                bullets,
            })
        })
        .collect();

    let leadership = resume
        .leadership
        .iter()
        .filter(|lead| selection.includes(&lead.id))
        .map(|lead| lead.text.as_str())
        .collect();

    TemplateData {
        contact: &resume.contact,
        summary: &resume.summary,
        education: &resume.education,
        include_skills: true,
        skill_lines,
        experience,
        projects,
        leadership,
    }
}

/// Render the resume through `template`, keeping only the selected items
pub fn render_document(
    resume: &Resume,
    selection: &Selection,
    template: &TemplateSource,
) -> Result<String, TemplateError> {
    let parsed = Template::parse(&template.name, &template.source)?;
    let data = prepare_template_data(resume, selection);
    let context = serde_json::to_value(&data).map_err(|e| TemplateError::Render {
        template: template.name.clone(),
        message: format!("failed to build template input: {}", e),
    })?;

    let output = parsed.render(&context, escape_latex)?;
    debug!(
        "Rendered template '{}' ({} bytes)",
        template.name,
        output.len()
    );
    Ok(output)
}

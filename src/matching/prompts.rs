// src/matching/prompts.rs
//! Prompt construction for the scoring calls

use super::JobPosting;
use crate::types::{skill_id, ItemWithId, Resume};
use crate::utils::truncate_text;
use std::fmt::Write;

const RUBRIC: &str = "\
- 90-100: Highly relevant, directly addresses key requirements
- 70-89: Relevant, demonstrates related skills
- 50-69: Somewhat relevant, transferable skills
- 30-49: Tangentially related
- 0-29: Not relevant
";

const MAX_SKILL_TAGS: usize = 5;
const MAX_EXPERIENCE_BULLETS: usize = 3;
const MAX_PROJECT_BULLETS: usize = 2;
const BULLET_TEXT_LIMIT: usize = 100;

fn write_item(prompt: &mut String, item: &ItemWithId<'_>) {
    let _ = write!(
        prompt,
        "ID: {}\nText: {}\nTags: [{}]\n\n",
        item.id,
        item.text,
        item.tags.join(", ")
    );
}

/// Every bullet and leadership entry, with the rubric and the `{"scores": ...}` reply shape
pub fn build_scoring_prompt(resume: &Resume, job_description: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are analyzing a resume against a job description. ");
    prompt.push_str("Score each resume item's relevance to the job on a scale of 0-100, where:\n");
    prompt.push_str(RUBRIC);
    prompt.push_str("\nJob Description:\n");
    prompt.push_str(job_description);
    prompt.push_str("\n\nResume Items:\n\n");

    for item in resume.all_items() {
        write_item(&mut prompt, &item);
    }

    prompt.push_str(
        "\nReturn your response as a JSON object with this exact format:\n\
         {\n  \"scores\": {\n    \"item-id-1\": 95,\n    \"item-id-2\": 82,\n    ...\n  }\n}\n\
         \nOnly include the JSON object in your response, no other text.",
    );

    prompt
}

/// Size-bounded summary of skills, experience and projects plus the full identifier list
pub fn build_analysis_prompt(resume: &Resume, job: &JobPosting, all_ids: &[String]) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a resume optimization expert. Analyze this job description and score each resume item for relevance.\n\n",
    );
    let _ = writeln!(prompt, "Job Title: {}", job.title);
    let _ = writeln!(prompt, "Company: {}\n", job.company);
    prompt.push_str("Job Description:\n");
    prompt.push_str(&job.description);
    prompt.push_str("\n\nResume Summary:\n");

    prompt.push_str("SKILLS:\n");
    for skill in resume.skills.iter() {
        let tags: Vec<&str> = skill
            .tags
            .iter()
            .take(MAX_SKILL_TAGS)
            .map(String::as_str)
            .collect();
        let _ = writeln!(
            prompt,
            "  {}: {} ({})",
            skill_id(&skill.name),
            skill.name,
            tags.join(", ")
        );
    }

    prompt.push_str("\nEXPERIENCE:\n");
    for exp in &resume.experience {
        let _ = writeln!(prompt, "  {}: {} at {}", exp.id, exp.title, exp.company);
        for bullet in exp.bullets.iter().take(MAX_EXPERIENCE_BULLETS) {
            let text = truncate_text(&bullet.text, BULLET_TEXT_LIMIT, BULLET_TEXT_LIMIT);
            let _ = writeln!(prompt, "    {}: {}", bullet.id, text);
        }
    }

    prompt.push_str("\nPROJECTS:\n");
    for proj in &resume.projects {
        let _ = writeln!(prompt, "  {}: {}", proj.id, proj.title);
        for bullet in proj.bullets.iter().take(MAX_PROJECT_BULLETS) {
            let text = truncate_text(&bullet.text, BULLET_TEXT_LIMIT, BULLET_TEXT_LIMIT);
            let _ = writeln!(prompt, "    {}: {}", bullet.id, text);
        }
    }

    prompt.push_str("\nAvailable Item IDs:\n");
    prompt.push_str(&all_ids.join(", "));

    prompt.push_str(
        "\n\nProvide a JSON response with:\n\
         1. \"keywords\": array of 10-15 key technical skills/terms from the job description\n\
         2. \"scores\": object mapping each item ID to a relevance score (0-100)\n\
         3. \"suggested_items\": array of item IDs you recommend including (score >= 60)\n\n",
    );
    prompt.push_str("Score using this scale:\n");
    prompt.push_str(RUBRIC);
    prompt.push_str(
        "\nFocus on:\n\
         - Technical skills match\n\
         - Domain/industry relevance\n\
         - Impact and achievements that align with job requirements\n\
         - Keywords and terminology overlap\n\n\
         Return ONLY valid JSON, no other text.\n\n\
         Example format:\n\
         {\n  \"keywords\": [\"python\", \"distributed systems\", \"aws\"],\n  \"scores\": {\n    \"payments-event-pipeline\": 95,\n    \"skill-python\": 85\n  },\n  \"suggested_items\": [\"payments-event-pipeline\", \"skill-python\"]\n}\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resume::fixtures::sample_resume;
    use crate::types::{Bullet, ExperienceEntry, SkillItem};

    #[test]
    fn test_scoring_prompt_lists_every_item() {
        let prompt = build_scoring_prompt(&sample_resume(), "Go backend engineer");

        assert!(prompt.contains("Go backend engineer"));
        assert!(prompt.contains("ID: test-bullet\nText: Test accomplishment\nTags: [go, testing]"));
        assert!(prompt.contains("ID: proj-bullet"));
        assert!(prompt.contains("ID: lead"));
        assert!(prompt.contains("90-100: Highly relevant"));
        assert!(prompt.contains("\"scores\""));
    }

    #[test]
    fn test_analysis_prompt_is_size_bounded() {
        let mut resume = sample_resume();
        resume.skills.languages[0] = SkillItem {
            name: "Go".to_string(),
            tags: (1..=7).map(|i| format!("t{}", i)).collect(),
        };
        resume.experience.push(ExperienceEntry {
            id: "big".to_string(),
            title: "Lead".to_string(),
            company: "BigCo".to_string(),
            bullets: (1..=4)
                .map(|i| Bullet {
                    id: format!("big-{}", i),
                    text: "y".repeat(120),
                    tags: vec![],
                })
                .collect(),
            ..Default::default()
        });

        let job = JobPosting {
            title: "Staff Engineer".to_string(),
            company: "Acme".to_string(),
            description: "Build things".to_string(),
        };
        let ids = resume.all_item_ids();
        let prompt = build_analysis_prompt(&resume, &job, &ids);

        assert!(prompt.contains("Job Title: Staff Engineer"));
        assert!(prompt.contains("skill-go: Go (t1, t2, t3, t4, t5)"));
        assert!(!prompt.contains("t6"));
        assert!(prompt.contains("big: Lead at BigCo"));
        assert!(prompt.contains("big-3"));
        assert!(prompt.contains(&format!("big-1: {}...", "y".repeat(100))));
        assert!(prompt.contains("skill-spring-boot, skill-aws, test-exp"));
        // the fourth bullet is only listed among the available ids
        assert_eq!(prompt.matches("big-4").count(), 1);
    }
}

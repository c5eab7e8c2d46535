pub mod resume;

pub use resume::{
    skill_id, Bullet, ContactInfo, Education, ExperienceEntry, ItemWithId, LeadershipEntry,
    ProjectEntry, Resume, Section, SkillItem, Skills, SourceFormat,
};

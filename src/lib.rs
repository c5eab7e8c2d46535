//! Tailor a structured resume to a job: select items, score them with a
//! remote model, and typeset the selection to PDF.

pub mod cli;
pub mod core;
pub mod generator;
pub mod matching;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::core::config_manager::ConfigManager;
pub use crate::core::selector::Selection;
pub use generator::{GeneratedResume, ResumeGenerator};
pub use types::Resume;
pub use web::{build_rocket, start_web_server};

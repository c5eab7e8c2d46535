// src/core/mod.rs
//! Selection, rendering and compilation services shared by the CLI and the API

pub mod compiler;
pub mod config_manager;
pub mod deadline;
pub mod fs_ops;
pub mod order;
pub mod renderer;
pub mod selector;
pub mod template_engine;
pub mod templates;

pub use compiler::{ArtifactCompiler, CompileError};
pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
pub use order::SectionOrder;
pub use selector::Selection;
pub use templates::TemplateRegistry;

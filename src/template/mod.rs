//! Document templates.
//!
//! Built-in templates for the constitution, the development principles and
//! the implementation report, a project-level override layer persisted in
//! `.sdd/templates.json`, and a small logic-less renderer.

pub mod defaults;
mod registry;
mod render;

pub use defaults::{BUILTIN_NAMES, CONSTITUTION, PRINCIPLES, REPORT};
pub use registry::{resolve_templates, TemplateOverrides, TemplateRegistry, TemplateStore, Templates};
pub use render::render;

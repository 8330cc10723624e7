//! Mail-merge templates
//!
//! Validates and substitutes `{{field}}` placeholders in a subject and body.

pub mod renderer;
pub mod types;

pub use renderer::TemplateRenderer;
pub use types::{MergeFields, Template};

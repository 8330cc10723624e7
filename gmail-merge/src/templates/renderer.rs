//! Merge field validation and substitution

use crate::error::{MailError, Result};
use crate::templates::{MergeFields, Template};
use std::collections::HashSet;

/// Renders templates by substituting merge fields
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Extract all placeholder names from a template
    ///
    /// Subject and body are scanned as one string (`subject + " " + body`).
    /// A name is any run of characters without braces that sits directly
    /// between a `{` and a `}`, so `{{name}}` yields `name`. Names are
    /// returned once each, in order of first appearance, and are not trimmed.
    pub fn extract_placeholders(template: &Template) -> Vec<String> {
        let text = format!("{} {}", template.subject, template.body);
        let mut seen = HashSet::new();
        let mut placeholders = Vec::new();
        let mut current: Option<String> = None;

        for c in text.chars() {
            match c {
                '{' => current = Some(String::new()),
                '}' => {
                    if let Some(name) = current.take() {
                        if !name.is_empty() && seen.insert(name.clone()) {
                            placeholders.push(name);
                        }
                    }
                }
                _ => {
                    if let Some(name) = current.as_mut() {
                        name.push(c);
                    }
                }
            }
        }

        placeholders
    }

    /// Check that every placeholder in the template has a merge field
    ///
    /// Fails with [`MailError::MissingMergeFields`] listing all missing names.
    pub fn validate(template: &Template, fields: &MergeFields) -> Result<()> {
        let missing: Vec<String> = Self::extract_placeholders(template)
            .into_iter()
            .filter(|name| !fields.contains_key(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MailError::MissingMergeFields(missing))
        }
    }

    /// Validate, then substitute merge fields into subject and body
    ///
    /// Each field replaces only the first `{{key}}` occurrence in the body and
    /// in the subject. Values are inserted literally.
    pub fn populate(template: &Template, fields: &MergeFields) -> Result<Template> {
        Self::validate(template, fields)?;

        let mut body = template.body.clone();
        let mut subject = template.subject.clone();

        for (key, value) in fields.iter() {
            let placeholder = format!("{{{{{}}}}}", key);
            body = body.replacen(&placeholder, value, 1);
            subject = subject.replacen(&placeholder, value, 1);
        }

        Ok(Template { subject, body })
    }
}

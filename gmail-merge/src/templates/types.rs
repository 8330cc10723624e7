//! Template types and data structures

use serde::{Deserialize, Serialize};

/// Subject and body containing `{{name}}` merge placeholders
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Template {
    /// Email subject
    pub subject: String,
    /// HTML body
    pub body: String,
}

impl Template {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Merge field values keyed by placeholder name (without `{{ }}`)
///
/// Entries keep their insertion order, which is also the order in which
/// they are substituted. Inserting an existing key replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeFields {
    entries: Vec<(String, String)>,
}

impl MergeFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, stringifying the value
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`MergeFields::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build fields from a JSON object
    ///
    /// String values are used as-is; any other value is replaced by its JSON text.
    /// Returns `None` when `value` is not an object.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut fields = Self::new();
        for (key, value) in object {
            match value {
                serde_json::Value::String(s) => fields.insert(key.as_str(), s),
                other => fields.insert(key.as_str(), other),
            }
        }
        Some(fields)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for MergeFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

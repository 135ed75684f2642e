//! Field-by-field readers over a completion mapping.

use serde_json::Value;

use super::{clamp_score, SchemaError, NOT_SPECIFIED};
use crate::llm_client::Completion;

pub struct Fields<'a> {
    map: &'a Completion,
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "nothing".to_string(),
        Some(v) => {
            let rendered = v.to_string();
            if rendered.chars().count() > 80 {
                format!("{}...", rendered.chars().take(80).collect::<String>())
            } else {
                rendered
            }
        }
    }
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Completion) -> Self {
        Self { map }
    }

    pub fn error(&self, field: &str, reason: &str) -> SchemaError {
        SchemaError {
            field: field.to_string(),
            received: describe(self.map.get(field)),
            reason: reason.to_string(),
        }
    }

    fn required(&self, field: &str) -> Result<&'a Value, SchemaError> {
        self.map
            .get(field)
            .ok_or_else(|| self.error(field, "required field is missing"))
    }

    /// Raw access for fields with their own coercion rules.
    pub fn value(&self, field: &str) -> Result<&'a Value, SchemaError> {
        self.required(field)
    }

    /// A required string, taken as-is.
    pub fn text(&self, field: &str) -> Result<String, SchemaError> {
        self.required(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(field, "expected a string"))
    }

    /// A required string, trimmed; `null` or blank becomes `default`.
    pub fn text_or(&self, field: &str, default: &str) -> Result<String, SchemaError> {
        match self.required(field)? {
            Value::Null => Ok(default.to_string()),
            Value::String(s) if s.trim().is_empty() => Ok(default.to_string()),
            Value::String(s) => Ok(s.trim().to_string()),
            _ => Err(self.error(field, "expected a string")),
        }
    }

    /// Like [`Fields::text_or`] with the "Not specified" sentinel.
    pub fn described(&self, field: &str) -> Result<String, SchemaError> {
        self.text_or(field, NOT_SPECIFIED)
    }

    /// A required list of strings, taken as-is.
    pub fn list(&self, field: &str) -> Result<Vec<String>, SchemaError> {
        let items = self
            .required(field)?
            .as_array()
            .ok_or_else(|| self.error(field, "expected a list of strings"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| SchemaError {
                    field: format!("{field}[{i}]"),
                    received: describe(Some(item)),
                    reason: "expected a string".to_string(),
                })
            })
            .collect()
    }

    /// A required list with entries trimmed and blank entries dropped.
    pub fn trimmed_list(&self, field: &str) -> Result<Vec<String>, SchemaError> {
        Ok(trim_entries(self.list(field)?))
    }

    /// Like [`Fields::trimmed_list`], but absent or `null` means empty.
    pub fn optional_trimmed_list(&self, field: &str) -> Result<Vec<String>, SchemaError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => self.trimmed_list(field),
        }
    }

    /// A required score: a number or numeric string, clamped to [0, 100].
    pub fn score(&self, field: &str) -> Result<f64, SchemaError> {
        let raw = match self.required(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
            _ => None,
        };

        match raw {
            Some(v) if v.is_finite() => Ok(clamp_score(v)),
            _ => Err(self.error(field, "expected a number between 0 and 100")),
        }
    }
}

fn trim_entries(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

//! Prompt templates: a read-only store of named templates and literal placeholder substitution.
//!
//! Templates use `{name}` placeholders. `{{` and `}}` render as literal braces so a template
//! can show the JSON shape it expects back. Every rendered prompt starts with a
//! `task: <template name>` line, which is what the stub backend routes on.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;
use tracing::{info, warn};

pub const RESUME_COMPRESSION: &str = "resume_compression";
pub const JD_EXTRACTION: &str = "jd_extraction";
pub const MATCHING_REASONING: &str = "matching_reasoning";
pub const EXPLANATION: &str = "explanation";
pub const ATS_SCREENING: &str = "ats_screening";
pub const ATS_SCANNER: &str = "ats_scanner";
pub const SKILL_GAP: &str = "skill_gap";
pub const CANDIDATE_SUMMARY: &str = "candidate_summary";
pub const INTERVIEW_QUESTIONS: &str = "interview_questions";
pub const RECRUITER_QA: &str = "recruiter_qa";

const TEMPLATE_EXTENSION: &str = "prompt";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        RESUME_COMPRESSION,
        include_str!("../../templates/resume_compression.prompt"),
    ),
    (
        JD_EXTRACTION,
        include_str!("../../templates/jd_extraction.prompt"),
    ),
    (
        MATCHING_REASONING,
        include_str!("../../templates/matching_reasoning.prompt"),
    ),
    (EXPLANATION, include_str!("../../templates/explanation.prompt")),
    (
        ATS_SCREENING,
        include_str!("../../templates/ats_screening.prompt"),
    ),
    (ATS_SCANNER, include_str!("../../templates/ats_scanner.prompt")),
    (SKILL_GAP, include_str!("../../templates/skill_gap.prompt")),
    (
        CANDIDATE_SUMMARY,
        include_str!("../../templates/candidate_summary.prompt"),
    ),
    (
        INTERVIEW_QUESTIONS,
        include_str!("../../templates/interview_questions.prompt"),
    ),
    (RECRUITER_QA, include_str!("../../templates/recruiter_qa.prompt")),
];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template '{template}' references '{{{placeholder}}}' but no value was supplied")]
    Substitution {
        template: String,
        placeholder: String,
    },
}

/// Named templates, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    /// The templates compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_templates(
            BUILTIN_TEMPLATES
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string())),
        )
    }

    pub fn from_templates(templates: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }

    /// Built-in templates, with any `<name>.prompt` file in `dir` replacing or adding to them.
    pub fn with_overrides(dir: &Path) -> anyhow::Result<Self> {
        let mut store = Self::builtin();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Cannot read template directory {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read template {}", path.display()))?;
            if store.contains(name) {
                info!("Loaded template override '{name}' from {}", path.display());
            } else {
                warn!("Template '{name}' from {} adds a new template", path.display());
            }
            store.templates.insert(name.to_string(), body);
        }

        Ok(store)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Renders template `name`, substituting every `{placeholder}` from `fields`.
    pub fn render(&self, name: &str, fields: &[(&str, &str)]) -> Result<String, PromptError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| PromptError::TemplateNotFound(name.to_string()))?;

        let body = substitute(name, template, fields)?;
        Ok(format!("task: {name}\n\n{body}"))
    }
}

fn substitute(name: &str, template: &str, fields: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if is_placeholder(key) {
                    let value = fields
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| PromptError::Substitution {
                            template: name.to_string(),
                            placeholder: key.to_string(),
                        })?;
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        // Lone brace that is not a placeholder: keep it as-is.
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn is_placeholder(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

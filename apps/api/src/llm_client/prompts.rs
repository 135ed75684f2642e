// Cross-cutting prompt fragments sent alongside every templated prompt.
// Task templates themselves live in `templates/` and are rendered by `crate::prompts`.

/// System prompt for structured calls. Enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured recruiting assistant. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

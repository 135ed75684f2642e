//! Recovers a JSON object from raw completion text.
//!
//! Models routinely ignore "JSON only" instructions: they wrap the object in a markdown
//! fence or surround it with prose. Recovery order after a failed direct parse:
//! 1. a ```` ```json ```` fenced block
//! 2. any fenced block
//! 3. the span from the first `{` to the last `}`

use tracing::debug;

use super::{Completion, LlmError};

/// Parses `text` as a JSON object, falling back to the recovery strategies above.
///
/// Fails with `MalformedResponse` carrying the error from the direct parse.
pub fn parse_completion(text: &str) -> Result<Completion, LlmError> {
    let text = text.trim();

    let original = match serde_json::from_str::<Completion>(text) {
        Ok(map) => return Ok(map),
        Err(e) => e,
    };

    let strategies: [(&str, fn(&str) -> Option<&str>); 3] = [
        ("json fence", json_fence),
        ("bare fence", any_fence),
        ("brace span", brace_span),
    ];

    for (strategy, extract) in strategies {
        let Some(candidate) = extract(text) else {
            continue;
        };
        if let Ok(map) = serde_json::from_str::<Completion>(candidate.trim()) {
            debug!("Recovered completion JSON via {strategy}");
            return Ok(map);
        }
    }

    Err(LlmError::MalformedResponse { source: original })
}

fn json_fence(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let body = &text[start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn any_fence(text: &str) -> Option<&str> {
    let start = text.find("```")? + "```".len();
    let body = &text[start..];
    let end = body.find("```")?;
    let body = &body[..end];

    // Drop an info string such as `JSON` or `javascript` on the opening line.
    match body.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => Some(rest),
        _ => Some(body),
    }
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

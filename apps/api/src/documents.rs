//! Plain text out of uploaded resume files.

use std::path::Path;

use crate::errors::AppError;

/// Extracts text from a PDF, plain-text, or Markdown upload, chosen by file extension.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => extract_pdf(filename, bytes)?,
        "txt" | "md" => String::from_utf8(bytes.to_vec()).map_err(|_| {
            AppError::DocumentExtraction(format!("'{filename}' is not valid UTF-8 text"))
        })?,
        other => {
            return Err(AppError::DocumentExtraction(format!(
                "Unsupported file type '{other}' for '{filename}' (expected pdf, txt, or md)"
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::DocumentExtraction(format!(
            "No text could be extracted from '{filename}'"
        )));
    }
    Ok(text)
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    // pdf-extract panics on some malformed files instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(AppError::DocumentExtraction(format!(
            "Failed to read PDF '{filename}': {e}"
        ))),
        Err(_) => Err(AppError::DocumentExtraction(format!(
            "Failed to read PDF '{filename}': parser aborted"
        ))),
    }
}

//! Text extraction capability
//!
//! The parser never decodes uploads itself. It is handed extractors for
//! plain text and for PDF, so the keyword heuristics can be exercised with
//! any source of text.

use crate::errors::{CareError, Result};

/// Raw bytes in, text out
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// UTF-8 decoding that drops invalid sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(bytes);
        Ok(text.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect())
    }
}

/// Placeholder used when no PDF backend has been injected
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPdfBackend;

impl TextExtractor for NoPdfBackend {
    fn extract(&self, _bytes: &[u8]) -> Result<String> {
        Err(CareError::MalformedInput(
            "PDF text extraction is not available in this build".to_string(),
        ))
    }
}

/// Adapter for closures, handy for tests and for wiring external libraries
pub struct FnExtractor<F>(pub F)
where
    F: Fn(&[u8]) -> Result<String>;

impl<F> TextExtractor for FnExtractor<F>
where
    F: Fn(&[u8]) -> Result<String>,
{
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        (self.0)(bytes)
    }
}

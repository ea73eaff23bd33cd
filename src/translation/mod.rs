//! Translation capability boundary.

use crate::error::ErrorKind;
use async_trait::async_trait;

/// Translation provider capability.
///
/// Providers are non-deterministic: two calls with the same input need
/// not return identical text, so callers must not assume caching.
/// Implementations short-circuit blank input to an empty string without
/// contacting the provider.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` between two short language codes.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ErrorKind>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Returns the source text unchanged. Stands in when no provider is
/// configured; correct whenever both sides share a language.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, ErrorKind> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

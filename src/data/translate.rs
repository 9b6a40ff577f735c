//! Translation of horoscope text into the users' language
//!
//! [`Translator`] wraps a [`TranslationBackend`] and never fails: when the
//! backend errors, times out or returns nothing, the original text is
//! returned with [`FALLBACK_NOTICE`] appended so users still get a reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Default endpoint of the public Google Translate API
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Default bound on a single translation
pub const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Language horoscopes arrive in from upstream
pub const SOURCE_LANGUAGE: &str = "en";

/// Appended to untranslated text when translation fails
pub const FALLBACK_NOTICE: &str = "(Перевод недоступен)";

/// Errors that can occur inside a translation backend
#[derive(Debug, Error)]
pub enum TranslateError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// JSON was valid but not shaped like a translation result
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Backend returned no text
    #[error("Translation is empty")]
    EmptyTranslation,

    /// Backend did not answer in time
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),
}

/// A text-to-text translation service
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translates `text` from `source` into `target` (ISO 639-1 codes)
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}

/// Client for the public Google Translate endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    /// Creates a translator client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a translator around an already configured HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::UnexpectedStatus(status));
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        parse_translation(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response
///
/// The response is a nested array whose first element lists one
/// `[translated, original, ...]` entry per sentence.
fn parse_translation(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::UnexpectedFormat("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslateError::EmptyTranslation);
    }
    Ok(translated)
}

/// Translates English horoscopes into the target language, degrading instead of failing
#[derive(Debug, Clone)]
pub struct Translator<B> {
    backend: B,
    target_language: String,
    timeout: Duration,
}

impl<B: TranslationBackend> Translator<B> {
    /// Creates a translator into `target_language` with the default timeout
    pub fn new(backend: B, target_language: impl Into<String>) -> Self {
        Self {
            backend,
            target_language: target_language.into(),
            timeout: DEFAULT_TRANSLATE_TIMEOUT,
        }
    }

    /// Sets how long a single translation may take before degrading
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target language code
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translates `text` into the target language
    ///
    /// Always returns a usable string. If the backend fails, times out, or
    /// returns an empty translation, the original text is returned with the
    /// fallback notice appended.
    pub async fn translate_to_target(&self, text: &str) -> String {
        match self.try_translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, target = %self.target_language, "Translation failed, using original text");
                with_fallback_notice(text)
            }
        }
    }

    async fn try_translate(&self, text: &str) -> Result<String, TranslateError> {
        let translated = tokio::time::timeout(
            self.timeout,
            self.backend
                .translate(text, SOURCE_LANGUAGE, &self.target_language),
        )
        .await
        .map_err(|_| TranslateError::Timeout(self.timeout))??;

        if translated.trim().is_empty() {
            return Err(TranslateError::EmptyTranslation);
        }
        Ok(translated)
    }
}

/// Original text followed by the fallback notice
pub fn with_fallback_notice(text: &str) -> String {
    format!("{}\n\n{}", text, FALLBACK_NOTICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedBackend(&'static str);

    #[async_trait]
    impl TranslationBackend for FixedBackend {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl TranslationBackend for FailingBackend {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            Err(TranslateError::UnexpectedStatus(StatusCode::TOO_MANY_REQUESTS))
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl TranslationBackend for SlowBackend {
        async fn translate(&self, text: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(text.to_uppercase())
        }
    }

    /// Records the language pair it was asked for
    struct LanguageEcho;

    #[async_trait]
    impl TranslationBackend for LanguageEcho {
        async fn translate(&self, _: &str, source: &str, target: &str) -> Result<String, TranslateError> {
            Ok(format!("{}->{}", source, target))
        }
    }

    #[tokio::test]
    async fn test_successful_translation_is_returned_verbatim() {
        let translator = Translator::new(FixedBackend("Сегодня отличный день."), "ru");
        let result = translator.translate_to_target("Today is great.").await;
        assert_eq!(result, "Сегодня отличный день.");
    }

    #[tokio::test]
    async fn test_backend_receives_language_pair() {
        let translator = Translator::new(LanguageEcho, "de");
        assert_eq!(translator.translate_to_target("Hi").await, "en->de");
        assert_eq!(translator.target_language(), "de");
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_to_original_with_notice() {
        let translator = Translator::new(FailingBackend, "ru");
        let result = translator.translate_to_target("Today is great.").await;

        assert!(result.starts_with("Today is great."));
        assert!(result.contains(FALLBACK_NOTICE));
        assert_eq!(result, "Today is great.\n\n(Перевод недоступен)");
    }

    #[tokio::test]
    async fn test_empty_translation_falls_back() {
        let translator = Translator::new(FixedBackend("  "), "ru");
        let result = translator.translate_to_target("Stay calm.").await;
        assert_eq!(result, with_fallback_notice("Stay calm."));
    }

    #[tokio::test]
    async fn test_fallback_is_never_empty() {
        let translator = Translator::new(FailingBackend, "ru");
        for text in ["a", "Long text. With two sentences.", "", "✨"] {
            let result = translator.translate_to_target(text).await;
            assert!(!result.is_empty());
            assert!(result.contains(FALLBACK_NOTICE));
        }
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_and_falls_back() {
        let translator =
            Translator::new(SlowBackend, "ru").with_timeout(Duration::from_millis(20));
        let result = translator.translate_to_target("Patience.").await;
        assert_eq!(result, with_fallback_notice("Patience."));
    }

    #[test]
    fn test_parse_translation_joins_segments() {
        let body = json!([
            [
                ["Сегодня отличный день. ", "Today is great. ", null, null, 10],
                ["Улыбайтесь.", "Smile.", null, null, 10]
            ],
            null,
            "en"
        ]);
        let translated = parse_translation(&body).unwrap();
        assert_eq!(translated, "Сегодня отличный день. Улыбайтесь.");
    }

    #[test]
    fn test_parse_translation_skips_non_text_segments() {
        let body = json!([[["Привет", "Hello"], [null, null, "Privet"]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "Привет");
    }

    #[test]
    fn test_parse_translation_unexpected_format() {
        let body = json!({"error": "quota"});
        assert!(matches!(
            parse_translation(&body),
            Err(TranslateError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn test_parse_translation_empty() {
        let body = json!([[], null, "en"]);
        assert!(matches!(
            parse_translation(&body),
            Err(TranslateError::EmptyTranslation)
        ));
    }
}

//! Cache-backed fetch-and-translate pipeline
//!
//! [`HoroscopePipeline`] answers "what is today's horoscope for this sign" by
//! checking the cache first, and on a miss fetching the English text
//! upstream, translating it and caching the translation.
//!
//! Concurrent misses for the same sign and date are not coalesced: each
//! request fetches and translates on its own and the last write wins.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::HoroscopeCache;
use crate::data::{Day, HoroscopeSource, ParseSignError, TranslationBackend, Translator, ZodiacSign};

/// Failures visible to whoever asked for a horoscope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoroscopeError {
    /// The requested sign is not in the catalog
    #[error("Unknown zodiac sign: '{0}'")]
    InvalidSign(String),

    /// The upstream horoscope could not be fetched
    #[error("Horoscope for {sign} is currently unavailable")]
    UpstreamUnavailable { sign: ZodiacSign },
}

impl From<ParseSignError> for HoroscopeError {
    fn from(err: ParseSignError) -> Self {
        HoroscopeError::InvalidSign(err.0)
    }
}

/// Composes the cache, the upstream source and the translator
pub struct HoroscopePipeline<S, B> {
    cache: Arc<HoroscopeCache>,
    source: S,
    translator: Translator<B>,
}

impl<S, B> HoroscopePipeline<S, B>
where
    S: HoroscopeSource,
    B: TranslationBackend,
{
    pub fn new(cache: Arc<HoroscopeCache>, source: S, translator: Translator<B>) -> Self {
        Self {
            cache,
            source,
            translator,
        }
    }

    /// The cache this pipeline reads from and writes to
    pub fn cache(&self) -> &Arc<HoroscopeCache> {
        &self.cache
    }

    /// Returns the translated horoscope for `sign`, or `None` if upstream failed
    ///
    /// The cache date is the server's local date shifted by `day`.
    pub async fn get_horoscope(&self, sign: ZodiacSign, day: Day) -> Option<String> {
        let date = day.resolve(Local::now().date_naive());
        self.get_horoscope_on(sign, day, date).await
    }

    /// Same as [`get_horoscope`](Self::get_horoscope) with an explicit cache date
    ///
    /// # Behavior
    /// - A fresh cache entry for `(sign, date)` is returned without any upstream call
    /// - On a miss the horoscope is fetched once; a failed fetch returns `None`
    ///   and caches nothing, so the next call retries
    /// - A fetched horoscope is translated (which cannot fail), cached, and returned
    pub async fn get_horoscope_on(
        &self,
        sign: ZodiacSign,
        day: Day,
        date: NaiveDate,
    ) -> Option<String> {
        if let Some(cached) = self.cache.get(sign, date) {
            info!(%sign, %date, "Cache hit");
            return Some(cached);
        }
        debug!(%sign, %date, "Cache miss");

        let text = match self.source.fetch(sign, day).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%sign, %day, error = %e, "Failed to fetch horoscope");
                return None;
            }
        };

        let translated = self.translator.translate_to_target(&text).await;
        self.cache.set(sign, translated.clone(), date);
        info!(%sign, %date, "Cached translated horoscope");

        Some(translated)
    }

    /// Validates a user-supplied sign id and returns its horoscope
    ///
    /// # Returns
    /// * `Ok(String)` - The translated horoscope
    /// * `Err(HoroscopeError::InvalidSign)` - `sign_id` is not a catalog id; nothing was fetched
    /// * `Err(HoroscopeError::UpstreamUnavailable)` - The upstream fetch failed
    pub async fn get_horoscope_by_id(&self, sign_id: &str, day: Day) -> Result<String, HoroscopeError> {
        let sign: ZodiacSign = sign_id.parse()?;
        self.get_horoscope(sign, day)
            .await
            .ok_or(HoroscopeError::UpstreamUnavailable { sign })
    }

    /// Warms the cache for all twelve signs concurrently
    ///
    /// Returns how many signs now have a horoscope available.
    pub async fn prefetch_all(&self, day: Day) -> usize {
        let results = join_all(ZodiacSign::ALL.map(|sign| self.get_horoscope(sign, day))).await;
        let available = results.iter().filter(|result| result.is_some()).count();
        info!(%day, available, total = results.len(), "Prefetched horoscopes");
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::translate::{with_fallback_notice, FALLBACK_NOTICE};
    use crate::data::{FetchError, TranslateError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Horoscope source that replays scripted results and counts calls
    struct ScriptedSource {
        responses: Mutex<Vec<Option<&'static str>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        /// `None` entries produce a timeout; the last entry repeats
        fn new(responses: Vec<Option<&'static str>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HoroscopeSource for ScriptedSource {
        async fn fetch(&self, _sign: ZodiacSign, _day: Day) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Suspend like a real request so concurrent callers interleave
            tokio::task::yield_now().await;
            let next = {
                let mut responses = self.responses.lock().unwrap();
                if responses.len() > 1 {
                    responses.remove(0)
                } else {
                    responses[0]
                }
            };
            next.map(str::to_string).ok_or(FetchError::Timeout)
        }
    }

    /// Translator backend with a fixed dictionary
    struct Dictionary;

    #[async_trait]
    impl TranslationBackend for Dictionary {
        async fn translate(&self, text: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            match text {
                "Today is great." => Ok("Сегодня отличный день.".to_string()),
                other => Ok(format!("[ru] {}", other)),
            }
        }
    }

    struct BrokenTranslator;

    #[async_trait]
    impl TranslationBackend for BrokenTranslator {
        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslateError> {
            Err(TranslateError::EmptyTranslation)
        }
    }

    fn pipeline<B: TranslationBackend>(
        source: &Arc<ScriptedSource>,
        backend: B,
    ) -> HoroscopePipeline<Arc<ScriptedSource>, B> {
        HoroscopePipeline::new(
            Arc::new(HoroscopeCache::default()),
            Arc::clone(source),
            Translator::new(backend, "ru"),
        )
    }

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_miss_fetches_translates_and_stores() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Today is great.")]));
        let pipeline = pipeline(&source, Dictionary);

        let result = pipeline
            .get_horoscope_on(ZodiacSign::Leo, Day::Today, jan_15())
            .await;

        assert_eq!(result.as_deref(), Some("Сегодня отличный день."));
        assert_eq!(source.calls(), 1);
        assert_eq!(
            pipeline.cache().get(ZodiacSign::Leo, jan_15()).as_deref(),
            Some("Сегодня отличный день.")
        );
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Today is great.")]));
        let pipeline = pipeline(&source, Dictionary);

        let first = pipeline
            .get_horoscope_on(ZodiacSign::Leo, Day::Today, jan_15())
            .await;
        let second = pipeline
            .get_horoscope_on(ZodiacSign::Leo, Day::Today, jan_15())
            .await;

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1, "Second call must not hit upstream");
    }

    #[tokio::test]
    async fn test_prepopulated_cache_skips_upstream() {
        let source = Arc::new(ScriptedSource::new(vec![Some("unused")]));
        let pipeline = pipeline(&source, Dictionary);
        pipeline.cache().set(ZodiacSign::Aries, "кэш", jan_15());

        let result = pipeline
            .get_horoscope_on(ZodiacSign::Aries, Day::Today, jan_15())
            .await;

        assert_eq!(result.as_deref(), Some("кэш"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_none_and_caches_nothing() {
        let source = Arc::new(ScriptedSource::new(vec![None]));
        let pipeline = pipeline(&source, Dictionary);

        let result = pipeline
            .get_horoscope_on(ZodiacSign::Pisces, Day::Today, jan_15())
            .await;

        assert!(result.is_none());
        assert!(pipeline.cache().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_retried_on_next_call() {
        let source = Arc::new(ScriptedSource::new(vec![None, Some("Second try.")]));
        let pipeline = pipeline(&source, Dictionary);

        assert!(pipeline
            .get_horoscope_on(ZodiacSign::Virgo, Day::Today, jan_15())
            .await
            .is_none());
        let retried = pipeline
            .get_horoscope_on(ZodiacSign::Virgo, Day::Today, jan_15())
            .await;

        assert_eq!(retried.as_deref(), Some("[ru] Second try."));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_translation_failure_still_caches_degraded_text() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Be bold.")]));
        let pipeline = pipeline(&source, BrokenTranslator);

        let result = pipeline
            .get_horoscope_on(ZodiacSign::Taurus, Day::Today, jan_15())
            .await
            .expect("translation failures never fail the pipeline");

        assert_eq!(result, with_fallback_notice("Be bold."));
        assert!(result.contains(FALLBACK_NOTICE));
        assert_eq!(
            pipeline.cache().get(ZodiacSign::Taurus, jan_15()),
            Some(result)
        );
    }

    #[tokio::test]
    async fn test_get_horoscope_by_id_rejects_unknown_sign_without_fetch() {
        let source = Arc::new(ScriptedSource::new(vec![Some("unused")]));
        let pipeline = pipeline(&source, Dictionary);

        let result = pipeline.get_horoscope_by_id("unknown", Day::Today).await;

        assert_eq!(result, Err(HoroscopeError::InvalidSign("unknown".to_string())));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_horoscope_by_id_accepts_any_case() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Today is great.")]));
        let pipeline = pipeline(&source, Dictionary);

        let result = pipeline.get_horoscope_by_id("LEO", Day::Today).await;

        assert_eq!(result.as_deref(), Ok("Сегодня отличный день."));
    }

    #[tokio::test]
    async fn test_get_horoscope_by_id_reports_upstream_failure() {
        let source = Arc::new(ScriptedSource::new(vec![None]));
        let pipeline = pipeline(&source, Dictionary);

        let result = pipeline.get_horoscope_by_id("pisces", Day::Today).await;

        assert_eq!(
            result,
            Err(HoroscopeError::UpstreamUnavailable {
                sign: ZodiacSign::Pisces
            })
        );
    }

    #[tokio::test]
    async fn test_get_horoscope_uses_local_date_for_today() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Today is great.")]));
        let pipeline = pipeline(&source, Dictionary);

        pipeline.get_horoscope(ZodiacSign::Leo, Day::Today).await;

        let today = Local::now().date_naive();
        assert!(pipeline.cache().get(ZodiacSign::Leo, today).is_some());
    }

    #[tokio::test]
    async fn test_days_are_cached_under_their_own_dates() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Yesterday."), Some("Tomorrow.")]));
        let pipeline = pipeline(&source, Dictionary);

        let yesterday = pipeline.get_horoscope(ZodiacSign::Libra, Day::Yesterday).await;
        let tomorrow = pipeline.get_horoscope(ZodiacSign::Libra, Day::Tomorrow).await;

        assert_eq!(yesterday.as_deref(), Some("[ru] Yesterday."));
        assert_eq!(tomorrow.as_deref(), Some("[ru] Tomorrow."));
        assert_eq!(pipeline.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_fetch() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Today is great.")]));
        let pipeline = pipeline(&source, Dictionary);

        let (a, b) = tokio::join!(
            pipeline.get_horoscope_on(ZodiacSign::Leo, Day::Today, jan_15()),
            pipeline.get_horoscope_on(ZodiacSign::Leo, Day::Today, jan_15()),
        );

        assert_eq!(a, b);
        assert_eq!(source.calls(), 2, "Identical concurrent misses are not coalesced");
        assert_eq!(pipeline.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_all_counts_successes() {
        let source = Arc::new(ScriptedSource::new(vec![Some("Fine.")]));
        let pipeline = pipeline(&source, Dictionary);

        assert_eq!(pipeline.prefetch_all(Day::Today).await, 12);
        assert_eq!(source.calls(), 12);
        assert_eq!(pipeline.cache().len(), 12);

        // Everything is cached now
        assert_eq!(pipeline.prefetch_all(Day::Today).await, 12);
        assert_eq!(source.calls(), 12);
    }

    #[tokio::test]
    async fn test_prefetch_all_with_failing_upstream() {
        let source = Arc::new(ScriptedSource::new(vec![None]));
        let pipeline = pipeline(&source, Dictionary);

        assert_eq!(pipeline.prefetch_all(Day::Today).await, 0);
        assert!(pipeline.cache().is_empty());
    }
}

//! Daily horoscope API client
//!
//! This module fetches the English daily horoscope for a sign from the
//! upstream horoscope endpoint and unwraps it from the JSON envelope the
//! endpoint answers with. It performs exactly one request per call and never
//! caches; caching belongs to the pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{Day, ZodiacSign};

/// Default base URL for the daily horoscope endpoint
pub const DEFAULT_HOROSCOPE_API_URL: &str =
    "https://horoscope-app-api.vercel.app/api/v1/get-horoscope/daily";

/// Default bound on a single upstream request
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching a horoscope
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Upstream answered with a non-2xx status
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// JSON was valid but not the expected envelope
    #[error("Unexpected response envelope: {0}")]
    InvalidEnvelope(String),
}

impl FetchError {
    fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::RequestFailed(err)
        }
    }
}

/// Source of untranslated daily horoscopes
///
/// Implemented by [`HoroscopeClient`]; the pipeline is generic over it so
/// tests can substitute a scripted source.
#[async_trait]
pub trait HoroscopeSource: Send + Sync {
    /// Fetches the horoscope text for `sign` on `day`
    async fn fetch(&self, sign: ZodiacSign, day: Day) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: HoroscopeSource + ?Sized> HoroscopeSource for Arc<T> {
    async fn fetch(&self, sign: ZodiacSign, day: Day) -> Result<String, FetchError> {
        (**self).fetch(sign, day).await
    }
}

/// Client for the upstream daily horoscope endpoint
#[derive(Debug, Clone)]
pub struct HoroscopeClient {
    client: Client,
    base_url: String,
}

impl HoroscopeClient {
    /// Creates a client for `base_url` whose requests give up after `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client around an already configured HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HoroscopeSource for HoroscopeClient {
    /// Fetch the horoscope for a sign
    ///
    /// # Arguments
    /// * `sign` - The zodiac sign, sent as its lowercase id
    /// * `day` - Which day's horoscope to request
    ///
    /// # Returns
    /// * `Ok(String)` - The English horoscope text
    /// * `Err(FetchError)` - On transport errors, timeouts, non-2xx statuses
    ///   or any response that is not a successful envelope
    async fn fetch(&self, sign: ZodiacSign, day: Day) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("sign", sign.id()), ("day", day.as_str())])
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status));
        }

        let text = response.text().await.map_err(FetchError::from_request)?;
        let envelope: HoroscopeEnvelope = serde_json::from_str(&text)?;

        let data = parse_envelope(envelope)?;
        debug!(%sign, %day, date = ?data.date, "Fetched horoscope");
        Ok(data.text)
    }
}

/// Unwrapped payload of a successful envelope
#[derive(Debug, PartialEq)]
struct HoroscopePayload {
    text: String,
    date: Option<String>,
}

/// Extracts the horoscope text from a decoded envelope
fn parse_envelope(envelope: HoroscopeEnvelope) -> Result<HoroscopePayload, FetchError> {
    if !envelope.success {
        return Err(FetchError::InvalidEnvelope(
            "success flag is not set".to_string(),
        ));
    }

    let data = envelope
        .data
        .ok_or_else(|| FetchError::InvalidEnvelope("missing data".to_string()))?;

    match data.horoscope_data {
        Some(text) if !text.trim().is_empty() => Ok(HoroscopePayload {
            text,
            date: data.date,
        }),
        Some(_) => Err(FetchError::InvalidEnvelope(
            "empty horoscope_data".to_string(),
        )),
        None => Err(FetchError::InvalidEnvelope(
            "missing horoscope_data".to_string(),
        )),
    }
}

/// Response envelope of the horoscope endpoint
#[derive(Debug, Deserialize)]
struct HoroscopeEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<EnvelopeData>,
}

/// The `data` object inside the envelope
#[derive(Debug, Deserialize)]
struct EnvelopeData {
    horoscope_data: Option<String>,
    date: Option<String>,
}

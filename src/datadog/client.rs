use std::io::Write;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use super::types::{IntakeResponse, MetricPayload, MetricSeries};
use crate::args::DEFAULT_USER_AGENT;
use crate::config::{DestinationSettings, join_endpoint};
use crate::error::{AppError, AppResult, ConfigError, SubmitError};
use crate::ports::SeriesSink;

pub const SERIES_PATH: &str = "api/v2/series";

const API_KEY_HEADER: &str = "dd-api-key";
/// Longest error body kept in `SubmitError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct DatadogClient {
    client: Client,
    series_url: Url,
}

impl DatadogClient {
    /// Builds a client that authenticates every request with the API key.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is not a valid header value or the
    /// client cannot be built.
    pub fn new(settings: &DestinationSettings) -> AppResult<Self> {
        let mut api_key = HeaderValue::from_str(&settings.api_key)
            .map_err(|_invalid| AppError::config(ConfigError::InvalidApiKey))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::config(ConfigError::BuildClientFailed { source: err }))?;

        Ok(Self {
            client,
            series_url: join_endpoint(&settings.base_url, SERIES_PATH)?,
        })
    }

    /// Posts one gzip-compressed payload.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` when encoding fails, the request fails, or the
    /// intake answers with a non-success status.
    pub async fn submit_series(&self, series: &[MetricSeries]) -> AppResult<IntakeResponse> {
        let body = encode_payload(series)?;
        let endpoint = self.series_url.as_str();

        let response = self
            .client
            .post(self.series_url.clone())
            .body(body)
            .send()
            .await
            .map_err(|err| {
                AppError::submit(SubmitError::Request {
                    endpoint: endpoint.to_owned(),
                    source: err,
                })
            })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| {
            AppError::submit(SubmitError::Request {
                endpoint: endpoint.to_owned(),
                source: err,
            })
        })?;

        if !status.is_success() {
            return Err(AppError::submit(SubmitError::Status {
                endpoint: endpoint.to_owned(),
                status,
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }));
        }
        if text.trim().is_empty() {
            return Ok(IntakeResponse::default());
        }
        serde_json::from_str(&text).map_err(|err| {
            AppError::submit(SubmitError::Decode {
                endpoint: endpoint.to_owned(),
                source: err,
            })
        })
    }
}

#[async_trait]
impl SeriesSink for DatadogClient {
    async fn submit(&self, series: &[MetricSeries]) -> AppResult<IntakeResponse> {
        self.submit_series(series).await
    }
}

/// JSON-encodes and gzips `{"series": [...]}`.
pub(super) fn encode_payload(series: &[MetricSeries]) -> AppResult<Vec<u8>> {
    let json = serde_json::to_vec(&MetricPayload { series })
        .map_err(|err| AppError::submit(SubmitError::Encode { source: err }))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|err| AppError::submit(SubmitError::Compress { source: err }))?;
    encoder
        .finish()
        .map_err(|err| AppError::submit(SubmitError::Compress { source: err }))
}

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::tls::build_source_client;
use super::types::{ApiResponse, MatrixData, RawSeries};
use crate::args::PositiveU64;
use crate::config::{SourceSettings, join_endpoint};
use crate::error::{AppError, AppResult, FetchError, ProtocolError};
use crate::ports::MetricSource;
use crate::window::TimeWindow;

pub const QUERY_RANGE_PATH: &str = "api/v1/query_range";
pub const LABELS_PATH: &str = "api/v1/label/__name__/values";

const MATRIX_RESULT: &str = "matrix";

#[derive(Debug, Clone)]
pub struct PrometheusClient {
    client: Client,
    query_range_url: Url,
    labels_url: Url,
}

impl PrometheusClient {
    /// Builds the client and resolves the endpoint URLs under the base.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity or CA files cannot be loaded or the
    /// base URL cannot carry a path.
    pub fn new(settings: &SourceSettings) -> AppResult<Self> {
        let client = build_source_client(settings)?;
        Ok(Self {
            client,
            query_range_url: join_endpoint(&settings.base_url, QUERY_RANGE_PATH)?,
            labels_url: join_endpoint(&settings.base_url, LABELS_PATH)?,
        })
    }

    /// Runs a range query and returns the matrix result.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failures and `ProtocolError` when the
    /// response is not a successful matrix.
    pub async fn query_range(
        &self,
        query: &str,
        window: TimeWindow,
        step: PositiveU64,
    ) -> AppResult<Vec<RawSeries>> {
        let params = [
            ("query", query.to_owned()),
            ("start", window.start.to_string()),
            ("end", window.end.to_string()),
            ("step", step.get().to_string()),
            ("format", "json".to_owned()),
        ];
        tracing::debug!("query_range {} over {}", query, window);
        let response: ApiResponse<MatrixData> = self.get_json(&self.query_range_url, &params).await?;
        let data = response.into_data()?;
        if data.result_type != MATRIX_RESULT {
            return Err(AppError::protocol(ProtocolError::UnexpectedResultType {
                result_type: data.result_type,
            }));
        }
        Ok(data.result)
    }

    /// Lists every value of the `__name__` label.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failures and `ProtocolError` when the
    /// response cannot be decoded.
    pub async fn list_metric_names(&self) -> AppResult<Vec<String>> {
        let response: ApiResponse<Vec<String>> = self.get_json(&self.labels_url, &[]).await?;
        Ok(response.into_data()?)
    }

    async fn get_json<T>(&self, url: &Url, params: &[(&str, String)]) -> AppResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let endpoint = url.as_str();
        let response = self
            .client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|err| {
                AppError::fetch(FetchError::Request {
                    endpoint: endpoint.to_owned(),
                    source: err,
                })
            })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            AppError::fetch(FetchError::ReadBody {
                endpoint: endpoint.to_owned(),
                source: err,
            })
        })?;

        if !status.is_success() {
            // Bad queries come back as 4xx with an error envelope.
            if status.is_client_error()
                && let Ok(envelope) = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                && let Err(err) = envelope.into_data()
            {
                return Err(AppError::protocol(err));
            }
            return Err(AppError::fetch(FetchError::Status {
                endpoint: endpoint.to_owned(),
                status,
            }));
        }

        serde_json::from_slice(&body).map_err(|err| {
            AppError::protocol(ProtocolError::Decode {
                endpoint: endpoint.to_owned(),
                source: err,
            })
        })
    }
}

#[async_trait]
impl MetricSource for PrometheusClient {
    async fn list_metric_names(&self) -> AppResult<Vec<String>> {
        PrometheusClient::list_metric_names(self).await
    }

    async fn query_range(
        &self,
        query: &str,
        window: TimeWindow,
        step: PositiveU64,
    ) -> AppResult<Vec<RawSeries>> {
        PrometheusClient::query_range(self, query, window, step).await
    }
}

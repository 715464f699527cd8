use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ProtocolError;

/// Envelope shared by every query API response.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub(super) status: String,
    pub(super) data: Option<T>,
    #[serde(rename = "errorType")]
    pub(super) error_type: Option<String>,
    pub(super) error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwraps `data` from a `success` response.
    pub(super) fn into_data(self) -> Result<T, ProtocolError> {
        match self.status.as_str() {
            "success" => self.data.ok_or(ProtocolError::MissingData),
            "error" => Err(ProtocolError::QueryFailed {
                error_type: self.error_type.unwrap_or_default(),
                message: self.error.unwrap_or_default(),
            }),
            _ => Err(ProtocolError::UnexpectedStatus {
                status: self.status,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MatrixData {
    #[serde(rename = "resultType")]
    pub(super) result_type: String,
    #[serde(default)]
    pub(super) result: Vec<RawSeries>,
}

/// One result of a range query: a unique label set and its samples.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawSeries {
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<RawSample>,
}

/// `[timestamp, "value"]` as returned by the query API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawSample(pub f64, pub String);

impl RawSample {
    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        self.0
    }

    /// Parses the value string. `NaN` and `±Inf` parse successfully.
    ///
    /// # Errors
    ///
    /// Returns an error when the string is not a number.
    pub fn value(&self) -> Result<f64, ProtocolError> {
        self.1
            .parse::<f64>()
            .map_err(|_parse| ProtocolError::InvalidSampleValue {
                value: self.1.clone(),
                timestamp: self.0,
            })
    }
}

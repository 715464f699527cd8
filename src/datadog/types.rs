use serde::{Deserialize, Serialize, Serializer};

/// Intake metric type, sent as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeType {
    Rate,
    Gauge,
}

impl IntakeType {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            IntakeType::Rate => 2,
            IntakeType::Gauge => 3,
        }
    }
}

impl Serialize for IntakeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricPoint {
    pub timestamp: i64,
    pub value: f64,
}

/// One destination series. Points are finite and in source order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricSeries {
    pub metric: String,
    #[serde(rename = "type")]
    pub kind: IntakeType,
    /// Seconds covered by each rate point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    pub points: Vec<MetricPoint>,
    pub tags: Vec<String>,
}

/// Request body of `POST /api/v2/series`.
#[derive(Debug, Serialize)]
pub struct MetricPayload<'series> {
    pub series: &'series [MetricSeries],
}

/// Response body of the intake; `errors` lists rejected input.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct IntakeResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl IntakeResponse {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

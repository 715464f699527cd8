use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Duration '{value}' must be a whole number of seconds.")]
    DurationNotWholeSeconds { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid quantile '{value}': {source}")]
    InvalidQuantileNumber {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Quantile {value} must be within (0, 1].")]
    QuantileOutOfRange { value: f64 },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' cannot be used as an API base.")]
    UrlCannotBeBase { url: String },
    #[error("Invalid Datadog site '{site}'.")]
    InvalidSite { site: String },
    #[error("--metrics-client-cert requires --metrics-client-key.")]
    CertRequiresKey,
    #[error("--metrics-client-key requires --metrics-client-cert.")]
    KeyRequiresCert,
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

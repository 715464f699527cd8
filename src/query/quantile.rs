use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

/// Quantiles pre-computed for every histogram when none are configured.
pub const DEFAULT_QUANTILES: [f64; 5] = [0.5, 0.75, 0.9, 0.95, 0.99];

/// A quantile in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quantile(f64);

impl Quantile {
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Percentile rendered as an integer, e.g. `95` for `0.95`.
    ///
    /// Rounds to nearest. Integer truncation of `q * 100` names some
    /// quantiles one lower (`0.29` becomes `28`), so series named by
    /// truncating publishers will not line up for such quantiles.
    #[must_use]
    pub fn percentile(self) -> u32 {
        let scaled = (self.0 * 100.0).round();
        // in range by construction: 0 < scaled <= 100
        scaled as u32
    }

    /// Series name suffix, e.g. `_P95`.
    #[must_use]
    pub fn name_suffix(self) -> String {
        format!("_P{}", self.percentile())
    }
}

impl TryFrom<f64> for Quantile {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Quantile(value))
        } else {
            Err(ValidationError::QuantileOutOfRange { value })
        }
    }
}

impl FromStr for Quantile {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidQuantileNumber {
                value: s.to_owned(),
                source: err,
            })?;
        Quantile::try_from(value)
    }
}

impl fmt::Display for Quantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Quantile::try_from(value).map_err(serde::de::Error::custom)
    }
}

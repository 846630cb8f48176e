use crate::errors::{MazeError, MazeResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Spatial frequency of the terrain noise field. Must be finite and positive;
/// smaller values stretch terrain regions across more cells.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NoiseScale(f64);

impl NoiseScale {
    pub const DEFAULT: f64 = 0.08;

    pub fn new(value: f64) -> MazeResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(MazeError::invalid_config(format!(
                "noise scale must be a positive number, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for NoiseScale {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for NoiseScale {
    type Error = MazeError;

    fn try_from(value: f64) -> MazeResult<Self> {
        Self::new(value)
    }
}

impl From<NoiseScale> for f64 {
    fn from(scale: NoiseScale) -> Self {
        scale.0
    }
}

/// Upper bound on node expansions for a single search run, at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct ExpansionLimit(usize);

impl ExpansionLimit {
    const MIN: usize = 1;
    pub const DEFAULT: usize = 100_000;

    pub fn new(value: usize) -> Self {
        Self(value.max(Self::MIN))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ExpansionLimit {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl From<usize> for ExpansionLimit {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl From<ExpansionLimit> for usize {
    fn from(limit: ExpansionLimit) -> Self {
        limit.0
    }
}

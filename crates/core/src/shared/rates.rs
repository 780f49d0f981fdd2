use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{MAX_RATE, MIN_RATE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RateError {
    #[error("{kind} must be between {min} and {max}, got {value}")]
    OutOfRange {
        kind: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

fn check(kind: &'static str, value: u32) -> Result<u32, RateError> {
    if (MIN_RATE..=MAX_RATE).contains(&value) {
        Ok(value)
    } else {
        Err(RateError::OutOfRange {
            kind,
            value,
            min: MIN_RATE,
            max: MAX_RATE,
        })
    }
}

/// Sampling stride for Decompose: frame `i` is kept when `i % stride == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SkipRate(u32);

impl SkipRate {
    pub fn new(value: u32) -> Result<Self, RateError> {
        check("Skip rate", value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn keeps(self, index: usize) -> bool {
        index % self.0 as usize == 0
    }
}

impl TryFrom<u32> for SkipRate {
    type Error = RateError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkipRate> for u32 {
    fn from(rate: SkipRate) -> Self {
        rate.0
    }
}

impl fmt::Display for SkipRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} frame(s)", self.0)
    }
}

/// Output frames per second for Recompose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FrameRate(u32);

impl FrameRate {
    pub fn new(value: u32) -> Result<Self, RateError> {
        check("Frame rate", value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = RateError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> Self {
        rate.0
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.0)
    }
}

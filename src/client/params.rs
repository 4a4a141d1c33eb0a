//! Operation parameters and their allowed values.

use crate::client::error::ClientError;
use crate::client::operation::ParamSet;

/// An inclusive range walked in fixed steps, like a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl StepRange {
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max && (value - self.min) % self.step == 0
    }

    pub fn values(&self) -> impl Iterator<Item = u32> {
        (self.min..=self.max).step_by(self.step as usize)
    }

    fn check(&self, value: u32) -> Result<u32, ClientError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ClientError::InvalidParameter {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
                step: self.step,
            })
        }
    }
}

pub const COMPRESSION_LEVEL: StepRange = StepRange {
    name: "compressionLevel",
    min: 10,
    max: 90,
    step: 10,
    default: 50,
};

pub const WATERMARK_THRESHOLD: StepRange = StepRange {
    name: "threshold",
    min: 100,
    max: 250,
    step: 10,
    default: 200,
};

pub const WATERMARK_TOLERANCE: StepRange = StepRange {
    name: "tolerance",
    min: 10,
    max: 50,
    step: 5,
    default: 30,
};

/// Current parameter values of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    compression_level: u32,
    threshold: u32,
    tolerance: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            compression_level: COMPRESSION_LEVEL.default,
            threshold: WATERMARK_THRESHOLD.default,
            tolerance: WATERMARK_TOLERANCE.default,
        }
    }
}

impl Parameters {
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn set_compression_level(&mut self, value: u32) -> Result<(), ClientError> {
        self.compression_level = COMPRESSION_LEVEL.check(value)?;
        Ok(())
    }

    pub fn set_threshold(&mut self, value: u32) -> Result<(), ClientError> {
        self.threshold = WATERMARK_THRESHOLD.check(value)?;
        Ok(())
    }

    pub fn set_tolerance(&mut self, value: u32) -> Result<(), ClientError> {
        self.tolerance = WATERMARK_TOLERANCE.check(value)?;
        Ok(())
    }

    /// Form fields sent next to the file for `params`.
    pub fn fields(&self, params: ParamSet) -> Vec<(&'static str, String)> {
        match params {
            ParamSet::None => Vec::new(),
            ParamSet::CompressionLevel => {
                vec![(COMPRESSION_LEVEL.name, self.compression_level.to_string())]
            }
            ParamSet::Watermark(kind) => vec![
                (WATERMARK_THRESHOLD.name, self.threshold.to_string()),
                (WATERMARK_TOLERANCE.name, self.tolerance.to_string()),
                ("fileType", kind.as_str().to_string()),
            ],
        }
    }
}

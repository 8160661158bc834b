use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::pipeline::DeliveryMode;

/// Fallback values used when a listing request leaves parameters out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryDefaults {
    pub replicate_count: usize,
    pub batch_size: NonZeroUsize,
    pub delay: Duration,
}

/// Query parameters selecting how a listing is delivered.
///
/// `mode` is one of `immediate`, `replicated` or `paced`; `count` applies to
/// `replicated`, `batch` and `delay_ms` to `paced`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeliveryParams {
    pub mode: Option<String>,
    #[validate(range(max = 10_000))]
    pub count: Option<usize>,
    #[validate(range(min = 1, max = 1_000))]
    pub batch: Option<usize>,
    #[validate(range(max = 60_000))]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum DeliveryParamsError {
    #[error("Delivery parameters validation failed: {0}")]
    Validation(String),
    #[error("unknown delivery mode: {0}")]
    UnknownMode(String),
}

impl From<ValidationErrors> for DeliveryParamsError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl DeliveryParams {
    /// Resolves the requested mode; `fallback` is used when `mode` is absent.
    pub fn into_mode(
        self,
        fallback: DeliveryMode,
        defaults: &DeliveryDefaults,
    ) -> Result<DeliveryMode, DeliveryParamsError> {
        self.validate()?;

        let Some(mode) = self.mode else {
            return Ok(fallback);
        };

        match mode.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(DeliveryMode::Immediate),
            "replicated" => Ok(DeliveryMode::Replicated {
                count: self.count.unwrap_or(defaults.replicate_count),
            }),
            "paced" => Ok(DeliveryMode::Paced {
                batch_size: self
                    .batch
                    .and_then(NonZeroUsize::new)
                    .unwrap_or(defaults.batch_size),
                delay: self
                    .delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.delay),
            }),
            other => Err(DeliveryParamsError::UnknownMode(other.to_string())),
        }
    }
}

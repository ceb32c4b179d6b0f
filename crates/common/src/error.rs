/// Errors raised when host-supplied parameters are rejected at an entry point.
///
/// Only configuration problems are surfaced as errors. Malformed symbol
/// sequences and degenerate geometry are recovered where they occur.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("iteration count {value} exceeds the maximum of {max}")]
    IterationsOutOfRange { value: u32, max: u32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("batch capacity must be a positive integer")]
    ZeroBatchCapacity,
    #[error("{field} needs at least {min} segments, got {value}")]
    TooFewSegments {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("malformed rule {0:?}: expected `<symbol>=<replacement>`")]
    MalformedRule(String),
}

/// Reject infinities and NaN.
pub fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Reject values that are not strictly positive and finite.
pub fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Reject negative or non-finite values.
pub fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Reject a `±variance` half-width whose full span `2 × variance` cannot be
/// sampled.
pub fn ensure_variance(field: &'static str, variance: f32) -> Result<(), ConfigError> {
    ensure_non_negative(field, variance)?;
    ensure_finite(field, 2.0 * variance)
}

/// Reject values outside `[0, 1]`.
pub fn ensure_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

/// Reject `(min, max)` pairs where `min > max`, either end is non-finite, or
/// `max - min` overflows.
pub fn ensure_ordered(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    ensure_finite(field, min)?;
    ensure_finite(field, max)?;
    if min > max {
        return Err(ConfigError::InvalidRange { field, min, max });
    }
    ensure_finite(field, max - min)
}

//! Error types for the motion engine.

/// Construction-time configuration failures. Each one is fatal to the
/// instance being built and leaves every other instance untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    /// A keyframe list needs at least one point
    #[error("keyframes must not be empty")]
    EmptyKeyframes,

    /// Breakpoints went backwards
    #[error("keyframe breakpoints must be non-decreasing: {previous} followed by {next}")]
    NonMonotonicKeyframes { previous: f32, next: f32 },

    /// NaN or infinite breakpoint/value
    #[error("keyframe {index} has a non-finite breakpoint or value")]
    NonFiniteKeyframe { index: usize },

    /// Parallel breakpoint/value slices differ in length
    #[error("{breakpoints} breakpoints but {values} values")]
    KeyframeLengthMismatch { breakpoints: usize, values: usize },

    /// Padding radius must be a finite, non-negative pixel count
    #[error("padding must be finite and >= 0 px, got {padding}")]
    NegativePadding { padding: f32 },

    /// Word list was empty where at least one word is required
    #[error("word list must contain at least one word")]
    EmptyWordList,

    /// Spring parameters out of range
    #[error("invalid spring configuration: {reason}")]
    InvalidSpring { reason: String },

    /// Typewriter durations must be positive
    #[error("typewriter timing `{field}` must be greater than 0 ms")]
    InvalidTiming { field: &'static str },

    /// Cascade bound with the wrong number of card hosts
    #[error("card cascade animates {cards} cards but {hosts} hosts were supplied")]
    CascadeHosts { cards: usize, hosts: usize },

    /// Typewriter lookup failed
    #[error("unknown typewriter: {0}")]
    UnknownTypewriter(u32),

    /// Config could not be decoded
    #[error("config error: {0}")]
    Config(String),
}

/// Returned by a listener callback that failed. Dispatch logs it once per
/// subscriber and keeps delivering to everyone else.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("subscriber callback failed: {message}")]
pub struct SubscriberFault {
    pub message: String,
}

impl SubscriberFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validate a padding radius.
pub(crate) fn check_padding(padding: f32) -> Result<f32, MotionError> {
    if padding.is_finite() && padding >= 0.0 {
        Ok(padding)
    } else {
        Err(MotionError::NegativePadding { padding })
    }
}

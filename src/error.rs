use thiserror::Error;

/// Malformed configuration. The only error the pipeline reports upward.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),
    #[error("stable window must contain at least one sample")]
    EmptyStableWindow,
    #[error("stable spread tolerance must be non-negative, got {0}")]
    NegativeSpread(f64),
    #[error("physiological bounds are inverted: min {min} >= max {max}")]
    InvertedBounds { min: f64, max: f64 },
    #[error("minimum segment length must be positive")]
    NonPositiveSegmentLength,
    #[error("spike threshold must be positive, got {0}")]
    InvalidSpikeThreshold(f64),
}

/// Data-quality outcomes recovered per recording or per candidate segment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// The recording itself carries a malformed setting, e.g. its sample rate
    #[error("invalid recording: {0}")]
    Config(#[from] ConfigError),
    #[error("no stable region found")]
    NoStableRegion,
    #[error("segment {start}..{end} has no valid samples after sanitization")]
    AllInvalid { start: usize, end: usize },
    #[error("no span meets the minimum segment length")]
    NoValidSegments,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("no sample lies inside the physiological range")]
    NoValidSamples,
}

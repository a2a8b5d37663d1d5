pub mod config;
pub mod data_loading;
pub mod error;
pub mod gaps;
pub mod output;
pub mod pipeline;
pub mod preprocessing;
pub mod selection;
pub mod spikes;
pub mod stability;

pub use config::SegmentConfig;
pub use error::{ConfigError, SanitizeError, SegmentError};
pub use pipeline::{Segment, SegmentPipeline};
pub use selection::SelectionPolicy;

/// One heart-rate recording at a fixed sample rate. A sample of `0.0` means
/// the reading is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub id: String,
    pub samples: Vec<f64>,
    pub sample_rate: f64,
}

impl Recording {
    pub fn new(id: impl Into<String>, samples: Vec<f64>, sample_rate: f64) -> Self {
        Self {
            id: id.into(),
            samples,
            sample_rate,
        }
    }

    /// Seconds since the first sample, one entry per sample.
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| i as f64 / self.sample_rate)
            .collect()
    }

    /// Drop the last `n` samples (e.g. second-stage labour data).
    pub fn clip_tail(&mut self, n: usize) {
        let keep = self.samples.len().saturating_sub(n);
        self.samples.truncate(keep);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

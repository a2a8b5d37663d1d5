use crate::error::ConfigError;
use crate::selection::SelectionPolicy;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_SAMPLE_RATE: f64 = 4.0;
pub const DEFAULT_STABLE_WINDOW: usize = 5;
pub const DEFAULT_STABLE_MAX_SPREAD: f64 = 10.0;
pub const DEFAULT_MIN_BPM: f64 = 50.0;
pub const DEFAULT_MAX_BPM: f64 = 200.0;
/// 8 minutes at 4 Hz
pub const DEFAULT_MIN_SEGMENT_LEN: usize = 8 * 60 * 4;
/// 10 seconds at 4 Hz
pub const DEFAULT_MAX_GAP_LEN: usize = 10 * 4;
/// 3 seconds at 4 Hz
pub const DEFAULT_TRIM_MAX_RUN: usize = 12;
pub const DEFAULT_MAX_CHANGE: f64 = 25.0;
pub const DEFAULT_SPIKE_DILATION: usize = 2;

/// Tunables for the cleaning and segment-selection pipeline.
///
/// Lengths are in samples; the CLI converts from seconds using `sample_rate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentConfig {
    /// Sampling frequency in Hz
    pub sample_rate: f64,
    /// Number of consecutive samples forming a stable window
    pub stable_window: usize,
    /// Largest max-min spread (bpm) allowed inside a stable window
    pub stable_max_spread: f64,
    /// Samples at or below this value are implausible
    pub min_bpm: f64,
    /// Samples at or above this value are implausible
    pub max_bpm: f64,
    /// Shortest span kept as a candidate segment
    pub min_segment_len: usize,
    /// Longest gap tolerated inside a segment
    pub max_gap_len: usize,
    /// Valid runs this short between two longer gaps are erased
    pub trim_max_run: usize,
    /// Sample-to-sample change (bpm) treated as a spike
    pub max_change: f64,
    /// Extra positions invalidated after each flagged sample
    pub spike_dilation: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            stable_window: DEFAULT_STABLE_WINDOW,
            stable_max_spread: DEFAULT_STABLE_MAX_SPREAD,
            min_bpm: DEFAULT_MIN_BPM,
            max_bpm: DEFAULT_MAX_BPM,
            min_segment_len: DEFAULT_MIN_SEGMENT_LEN,
            max_gap_len: DEFAULT_MAX_GAP_LEN,
            trim_max_run: DEFAULT_TRIM_MAX_RUN,
            max_change: DEFAULT_MAX_CHANGE,
            spike_dilation: DEFAULT_SPIKE_DILATION,
        }
    }
}

impl SegmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.stable_window == 0 {
            return Err(ConfigError::EmptyStableWindow);
        }
        if self.stable_max_spread.is_nan() || self.stable_max_spread < 0.0 {
            return Err(ConfigError::NegativeSpread(self.stable_max_spread));
        }
        if !(self.min_bpm < self.max_bpm) {
            return Err(ConfigError::InvertedBounds {
                min: self.min_bpm,
                max: self.max_bpm,
            });
        }
        if self.min_segment_len == 0 {
            return Err(ConfigError::NonPositiveSegmentLength);
        }
        if !(self.max_change > 0.0) {
            return Err(ConfigError::InvalidSpikeThreshold(self.max_change));
        }
        Ok(())
    }

    /// Converts a duration in seconds to a sample count at this config's rate.
    pub fn samples(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate).round().max(0.0) as usize
    }
}

/// Extract ranked analysis segments from fetal heart-rate recordings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV recording, or a directory scanned recursively for .csv files
    #[arg(help = "CSV recording or directory of CSV recordings")]
    pub input_path: PathBuf,

    /// Name of the heart-rate column (defaults to the first column)
    #[arg(long, env = "FHR_COLUMN")]
    pub column: Option<String>,

    /// Sampling frequency in Hz
    #[arg(long, default_value = "4.0")]
    pub sample_rate: f64,

    /// Number of consecutive samples in a stable window
    #[arg(long, default_value = "5")]
    pub stable_window: usize,

    /// Maximum spread (bpm) inside a stable window
    #[arg(long, default_value = "10.0")]
    pub stable_max_spread: f64,

    /// Lower physiological bound (bpm, exclusive)
    #[arg(long, default_value = "50.0")]
    pub min_bpm: f64,

    /// Upper physiological bound (bpm, exclusive)
    #[arg(long, default_value = "200.0")]
    pub max_bpm: f64,

    /// Minimum segment duration in minutes
    #[arg(long, default_value = "8.0")]
    pub min_segment_minutes: f64,

    /// Longest gap tolerated inside a segment, in seconds
    #[arg(long, default_value = "10.0")]
    pub max_gap_seconds: f64,

    /// Valid runs up to this many seconds between longer gaps are erased
    #[arg(long, default_value = "3.0")]
    pub trim_max_seconds: f64,

    /// Sample-to-sample change (bpm) treated as a spike
    #[arg(long, default_value = "25.0")]
    pub max_change: f64,

    /// Extra samples invalidated after each spike
    #[arg(long, default_value = "2")]
    pub spike_dilation: usize,

    /// Segment ranking policy (best-quality, early-valid, late-valid)
    #[arg(long, default_value = "best-quality")]
    pub policy: SelectionPolicy,

    /// Length of the exported analysis window in minutes
    #[arg(long, default_value = "10.0")]
    pub max_window_minutes: f64,

    /// Minutes dropped from the end of every recording before analysis
    #[arg(long)]
    pub clip_tail_minutes: Option<f64>,

    /// CSV output file prefix (e.g. /path/to/output/prefix.csv)
    #[arg(long, env = "CSV_OUTPUT")]
    pub csv_output: Option<String>,

    /// JSON index of all processed recordings
    #[arg(long)]
    pub index_output: Option<PathBuf>,
}

impl Args {
    pub fn segment_config(&self) -> SegmentConfig {
        let mut config = SegmentConfig {
            sample_rate: self.sample_rate,
            stable_window: self.stable_window,
            stable_max_spread: self.stable_max_spread,
            min_bpm: self.min_bpm,
            max_bpm: self.max_bpm,
            max_change: self.max_change,
            spike_dilation: self.spike_dilation,
            ..SegmentConfig::default()
        };
        config.min_segment_len = config.samples(self.min_segment_minutes * 60.0);
        config.max_gap_len = config.samples(self.max_gap_seconds);
        config.trim_max_run = config.samples(self.trim_max_seconds);
        config
    }

    pub fn max_window_len(&self) -> usize {
        (self.max_window_minutes * 60.0 * self.sample_rate).round().max(0.0) as usize
    }

    pub fn clip_tail_len(&self) -> usize {
        self.clip_tail_minutes
            .map(|m| (m * 60.0 * self.sample_rate).round().max(0.0) as usize)
            .unwrap_or(0)
    }
}

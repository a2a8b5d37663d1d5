use crate::config::SegmentConfig;
use crate::error::{ConfigError, SegmentError};
use crate::gaps::{find_candidate_segments, trim_short_segments};
use crate::preprocessing::{fill_gaps, presence_mask, zero_extreme_values};
use crate::spikes::filter_spikes;
use crate::stability::find_stable_start;
use crate::Recording;
use log::{debug, info, warn};
use serde::Serialize;
use std::ops::Range;

/// A cleaned, analysable window of a recording.
///
/// `start`/`end` index into the recording's samples; every per-sample vector
/// has `end - start` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// Cleaned samples (gaps and spikes interpolated)
    pub samples: Vec<f64>,
    /// Raw samples for the same range
    pub original: Vec<f64>,
    /// Seconds from the start of the recording
    pub timestamps: Vec<f64>,
    /// `false` where a sample was filled or repaired
    pub mask: Vec<bool>,
    /// Fraction of valid samples, in [0, 1]
    pub quality: f64,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&valid| valid).count()
    }
}

/// Mean of the validity mask; 0.0 for an empty mask.
pub fn quality_score(mask: &[bool]) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.iter().filter(|&&valid| valid).count() as f64 / mask.len() as f64
}

/// Stable sort, best quality first.
pub fn rank_by_quality(segments: &mut [Segment]) {
    segments.sort_by(|a, b| b.quality.total_cmp(&a.quality));
}

/// Per-recording cleaning and segment selection.
#[derive(Debug, Clone)]
pub struct SegmentPipeline {
    config: SegmentConfig,
}

impl SegmentPipeline {
    pub fn new(config: SegmentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Ranked segments for a recording. Data-quality problems are logged and
    /// yield an empty list.
    pub fn run(&self, recording: &Recording) -> Vec<Segment> {
        match self.extract(recording) {
            Ok(segments) => segments,
            Err(SegmentError::NoValidSegments) => {
                info!("{}: no span meets the minimum segment length", recording.id);
                Vec::new()
            }
            Err(e) => {
                warn!("{}: skipping recording: {}", recording.id, e);
                Vec::new()
            }
        }
    }

    /// Like [`run`](Self::run) but reports why a recording produced nothing.
    pub fn extract(&self, recording: &Recording) -> Result<Vec<Segment>, SegmentError> {
        let config = &self.config;

        if !(recording.sample_rate.is_finite() && recording.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(recording.sample_rate).into());
        }

        let anchor = find_stable_start(
            &recording.samples,
            config.stable_window,
            config.stable_max_spread,
        )
        .ok_or(SegmentError::NoStableRegion)?;
        debug!("{}: stable start at sample {}", recording.id, anchor);

        let anchored = &recording.samples[anchor..];
        let trimmed = trim_short_segments(anchored, config.trim_max_run);
        let candidates =
            find_candidate_segments(&trimmed, config.min_segment_len, config.max_gap_len);
        if candidates.is_empty() {
            return Err(SegmentError::NoValidSegments);
        }
        debug!(
            "{}: {} candidate segments {:?}",
            recording.id,
            candidates.len(),
            candidates
        );

        let time_axis = recording.time_axis();
        let mut segments = Vec::with_capacity(candidates.len());

        for span in candidates {
            let absolute = span.start + anchor..span.end + anchor;
            match self.clean_candidate(&trimmed[span], recording, &time_axis, absolute) {
                Ok(segment) => segments.push(segment),
                Err(e) => warn!("{}: dropping candidate: {}", recording.id, e),
            }
        }

        rank_by_quality(&mut segments);

        if let Some(best) = segments.first() {
            info!(
                "{}: {} segments, best {}..{} ({:.1}% valid)",
                recording.id,
                segments.len(),
                best.start,
                best.end,
                best.quality * 100.0
            );
        }

        Ok(segments)
    }

    /// Sanitize, re-anchor, fill and de-spike one candidate span.
    ///
    /// `span` is the candidate's position in the recording and `trimmed` its
    /// samples after short-run trimming.
    fn clean_candidate(
        &self,
        trimmed: &[f64],
        recording: &Recording,
        time_axis: &[f64],
        span: Range<usize>,
    ) -> Result<Segment, SegmentError> {
        let config = &self.config;
        let Range { mut start, end } = span;

        let sanitized = zero_extreme_values(trimmed, config.min_bpm, config.max_bpm);

        let offset = find_stable_start(&sanitized, config.stable_window, config.stable_max_spread)
            .ok_or(SegmentError::NoStableRegion)?;
        if offset > 0 {
            debug!(
                "{}: segment re-anchored from {} to {}",
                recording.id,
                start,
                start + offset
            );
            start += offset;
        }
        let sanitized = &sanitized[offset..];

        let mask = presence_mask(sanitized);
        if !mask.iter().any(|&valid| valid) {
            return Err(SegmentError::AllInvalid { start, end });
        }

        let filled = fill_gaps(sanitized, &mask);
        let repair = filter_spikes(&filled, &mask, config.max_change, config.spike_dilation);
        let quality = quality_score(&repair.mask);

        Ok(Segment {
            start,
            end,
            samples: repair.signal.into_owned(),
            original: recording.samples[start..end].to_vec(),
            timestamps: time_axis[start..end].to_vec(),
            mask: repair.mask.into_owned(),
            quality,
        })
    }
}

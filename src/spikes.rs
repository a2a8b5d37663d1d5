//! Detection and repair of abrupt sample-to-sample jumps.
//!
//! Runs on an already gap-filled signal. A jump only counts when both of its
//! endpoints were genuine readings, so regions that were interpolated earlier
//! are not penalised twice. Each jump invalidates the sample that follows it
//! plus `dilation` more samples to cover the settling after the artefact.

use crate::preprocessing::interpolate_from_anchors;
use log::debug;
use std::borrow::Cow;

/// Result of [`filter_spikes`]. Both buffers borrow the input when nothing
/// was flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeRepair<'a> {
    pub signal: Cow<'a, [f64]>,
    pub mask: Cow<'a, [bool]>,
    /// Threshold-exceeding differences between two valid samples
    pub spikes: usize,
    /// Positions invalidated after dilation
    pub flagged: usize,
}

impl SpikeRepair<'_> {
    pub fn is_unchanged(&self) -> bool {
        matches!(
            (&self.signal, &self.mask),
            (Cow::Borrowed(_), Cow::Borrowed(_))
        )
    }
}

/// Positions to invalidate: for every difference `|x[k+1] - x[k]| > max_change`
/// with both endpoints valid, samples `k+1 ..= k+1+dilation`, clipped at the
/// end of the signal.
pub fn spike_positions(
    signal: &[f64],
    mask: &[bool],
    max_change: f64,
    dilation: usize,
) -> (Vec<bool>, usize) {
    let n = signal.len();
    let mut flagged = vec![false; n];
    let mut spikes = 0;

    for k in 0..n.saturating_sub(1) {
        let jump = (signal[k + 1] - signal[k]).abs();
        if jump > max_change && mask[k] && mask[k + 1] {
            spikes += 1;
            let end = k.saturating_add(2).saturating_add(dilation).min(n);
            flagged[k + 1..end].fill(true);
        }
    }

    (flagged, spikes)
}

pub fn filter_spikes<'a>(
    signal: &'a [f64],
    mask: &'a [bool],
    max_change: f64,
    dilation: usize,
) -> SpikeRepair<'a> {
    debug_assert_eq!(signal.len(), mask.len());

    let (flagged, spikes) = spike_positions(signal, mask, max_change, dilation);
    let flagged_count = flagged.iter().filter(|&&f| f).count();

    if flagged_count == 0 {
        return SpikeRepair {
            signal: Cow::Borrowed(signal),
            mask: Cow::Borrowed(mask),
            spikes: 0,
            flagged: 0,
        };
    }

    debug!(
        "{} jumps above {} bpm, invalidating {} samples",
        spikes, max_change, flagged_count
    );

    let anchors: Vec<bool> = flagged.iter().map(|&f| !f).collect();
    let repaired = match interpolate_from_anchors(signal, &anchors) {
        Some(repaired) => Cow::Owned(repaired),
        None => Cow::Borrowed(signal),
    };
    let new_mask: Vec<bool> = mask
        .iter()
        .zip(&flagged)
        .map(|(&valid, &flag)| valid && !flag)
        .collect();

    SpikeRepair {
        signal: repaired,
        mask: Cow::Owned(new_mask),
        spikes,
        flagged: flagged_count,
    }
}

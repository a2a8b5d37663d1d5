//! Missing-data runs and the candidate spans between them.
//!
//! A sample value of exactly `0.0` marks a missing reading.

use log::debug;
use std::borrow::Cow;
use std::ops::Range;

/// A maximal run of missing samples, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: usize,
    pub end: usize,
}

impl Gap {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub fn is_missing(value: f64) -> bool {
    value == 0.0
}

/// Locate every maximal zero run, earliest first. A run reaching the end of
/// the signal is included.
pub fn find_gaps(signal: &[f64]) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut current_start: Option<usize> = None;

    for (i, &value) in signal.iter().enumerate() {
        match (is_missing(value), current_start) {
            (true, None) => current_start = Some(i),
            (false, Some(start)) => {
                gaps.push(Gap { start, end: i });
                current_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = current_start {
        gaps.push(Gap {
            start,
            end: signal.len(),
        });
    }

    gaps
}

/// Erase short valid runs sandwiched between two longer gaps.
///
/// A run between consecutive gaps is zeroed when it is at most `max_run`
/// samples long and strictly shorter than both neighbours. The gap list is
/// computed once up front, so runs exposed by an earlier erasure are not
/// reconsidered.
pub fn trim_short_segments(signal: &[f64], max_run: usize) -> Cow<'_, [f64]> {
    let gaps = find_gaps(signal);
    let mut trimmed: Cow<'_, [f64]> = Cow::Borrowed(signal);

    for pair in gaps.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let run = next.start - prev.end;
        if run <= max_run && run < prev.len().min(next.len()) {
            debug!(
                "Trimming {} samples at {} between gaps of {} and {}",
                run,
                prev.end,
                prev.len(),
                next.len()
            );
            trimmed.to_mut()[prev.end..next.start].fill(0.0);
        }
    }

    trimmed
}

/// Split a trimmed signal into candidate spans.
///
/// Gaps up to `max_gap` samples are tolerated inside a span; longer gaps
/// become boundaries. Spans shorter than `min_len` are discarded.
pub fn find_candidate_segments(
    signal: &[f64],
    min_len: usize,
    max_gap: usize,
) -> Vec<Range<usize>> {
    let boundaries = find_gaps(signal)
        .into_iter()
        .filter(|gap| gap.len() > max_gap);

    let mut segments = Vec::new();
    let mut seg_start = 0;

    for gap in boundaries {
        if gap.start - seg_start >= min_len {
            segments.push(seg_start..gap.start);
        }
        seg_start = gap.end;
    }

    if seg_start < signal.len() && signal.len() - seg_start >= min_len {
        segments.push(seg_start..signal.len());
    }

    segments
}

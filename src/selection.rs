use crate::pipeline::Segment;
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Which segment of a recording is handed on for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    BestQuality, // highest quality score (head of the ranked list)
    EarlyValid,  // earliest start
    LateValid,   // latest end
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-quality" => Ok(SelectionPolicy::BestQuality),
            "early-valid" => Ok(SelectionPolicy::EarlyValid),
            "late-valid" => Ok(SelectionPolicy::LateValid),
            _ => Err(format!(
                "Invalid selection policy: {}. Use best-quality, early-valid or late-valid",
                s
            )),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionPolicy::BestQuality => "best-quality",
            SelectionPolicy::EarlyValid => "early-valid",
            SelectionPolicy::LateValid => "late-valid",
        };
        f.write_str(name)
    }
}

/// Pick one segment from a quality-ranked list. Returns the position in
/// `ranked` together with the segment.
pub fn select_segment(ranked: &[Segment], policy: SelectionPolicy) -> Option<(usize, &Segment)> {
    let mut candidates = ranked.iter().enumerate();
    match policy {
        SelectionPolicy::BestQuality => candidates.next(),
        SelectionPolicy::EarlyValid => candidates.min_by_key(|(_, s)| s.start),
        SelectionPolicy::LateValid => candidates.min_by_key(|(_, s)| Reverse(s.end)),
    }
}

/// The part of a segment used for analysis: at most `max_len` samples,
/// taken from the end for [`SelectionPolicy::LateValid`] and from the start
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindow<'a> {
    pub start: usize,
    pub samples: &'a [f64],
    pub mask: &'a [bool],
}

pub fn analysis_window(
    segment: &Segment,
    policy: SelectionPolicy,
    max_len: usize,
) -> AnalysisWindow<'_> {
    let n = segment.samples.len();
    let take = n.min(max_len);
    let offset = match policy {
        SelectionPolicy::LateValid => n - take,
        _ => 0,
    };

    AnalysisWindow {
        start: segment.start + offset,
        samples: &segment.samples[offset..offset + take],
        mask: &segment.mask[offset..offset + take],
    }
}

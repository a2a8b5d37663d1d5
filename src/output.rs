use crate::config::SegmentConfig;
use crate::pipeline::Segment;
use crate::selection::{select_segment, AnalysisWindow, SelectionPolicy};
use crate::Recording;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub start: usize,
    pub end: usize,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub recording: String,
    pub samples: usize,
    /// Ranked best quality first
    pub segments: Vec<SegmentSummary>,
    /// Position in `segments` of the policy's pick
    pub selected: Option<usize>,
}

impl RecordingSummary {
    pub fn new(recording: &Recording, ranked: &[Segment], policy: SelectionPolicy) -> Self {
        let segments = ranked
            .iter()
            .map(|s| SegmentSummary {
                start: s.start,
                end: s.end,
                start_secs: s.start as f64 / recording.sample_rate,
                duration_secs: s.len() as f64 / recording.sample_rate,
                quality: s.quality,
            })
            .collect();

        Self {
            recording: recording.id.clone(),
            samples: recording.len(),
            segments,
            selected: select_segment(ranked, policy).map(|(i, _)| i),
        }
    }
}

/// Everything written to the JSON index for one run.
#[derive(Debug, Serialize)]
pub struct RunIndex {
    pub generated_at: DateTime<Utc>,
    pub policy: SelectionPolicy,
    pub config: SegmentConfig,
    pub recordings: Vec<RecordingSummary>,
}

impl RunIndex {
    pub fn new(config: SegmentConfig, policy: SelectionPolicy) -> Self {
        Self {
            generated_at: Utc::now(),
            policy,
            config,
            recordings: Vec::new(),
        }
    }
}

pub fn write_index_json(path: &Path, index: &RunIndex) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create index: {}", path.display()))?;
    serde_json::to_writer_pretty(file, index)?;
    Ok(())
}

/// Write the selected analysis window of a segment as CSV.
///
/// The file lands next to `base_path` as
/// `{stem}_{recording_id}_segment_{segment_num}.{ext}`.
pub fn write_window_csv(
    base_path: &str,
    recording_id: &str,
    segment_num: usize,
    segment: &Segment,
    window: &AnalysisWindow<'_>,
) -> Result<PathBuf> {
    let path = Path::new(base_path);
    let dir = path.parent().unwrap_or(Path::new("."));

    // Create directory if it doesn't exist
    std::fs::create_dir_all(dir)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("segments");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");

    let filename = format!("{}_{}_segment_{}.{}", stem, recording_id, segment_num, ext);
    let full_path = dir.join(filename);

    let file = std::fs::File::create(&full_path)
        .with_context(|| format!("Failed to create {}", full_path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["index", "time_s", "fhr", "fhr_original", "valid"])?;

    let offset = window.start - segment.start;
    for (i, (value, valid)) in window.samples.iter().zip(window.mask).enumerate() {
        let k = offset + i;
        writer.write_record(&[
            (segment.start + k).to_string(),
            segment.timestamps[k].to_string(),
            value.to_string(),
            segment.original[k].to_string(),
            u8::from(*valid).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::analysis_window;

    fn segment() -> Segment {
        Segment {
            start: 8,
            end: 12,
            samples: vec![120.0, 121.0, 122.0, 123.0],
            original: vec![120.0, 0.0, 0.0, 123.0],
            timestamps: vec![2.0, 2.25, 2.5, 2.75],
            mask: vec![true, false, false, true],
            quality: 0.5,
        }
    }

    #[test]
    fn writes_tail_window_csv() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out").join("rp.csv");
        let seg = segment();
        let window = analysis_window(&seg, SelectionPolicy::LateValid, 2);

        let written =
            write_window_csv(base.to_str().unwrap(), "1001", 0, &seg, &window).unwrap();
        assert_eq!(written.file_name().unwrap(), "rp_1001_segment_0.csv");

        let content = std::fs::read_to_string(written).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "index,time_s,fhr,fhr_original,valid");
        assert_eq!(lines[1], "10,2.5,122,0,0");
        assert_eq!(lines[2], "11,2.75,123,123,1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn summary_points_at_policy_pick() {
        let recording = Recording::new("1001", vec![120.0; 20], 4.0);
        let mut late = segment();
        late.start = 14;
        late.end = 18;
        late.quality = 0.25;
        let ranked = vec![segment(), late];

        let summary = RecordingSummary::new(&recording, &ranked, SelectionPolicy::LateValid);
        assert_eq!(summary.selected, Some(1));
        assert_eq!(summary.segments[0].start_secs, 2.0);
        assert_eq!(summary.segments[0].duration_secs, 1.0);

        let mut index = RunIndex::new(SegmentConfig::default(), SelectionPolicy::LateValid);
        index.recordings.push(summary);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        write_index_json(&path, &index).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["policy"], "late-valid");
        assert_eq!(json["recordings"][0]["selected"], 1);
        assert_eq!(json["config"]["min_segment_len"], 1920);
    }
}

use anyhow::Context;
use clap::Parser;
use ctg_segments::config::Args;
use ctg_segments::data_loading::{find_recordings, read_recording_csv};
use ctg_segments::output::{write_index_json, write_window_csv, RecordingSummary, RunIndex};
use ctg_segments::selection::{analysis_window, select_segment};
use ctg_segments::SegmentPipeline;
use log::warn;

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();
    let config = args.segment_config();
    let pipeline = SegmentPipeline::new(config.clone()).context("Invalid configuration")?;

    let paths = find_recordings(&args.input_path)?;
    println!("Found {} recordings", paths.len());

    let max_window = args.max_window_len();
    let clip_tail = args.clip_tail_len();
    let mut index = RunIndex::new(config, args.policy);
    let mut with_segments = 0;

    for path in &paths {
        let sample_rate = pipeline.config().sample_rate;
        let mut recording = match read_recording_csv(path, args.column.as_deref(), sample_rate) {
            Ok(recording) => recording,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                continue;
            }
        };
        if clip_tail > 0 {
            recording.clip_tail(clip_tail);
        }

        let segments = pipeline.run(&recording);
        println!(
            "\nRecording {}: {} samples ({:.1} min), {} segments",
            recording.id,
            recording.len(),
            recording.duration_secs() / 60.0,
            segments.len()
        );
        for seg in &segments {
            println!(
                "  {:>6} - {:>6}   {:5.1}% valid",
                seg.start,
                seg.end,
                seg.quality * 100.0
            );
        }

        if let Some((num, seg)) = select_segment(&segments, args.policy) {
            with_segments += 1;
            if let Some(base_path) = &args.csv_output {
                let window = analysis_window(seg, args.policy, max_window);
                let written = write_window_csv(base_path, &recording.id, num, seg, &window)?;
                println!("  Wrote {} samples to {}", window.samples.len(), written.display());
            }
        }

        index
            .recordings
            .push(RecordingSummary::new(&recording, &segments, args.policy));
    }

    println!(
        "\n{} of {} recordings produced segments",
        with_segments,
        paths.len()
    );

    if let Some(index_path) = &args.index_output {
        write_index_json(index_path, &index)?;
        println!("Wrote index to {}", index_path.display());
    }

    Ok(())
}

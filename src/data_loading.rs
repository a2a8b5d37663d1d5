use crate::Recording;
use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect the CSV recordings to process. A file path is returned as is; a
/// directory is scanned recursively and the results sorted by path.
pub fn find_recordings(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(input) {
        let entry =
            entry.with_context(|| format!("Failed to scan directory: {}", input.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    debug!("Found {} recordings under {}", paths.len(), input.display());
    Ok(paths)
}

/// Load one recording from a CSV file with a header row.
///
/// `column` selects the heart-rate column by name; the first column is used
/// when it is `None`. Blank, unparsable, non-finite and negative cells read
/// as missing (`0.0`). The recording id is the file stem.
pub fn read_recording_csv(
    path: &Path,
    column: Option<&str>,
    sample_rate: f64,
) -> Result<Recording> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording")
        .to_string();

    let samples = parse_samples(file, column)
        .with_context(|| format!("Failed to read recording: {}", path.display()))?;

    Ok(Recording::new(id, samples, sample_rate))
}

fn parse_samples<R: Read>(reader: R, column: Option<&str>) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true) // Handle variable number of fields
        .trim(csv::Trim::All)
        .from_reader(reader);

    let index = match column {
        Some(name) => rdr
            .headers()?
            .iter()
            .position(|h| h.trim_matches('"') == name)
            .ok_or_else(|| anyhow!("Column {:?} not found", name))?,
        None => 0,
    };

    let mut samples = Vec::new();
    let mut missing_cells = 0;

    for result in rdr.records() {
        let record = result?;
        let value = record
            .get(index)
            .and_then(|cell| cell.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0);
        match value {
            Some(v) => samples.push(v),
            None => {
                missing_cells += 1;
                samples.push(0.0);
            }
        }
    }

    debug!(
        "Read {} samples ({} missing cells)",
        samples.len(),
        missing_cells
    );
    Ok(samples)
}

use assert_cmd::cargo::cargo_bin_cmd;
use std::error::Error;
use std::fs;
use std::path::Path;

fn write_recording(path: &Path, samples: &[f64]) -> Result<(), Box<dyn Error>> {
    let mut content = String::from("FHR,UC\n");
    for v in samples {
        content.push_str(&format!("{},0\n", v));
    }
    fs::write(path, content)?;
    Ok(())
}

#[test]
fn batch_run_writes_windows_and_index() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("recordings");
    fs::create_dir(&input)?;

    let mut split = vec![140.0; 4800];
    split[2150..2650].fill(0.0);
    write_recording(&input.join("1001.csv"), &split)?;
    write_recording(&input.join("1002.csv"), &[0.0; 4800])?;

    let out = dir.path().join("out");
    let index = out.join("index.json");

    let mut cmd = cargo_bin_cmd!("ctg-segments");
    cmd.arg(&input)
        .args(["--column", "FHR", "--policy", "late-valid", "--max-window-minutes", "5"])
        .arg("--csv-output")
        .arg(out.join("fhr.csv"))
        .arg("--index-output")
        .arg(&index);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output)?;
    assert!(stdout.contains("1 of 2 recordings produced segments"));

    let window = fs::read_to_string(out.join("fhr_1001_segment_1.csv"))?;
    let rows: Vec<&str> = window.lines().collect();
    assert_eq!(rows[0], "index,time_s,fhr,fhr_original,valid");
    assert_eq!(rows.len(), 1 + 1200);
    assert_eq!(rows.last(), Some(&"4799,1199.75,140,140,1"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&index)?)?;
    let recordings = json["recordings"].as_array().ok_or("recordings array")?;
    assert_eq!(recordings.len(), 2);
    assert_eq!(recordings[0]["recording"], "1001");
    assert_eq!(recordings[0]["segments"].as_array().map(Vec::len), Some(2));
    assert_eq!(recordings[0]["selected"], 1);
    assert!(recordings[1]["selected"].is_null());
    Ok(())
}

#[test]
fn clip_tail_shortens_recording() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("2001.csv");
    write_recording(&path, &[150.0; 2400])?;
    let index = dir.path().join("index.json");

    // 10 minutes minus 3 minutes leaves less than the 8 minute minimum
    let mut cmd = cargo_bin_cmd!("ctg-segments");
    cmd.arg(&path)
        .args(["--clip-tail-minutes", "3"])
        .arg("--index-output")
        .arg(&index);
    cmd.assert().success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&index)?)?;
    assert_eq!(json["recordings"][0]["samples"], 1680);
    assert_eq!(json["recordings"][0]["segments"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn zero_minimum_duration_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("3001.csv");
    write_recording(&path, &[150.0; 100])?;

    let mut cmd = cargo_bin_cmd!("ctg-segments");
    cmd.arg(&path).args(["--min-segment-minutes", "0"]);
    cmd.assert().failure();
    Ok(())
}

use assert_cmd::Command;

fn vidconv() -> Command {
    let mut cmd = Command::cargo_bin("vidconv").unwrap();
    cmd.env_remove("VIDCONV_FFMPEG")
        .env_remove("VIDCONV_FFPROBE")
        .env_remove("VIDCONV_TEMP_DIR");
    cmd
}

#[test]
fn help_works() {
    vidconv().arg("--help").assert().success();
}

#[test]
fn list_formats_shows_table() {
    let output = vidconv().arg("--list-formats").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("MP4"));
    assert!(stdout.contains("libx264"));
    assert!(stdout.contains("3GPP"));
    assert!(stdout.contains("h263p"));
}

#[test]
fn list_formats_json_keeps_order() {
    let output = vidconv()
        .args(["--list-formats", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let formats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let formats = formats.as_array().unwrap();
    assert_eq!(formats.len(), 12);
    assert_eq!(formats[0]["label"], "MP4");
    assert_eq!(formats[0]["codec_id"], "libx264");
    assert_eq!(formats[11]["label"], "3GPP");
}

#[test]
fn unknown_format_is_rejected() {
    let output = vidconv()
        .args(["-i", "a.mov", "-o", "b.xyz", "--format", "XYZ"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown format: XYZ"));
}

#[test]
fn missing_ffmpeg_exits_with_error() {
    vidconv()
        .args(["-i", "a.mov", "-o", "b.mp4"])
        .args(["--ffmpeg", "/nonexistent/vidconv-ffmpeg"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn input_is_required() {
    vidconv().args(["-o", "b.mp4"]).assert().failure();
}

use assert_cmd::Command;

fn tjson() -> Command {
    Command::cargo_bin("tjson").expect("binary builds")
}

#[test]
fn formats_stdin() {
    let assert = tjson()
        .arg("--color")
        .arg("never")
        .write_stdin(r#"{"a":1,"b":[1,2,3]}"#)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout, "{ \"a\": 1, \"b\": [1, 2, 3] }\n");
}

#[test]
fn compact_minifies() {
    let assert = tjson()
        .args(["--compact", "--color", "never"])
        .write_stdin("{ \"a\": [1, 2, 3],\n  \"b\": true }")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout, r#"{"a":[1,2,3],"b":true}"#);
}

#[test]
fn comments_rejected_by_default_but_preservable() {
    tjson().write_stdin("[1] // note").assert().failure();

    let assert = tjson()
        .args(["--comments", "preserve", "--color", "never"])
        .write_stdin("[1] // note")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(stdout.contains("// note"));
}

#[test]
fn width_option_changes_layout() {
    let input = r#"[1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000]"#;
    let assert = tjson()
        .args(["-w", "20", "--color", "never"])
        .write_stdin(input)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(stdout.lines().count() > 1);
    for line in stdout.lines() {
        assert!(line.len() <= 20, "line over width: {line:?}");
    }
}

#[test]
fn jsonl_mode_formats_each_line() {
    let assert = tjson()
        .args(["--jsonl", "--compact", "--color", "never"])
        .write_stdin("{\"a\": 1}\n[1, 2]\n")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout, "{\"a\":1}\n[1,2]\n");
}

#[test]
fn jsonl_passthrough_keeps_bad_lines() {
    let assert = tjson()
        .args([
            "--jsonl",
            "--compact",
            "--jsonl-errors",
            "passthrough",
            "--color",
            "never",
        ])
        .write_stdin("{\"a\": 1}\nnot json\n")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout, "{\"a\":1}\nnot json\n");
}

#[test]
fn bad_input_reports_position() {
    let assert = tjson().write_stdin("{\"a\" 1}").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("row="), "stderr was: {stderr}");
}

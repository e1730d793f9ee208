use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn tex2svg() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tex2svg"));
    cmd.env_remove("TEX2SVG_FONT_SIZE")
        .env_remove("TEX2SVG_DPI")
        .env_remove("TEX2SVG_LOG")
        .env_remove("TEX2SVG_LOG_FORMAT");
    cmd
}

#[test]
fn converts_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    tex2svg()
        .arg("x^2 + y^2 = z^2")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let svg = fs::read_to_string(&path).unwrap();
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.tag_name().namespace(), Some("http://www.w3.org/2000/svg"));
    assert!(root.attribute("width").unwrap().ends_with("px"));
    assert!(root.attribute("height").unwrap().ends_with("px"));
}

#[test]
fn dash_writes_to_stdout() {
    tex2svg()
        .args(["--inline", "--font-size", "9", r"$\frac{1}{2}$", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<svg").and(predicate::str::ends_with("</svg>")));
}

#[test]
fn same_input_gives_same_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    tex2svg().arg(r"e^{i\pi} + 1 = 0").arg(&path).assert().success();
    let first = fs::read(&path).unwrap();
    tex2svg().arg(r"e^{i\pi} + 1 = 0").arg(&path).assert().success();

    assert_eq!(first, fs::read(&path).unwrap());
}

#[test]
fn empty_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    tex2svg()
        .arg("  ")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TeX source is empty"));

    assert!(!path.exists());
}

#[test]
fn malformed_tex_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    tex2svg()
        .arg(r"\frac{1}{2")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to render TeX"));

    assert!(!path.exists());
}

#[test]
fn bad_input_on_stdout_fails_before_engine_startup() {
    tex2svg()
        .args(["-vv", "$$", "-"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("TeX source is empty")
                .and(predicate::str::contains("starting MathJax engine").not()),
        );

    tex2svg()
        .args(["-vv", "--font-size", "1e-4", "--dpi", "1e-4", "x", "-"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("px em")
                .and(predicate::str::contains("starting MathJax engine").not()),
        );
}

#[test]
fn engine_start_is_logged_at_debug() {
    tex2svg()
        .args(["-vv", "x", "-"])
        .assert()
        .success()
        .stderr(predicate::str::contains("starting MathJax engine"));
}

#[test]
fn missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.svg");

    tex2svg()
        .arg("x")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));

    assert!(!path.exists());
}

#[test]
fn invalid_dpi_fails() {
    tex2svg()
        .env("TEX2SVG_DPI", "0")
        .args(["x", "-"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dpi must be a positive number"));
}

#[test]
fn missing_output_is_a_usage_error() {
    tex2svg().arg("x").assert().code(2);
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn scanbrot() -> Command {
    Command::cargo_bin("scanbrot").unwrap()
}

#[test]
fn renders_an_opaque_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandel.png");
    scanbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "32x24", "-i", "30"])
        .assert()
        .success();

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 24));
    assert!(img.pixels().all(|p| p[3] == 255));
}

#[test]
fn prints_the_aspect_corrected_state() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("wide.png");
    scanbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "40x20", "--print-state"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "zoom=6.8,3.4&lookAt=-0.6,0&iterations=50&superSamples=1&escapeRadius=10&colorScheme=hsv1",
        ));
}

#[test]
fn state_strings_override_options() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("state.png");
    scanbrot()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "16x16",
            "--state",
            "iterations=7&colorScheme=grayscale&lookAt=-0.75,0.1",
            "--print-state",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("iterations=7"))
        .stdout(predicate::str::contains("lookAt=-0.75,0.1"))
        .stdout(predicate::str::contains("colorScheme=grayscale"));
}

#[test]
fn newton_supersampled_renders_succeed() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("newton.png");
    scanbrot()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "16x12",
            "-a",
            "newton",
            "-S",
            "4",
            "--seed",
            "9",
            "-l",
            "-0.5,3.1",
            "--print-state",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("colorScheme=newton-colorful"))
        .stdout(predicate::str::contains("tolerance="));
}

#[test]
fn unknown_schemes_are_refused() {
    scanbrot()
        .args(&["-o", "never.png", "-c", "plaid"])
        .assert()
        .failure();
}

#[test]
fn broken_state_strings_are_reported() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("broken.png");
    scanbrot()
        .args(&["-o", out.to_str().unwrap(), "--state", "iterations=lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse iterations"));
    assert!(!out.exists());
}

#[test]
fn empty_images_are_refused() {
    scanbrot()
        .args(&["-o", "never.png", "-s", "0x10"])
        .assert()
        .failure();
}

#[test]
fn infinite_zoom_in_a_state_string_is_refused() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("inf.png");
    scanbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "--state", "zoom=inf,inf"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("zoom is out of range"));
    assert!(!out.exists());
}

#[test]
fn infinite_zoom_option_is_refused() {
    scanbrot()
        .args(&["-o", "never.png", "-s", "8x8", "-z", "inf,inf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("finite and positive"));
}

#[test]
fn zooms_past_f64_precision_still_render() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("deep.png");
    scanbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "-z", "1e-17,1e-17", "-S", "4"])
        .assert()
        .success();
    assert!(out.exists());
}

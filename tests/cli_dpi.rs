use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn body(stdout: &str) -> Vec<&str> {
    stdout.lines().filter(|l| !l.starts_with('>')).collect()
}

#[test]
fn command_dpi() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("dpi")
        .arg("tests/aracne/tri.tsv")
        .arg("--adj")
        .arg("tests/aracne/triangle.adj")
        .arg("-e")
        .arg("0.1")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(
        body(&stdout),
        vec!["A\tB\t0.9", "B\tA\t0.9\tC\t0.8", "C\tB\t0.8"]
    );

    Ok(())
}

#[test]
fn command_dpi_reduced() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("dpi")
        .arg("tests/aracne/tri.tsv")
        .arg("--adj")
        .arg("tests/aracne/triangle.adj")
        .arg("-e")
        .arg("0.1")
        .arg("--write-reduced")
        .arg("--write-empty")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("A\tB\t0.9\tC.1\t0.5\n"));
    assert!(stdout.contains("C\tA.1\t0.5\tB\t0.8\n"));
    assert!(stdout.ends_with("\nD\n"));

    Ok(())
}

#[test]
fn command_dpi_tf() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("dpi")
        .arg("tests/aracne/tri.tsv")
        .arg("--adj")
        .arg("tests/aracne/triangle.adj")
        .arg("-e")
        .arg("0.1")
        .arg("-l")
        .arg("tests/aracne/tf.txt")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // A is a TF and B is not, so A-C survives
    assert_eq!(
        body(&stdout),
        vec!["A\tB\t0.9\tC\t0.5", "B\tA\t0.9\tC\t0.8", "C\tA\t0.5\tB\t0.8"]
    );

    Ok(())
}

#[test]
fn command_dpi_threshold() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("dpi")
        .arg("tests/aracne/tri.tsv")
        .arg("--adj")
        .arg("tests/aracne/triangle.adj")
        .arg("-t")
        .arg("0.6")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains(">  MI threshold    0.6\n"));
    assert_eq!(
        body(&stdout),
        vec!["A\tB\t0.9", "B\tA\t0.9\tC\t0.8", "C\tB\t0.8"]
    );

    Ok(())
}

#[test]
fn command_dpi_unknown_probe() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    cmd.arg("dpi")
        .arg("tests/aracne/small.tsv")
        .arg("--adj")
        .arg("tests/aracne/triangle.adj")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find marker: A"));

    Ok(())
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn command_consensus_bonferroni() -> anyhow::Result<()> {
    // three distinct edges: alpha is 0.05 / 3, and A-B at z = 0.71 is far from it
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("consensus")
        .arg("tests/aracne/boot")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout, "source\ttarget\tMI\n");

    Ok(())
}

#[test]
fn command_consensus_pvalue() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("consensus")
        .arg("tests/aracne/boot")
        .arg("-p")
        .arg("0.3")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("A\tB\t0.8000\n"));
    assert!(stdout.contains("B\tA\t0.8000\n"));
    // A-C is in two runs only
    assert!(!stdout.contains("A\tC\t"));

    Ok(())
}

#[test]
fn command_consensus_files_and_info() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let info = tempdir.path().join("boot.info");

    let mut cmd = Command::cargo_bin("aracne")?;
    let output = cmd
        .arg("consensus")
        .arg("tests/aracne/boot/r001.adj")
        .arg("tests/aracne/boot/r002.adj")
        .arg("-p")
        .arg("0.5")
        .arg("--info")
        .arg(info.to_str().unwrap())
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // two runs with 3 and 2 of 3 edges: mu = 5/3, sigma = sqrt(2/9)
    assert!(output.status.success());
    assert!(stdout.contains("A\tB\t0.8500\n"));
    assert!(!stdout.contains("A\tC\t"));

    let info = std::fs::read_to_string(&info)?;
    assert!(info.contains("Total edge tested: 3\n"));
    assert!(info.contains(">  Input file      small.tsv\n"));
    assert!(info.contains(">  Bootstrap No: 2\n"));

    Ok(())
}

#[test]
fn command_consensus_errors() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("aracne")?;
    cmd.arg("consensus")
        .arg("tests/aracne/boot/r001.adj")
        .arg("tests/aracne/bad_run.adj")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad_run.adj"));

    let mut cmd = Command::cargo_bin("aracne")?;
    cmd.arg("consensus")
        .arg("tests/aracne/boot")
        .arg("-p")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("P-value"));

    let tempdir = TempDir::new()?;
    let mut cmd = Command::cargo_bin("aracne")?;
    cmd.arg("consensus")
        .arg(tempdir.path().to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .adj files found"));

    Ok(())
}

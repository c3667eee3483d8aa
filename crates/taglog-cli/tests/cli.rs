// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PREFIX: &str = "D0000000000000001T";

fn data(directive: &str, rest: &str) -> String {
    format!("{PREFIX}{directive}{rest}")
}

/// `taglog` isolated from the user's config and `RUST_LOG`.
fn taglog(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("taglog").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config-dir").arg(config_dir);
    cmd
}

fn write_log(dir: &TempDir, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(&path, body).unwrap();
    path
}

// ── resolve ──────────────────────────────────────────────────────────────

#[test]
fn resolve_rewrites_after_definition() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        "a.log",
        &[
            "T0000000000000001O1000000005f5e1000".to_owned(),
            data("TP", "post Gabc123"),
            data("AT", "Gabc123 Nalice"),
            data("TP", "post Gabc123 Gother"),
            "t0000000000000001".to_owned(),
        ],
    );
    let expected = [
        "T0000000000000001O1000000005f5e1000".to_owned(),
        data("TP", "post Gabc123"),
        data("AT", "Gabc123 Nalice"),
        data("TP", "post Nalice Gother"),
        "t0000000000000001".to_owned(),
    ]
    .join("\n")
        + "\n";

    taglog(dir.path())
        .arg("resolve")
        .arg(&log)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn resolve_carries_registry_across_files() {
    let dir = TempDir::new().unwrap();
    let first = write_log(&dir, "1.log", &[data("AT", "Gk Nkitten")]);
    let second = write_log(&dir, "2.log", &[data("TP", "post Gk")]);

    taglog(dir.path())
        .arg("resolve")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", data("AT", "Gk Nkitten"), data("TP", "post Nkitten")));
}

#[test]
fn resolve_reads_stdin_without_files() {
    let dir = TempDir::new().unwrap();
    let input = format!("{}\n{}\n", data("AT", "Gk Nname"), data("TP", "p Gk"));

    taglog(dir.path())
        .arg("resolve")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", data("AT", "Gk Nname"), data("TP", "p Nname")));
}

#[test]
fn resolve_mixes_files_and_stdin() {
    let dir = TempDir::new().unwrap();
    let defs = write_log(&dir, "defs.log", &[data("AT", "Gk Nkitten")]);
    let tail = write_log(&dir, "tail.log", &[data("TP", "z Gk Gj")]);
    let piped = format!("{}\n{}\n", data("TP", "p Gk"), data("AT", "Gj Njay"));

    taglog(dir.path())
        .arg("resolve")
        .arg(&defs)
        .arg("-")
        .arg(&tail)
        .write_stdin(piped)
        .assert()
        .success()
        .stdout(format!(
            "{}\n{}\n{}\n{}\n",
            data("AT", "Gk Nkitten"),
            data("TP", "p Nkitten"),
            data("AT", "Gj Njay"),
            data("TP", "z Nkitten Njay"),
        ));
}

#[test]
fn resolve_passes_non_utf8_records_through() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("raw.log");
    let raw = b"T0000000000000001O1\xff\xfe\n";
    let def = format!("{}\n", data("AT", "Gk Nname"));
    fs::write(&log, [&raw[..], def.as_bytes(), &b"D0000000000000001TTPp Gk\n"[..]].concat()).unwrap();

    let expected = [&raw[..], def.as_bytes(), &b"D0000000000000001TTPp Nname\n"[..]].concat();
    taglog(dir.path())
        .arg("resolve")
        .arg(&log)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn resolve_aborts_on_multi_tag() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        "mt.log",
        &[data("TP", "p Ga"), data("MT", "Ga Gb"), data("TP", "p Gc")],
    );

    taglog(dir.path())
        .arg("resolve")
        .arg(&log)
        .assert()
        .failure()
        .stdout(format!("{}\n", data("TP", "p Ga")))
        .stderr(predicate::str::contains("[RESOLVE_UNSUPPORTED] line 2"));
}

#[test]
fn resolve_aborts_on_named_subject() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "at.log", &[data("AT", "Nabc Nalice"), data("TP", "p Gabc")]);

    taglog(dir.path())
        .arg("resolve")
        .arg(&log)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("[RESOLVE_AT_SUBJECT]"));
}

#[test]
fn resolve_aborts_on_empty_line() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("gap.log");
    fs::write(&log, format!("{}\n\n", data("TP", "p Ga"))).unwrap();

    taglog(dir.path())
        .arg("resolve")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("[RECORD_EMPTY]"));
}

#[test]
fn resolve_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    taglog(dir.path())
        .arg("resolve")
        .arg(dir.path().join("nope.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn resolve_summary_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "s.log", &[data("AT", "Gk Nname"), data("TP", "p Gk")]);

    taglog(dir.path())
        .args(["--log", "info", "resolve", "--summary"])
        .arg(&log)
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", data("AT", "Gk Nname"), data("TP", "p Nname")))
        .stderr(predicate::str::contains("resolve complete"));
}

// ── guid ─────────────────────────────────────────────────────────────────

#[test]
fn guid_prints_one_identifier() {
    let dir = TempDir::new().unwrap();
    let shape = predicate::str::is_match(
        r"^[a-hkopqrstyA-HKLPQRSTY2-90]{6}(-[a-hkopqrstyA-HKLPQRSTY2-90]{6}){3}\n$",
    )
    .unwrap();

    taglog(dir.path()).arg("guid").assert().success().stdout(shape);
}

#[test]
fn guid_uses_entropy_file() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.bin");
    fs::write(&seed, [1u8, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();

    taglog(dir.path())
        .arg("guid")
        .arg("--entropy")
        .arg(&seed)
        .assert()
        .success()
        .stdout("af0s8e-aS35D0-aaaaaa-aaaaaa\n");
}

#[test]
fn guid_uses_configured_entropy() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.bin");
    fs::write(&seed, [0u8; 7]).unwrap();
    let config = config_with_entropy(&seed);
    fs::write(dir.path().join("taglog.json"), config).unwrap();

    taglog(dir.path())
        .arg("guid")
        .assert()
        .success()
        .stdout("aaaaaa-aaaaaa-aaaaaa-aaaaaa\n");
}

#[test]
fn guid_fails_on_short_entropy() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("short.bin");
    fs::write(&seed, [1u8, 2, 3]).unwrap();

    taglog(dir.path())
        .arg("guid")
        .arg("--entropy")
        .arg(&seed)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("[GUID_ENTROPY]"));
}

#[test]
fn broken_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("taglog.json"), "{ nope").unwrap();

    taglog(dir.path())
        .arg("guid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[CONFIG_PARSE]"));
}

// ── verify ───────────────────────────────────────────────────────────────

#[test]
fn verify_accepts_generated_identifier() {
    let dir = TempDir::new().unwrap();
    taglog(dir.path())
        .args(["verify", "af0s8e-aS35D0-aaaaaa-aaaaaa"])
        .assert()
        .success()
        .stdout("af0s8e-aS35D0-aaaaaa-aaaaaa ok\n");
}

#[test]
fn verify_reports_each_identifier() {
    let dir = TempDir::new().unwrap();
    taglog(dir.path())
        .args(["verify", "aaaaaa-aaaaaa-aaaaaa-aaaaaa", "2pd9eY-af0s9F-aaaaaa-aaaaaa"])
        .assert()
        .success()
        .stdout("aaaaaa-aaaaaa-aaaaaa-aaaaaa ok\n2pd9eY-af0s9F-aaaaaa-aaaaaa ok\n");
}

#[test]
fn verify_rejects_bad_checksum() {
    let dir = TempDir::new().unwrap();
    taglog(dir.path())
        .args(["verify", "af0s8e-aS35D2-aaaaaa-aaaaaa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[GUID_CHECKSUM]"));
}

fn config_with_entropy(entropy: &Path) -> String {
    format!(
        "{{\"entropy_path\": {:?}, \"summary\": false}}",
        entropy.display().to_string()
    )
}

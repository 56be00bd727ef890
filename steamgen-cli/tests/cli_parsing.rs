//! Verb dispatch and exit status tests for the steamgen binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn steamgen() -> Command {
    let mut cmd = Command::cargo_bin("steamgen").expect("steamgen binary");
    cmd.env_remove("STEAMGEN_ROOT");
    cmd
}

/// `<temp>/gen` is the working root; the protocol tree lives at `<temp>/protocol`.
fn create_layout() -> (TempDir, PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path().join("gen");
    fs::create_dir_all(root.join("Protobufs").join("tf2")).unwrap();
    let protocol = td.path().join("protocol");
    fs::create_dir_all(protocol.join("protobuf").join("tf2")).unwrap();
    fs::create_dir_all(protocol.join("steamlang")).unwrap();
    (td, root)
}

fn protocol_dir(root: &Path) -> PathBuf {
    root.parent().unwrap().join("protocol")
}

#[test]
fn no_verb_prints_available_targets() {
    steamgen()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid target!"))
        .stderr(predicate::str::contains(
            "Available targets: clean, proto, steamlang",
        ));
}

#[test]
fn unrecognised_target_is_rejected() {
    steamgen()
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid target!"));
}

#[test]
fn help_lists_options() {
    steamgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--print-commands"))
        .stdout(predicate::str::contains("--group"));
}

#[test]
fn list_groups_shows_catalog() {
    steamgen()
        .arg("--list-groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("steam"))
        .stdout(predicate::str::contains("tf2"))
        .stdout(predicate::str::contains("dota2"))
        .stdout(predicate::str::contains("protobuf/csgo"));
}

#[test]
fn clean_removes_generated_files() {
    let (_td, root) = create_layout();
    let protocol = protocol_dir(&root);
    let generated = protocol.join("protobuf").join("tf2").join("base.pb.go");
    let handwritten = protocol.join("protobuf").join("tf2").join("doc.go");
    let enums = protocol.join("steamlang").join("enums.go");
    fs::write(&generated, "package tf2\n").unwrap();
    fs::write(&handwritten, "package tf2\n").unwrap();
    fs::write(&enums, "package steamlang\n").unwrap();

    steamgen()
        .arg("clean")
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    assert!(!generated.exists());
    assert!(!enums.exists());
    assert!(handwritten.exists());
}

#[test]
fn clean_on_empty_tree_succeeds() {
    let (_td, root) = create_layout();

    steamgen()
        .args(["clean", "--root"])
        .arg(&root)
        .assert()
        .success();
}

#[test]
fn proto_with_missing_compiler_fails() {
    let (_td, root) = create_layout();
    fs::write(
        root.join("steamgen.toml"),
        "[tools]\nprotoc = \"steamgen-missing-protoc\"\n",
    )
    .unwrap();

    steamgen()
        .args(["proto", "--group", "tf2", "--root"])
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("steamgen-missing-protoc"));
}

#[cfg(unix)]
#[test]
fn proto_aborts_when_compiler_exits_non_zero() {
    let (_td, root) = create_layout();
    fs::write(root.join("steamgen.toml"), "[tools]\nprotoc = \"false\"\n").unwrap();

    steamgen()
        .args(["proto", "--group", "tf2", "--root"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with exit status 1"))
        .stderr(predicate::str::contains("base_gcmessages.proto"));

    let tf2 = protocol_dir(&root).join("protobuf").join("tf2");
    assert!(!tf2.join("base.pb.go").exists());
    assert!(!tf2.join("econ.pb.go").exists());
}

#[test]
fn unknown_group_fails() {
    let (_td, root) = create_layout();

    steamgen()
        .args(["proto", "--group", "portal3", "--root"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("portal3"));
}

#[test]
fn invalid_config_fails() {
    let (_td, root) = create_layout();
    fs::write(root.join("steamgen.toml"), "[tools\n").unwrap();

    steamgen()
        .arg("clean")
        .arg("--root")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("steamgen.toml"));
}

#[test]
fn explicit_missing_config_fails() {
    let (_td, root) = create_layout();

    steamgen()
        .arg("clean")
        .arg("--root")
        .arg(&root)
        .arg("--config")
        .arg(root.join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

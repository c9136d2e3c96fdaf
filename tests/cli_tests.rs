// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the `stackcfg` binary.

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

/// Get a Command for the stackcfg binary, isolated from any stack file in the
/// working directory.
fn stackcfg_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("stackcfg").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_components_lists_builtin_modules() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .arg("components")
        .assert()
        .success()
        .stdout(predicate::str::contains("eks"))
        .stdout(predicate::str::contains("iam"))
        .stdout(predicate::str::contains("oidc"))
        .stdout(predicate::str::contains("vpc"));
}

#[test]
fn test_up_malformed_stack_fails_with_stack_id() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["up", "dev-eu-vpc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack 'dev-eu-vpc'"))
        .stderr(predicate::str::contains("Malformed stack identifier"));
}

#[test]
fn test_up_unknown_component_fails() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["up", "dev-rds"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack 'dev-rds'"))
        .stderr(predicate::str::contains("eks, iam, oidc, vpc"));
}

#[test]
fn test_up_dev_vpc_prints_plan() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["up", "dev-vpc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack: dev-vpc"))
        .stdout(predicate::str::contains("engine: plan"))
        .stdout(predicate::str::contains("nat_strategy: none"))
        .stdout(predicate::str::contains("dev-vpc-vpc"));
}

#[test]
fn test_up_reads_discovered_stack_file_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Pulumi.prod-vpc.yaml"),
        "config:\n  vpc:nat_strategy: none\n  vpc:subnet_count: 1\n",
    )
    .unwrap();

    stackcfg_cmd(dir.path())
        .args(["up", "prod-vpc", "-c", "vpc:nat_strategy=single"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nat_strategy: single"))
        .stdout(predicate::str::contains("prod-vpc-public-1"))
        .stdout(predicate::str::contains("prod-vpc-public-2").not());
}

#[test]
fn test_up_masks_secrets_unless_shown() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["up", "dev-iam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[secret]"));

    stackcfg_cmd(dir.path())
        .args(["up", "dev-iam", "--show-secrets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[secret]").not());
}

#[test]
fn test_up_module_error_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["up", "dev-oidc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack 'dev-oidc'"))
        .stderr(predicate::str::contains("oidc:issuer_url"));
}

#[test]
fn test_resolve_reports_origin() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["resolve", "prod-vpc", "vpc:nat_strategy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc:nat_strategy = multi-az (defaults)"));

    stackcfg_cmd(dir.path())
        .args(["resolve", "prod-vpc", "vpc:subnet_count", "--type", "int", "-c", "vpc:subnet_count=5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc:subnet_count = 5 (config)"));

    stackcfg_cmd(dir.path())
        .args(["resolve", "qa-vpc", "vpc:name", "--fallback", "edge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc:name = edge (fallback)"));
}

#[test]
fn test_resolve_type_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    stackcfg_cmd(dir.path())
        .args(["resolve", "dev-vpc", "vpc:subnet_count", "--type", "int", "-c", "vpc:subnet_count=two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stack 'dev-vpc'"));
}

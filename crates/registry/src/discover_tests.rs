// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;

use tempfile::TempDir;

use super::*;

fn write_manifest(dir: &Path, contents: &str) {
    fs::write(dir.join("driver.json"), contents).unwrap();
}

#[tokio::test]
async fn initialize_discovers_a_valid_manifest() {
    let tmp = TempDir::new().unwrap();
    let driver_dir = tmp.path().join("echo-driver");
    fs::create_dir_all(&driver_dir).unwrap();
    write_manifest(&driver_dir, r#"{"name": "Echo", "executable": "index.js"}"#);
    fs::write(driver_dir.join("index.js"), "").unwrap();

    let registry = Registry::new();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();

    let ids = registry.list().await;
    assert_eq!(ids.len(), 1);
    let meta = registry.get(&ids[0]).await.unwrap();
    assert_eq!(meta.id.as_str(), "echo-driver");
    assert_eq!(meta.name, "Echo");
}

#[tokio::test]
async fn malformed_manifest_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let bad_dir = tmp.path().join("broken-driver");
    fs::create_dir_all(&bad_dir).unwrap();
    write_manifest(&bad_dir, "not json");

    let good_dir = tmp.path().join("good-driver");
    fs::create_dir_all(&good_dir).unwrap();
    write_manifest(&good_dir, r#"{"name": "Good", "executable": "index.js"}"#);

    let registry = Registry::new();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();

    let ids = registry.list().await;
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].as_str(), "good-driver");
}

#[tokio::test]
async fn empty_catalog_is_legal() {
    let tmp = TempDir::new().unwrap();
    let registry = Registry::new();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();
    assert!(registry.list().await.is_empty());
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let driver_dir = tmp.path().join("echo-driver");
    fs::create_dir_all(&driver_dir).unwrap();
    write_manifest(&driver_dir, r#"{"name": "Echo", "executable": "index.js"}"#);

    let registry = Registry::new();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();
    assert_eq!(registry.list().await.len(), 1);
}

#[tokio::test]
async fn executable_resolution_falls_back_to_index_js() {
    let tmp = TempDir::new().unwrap();
    let driver_dir = tmp.path().join("weird-driver");
    fs::create_dir_all(&driver_dir).unwrap();
    write_manifest(&driver_dir, r#"{"name": "Weird", "executable": "missing.js"}"#);
    fs::write(driver_dir.join("index.js"), "").unwrap();

    let registry = Registry::new();
    registry.initialize(&[tmp.path().to_path_buf()]).await.unwrap();
    let ids = registry.list().await;
    let meta = registry.get(&ids[0]).await.unwrap();
    assert_eq!(meta.executable, Path::new("index.js"));
}

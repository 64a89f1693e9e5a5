// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tempfile::TempDir;

use super::*;

fn write_feature(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("run.feature");
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn unmatched_step_halts_the_scenario_but_not_the_feature() {
    let dir = TempDir::new().unwrap();
    let path = write_feature(
        &dir,
        r#"
Feature: Unmatched

Scenario: First
  Given I do something unknown
  When this second step never runs

Scenario: Second
  Given I also do something unknown
"#,
    );

    let mut config = HostConfig::default();
    config.driver_dir = Some(dir.path().to_path_buf());
    let mut engine = Engine::new(config);
    engine.initialize().await.unwrap();

    let results = engine.run_feature(&path).await.unwrap();

    // Scenario one halts after its first (failing) step; scenario two still runs its own step.
    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert!(results[0].error.as_ref().unwrap().message.contains("unmatched step"));
    assert!(!results[1].success);
}

#[tokio::test]
async fn tag_filter_excludes_non_matching_scenarios() {
    let dir = TempDir::new().unwrap();
    let path = write_feature(
        &dir,
        r#"
Feature: Tagged

@smoke
Scenario: Included
  Given I do something unknown

Scenario: Excluded
  Given I do something else unknown
"#,
    );

    let mut config = HostConfig::default();
    config.driver_dir = Some(dir.path().to_path_buf());
    config.tags = vec!["smoke".to_string()];
    let mut engine = Engine::new(config);
    engine.initialize().await.unwrap();

    let results = engine.run_feature(&path).await.unwrap();
    assert_eq!(results.len(), 1);
}

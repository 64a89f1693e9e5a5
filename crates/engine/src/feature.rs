// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gherkin-subset feature file parser: Feature/Background/Scenario and
//! Given/When/Then/And/But steps, plus `@tag` lines.

/// One step line, keyword stripped, with its source line number for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLine {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    pub steps: Vec<StepLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureAst {
    pub name: String,
    pub scenarios: Vec<Scenario>,
}

const STEP_KEYWORDS: &[&str] = &["Given ", "When ", "Then ", "And ", "But "];

fn strip_step_keyword(line: &str) -> Option<&str> {
    STEP_KEYWORDS.iter().find_map(|kw| line.strip_prefix(kw))
}

/// Parse a feature file's contents. Background steps (if any) are prepended
/// to every scenario's step list. Malformed or unrecognized lines outside a
/// comment are ignored rather than treated as a hard parse error — the
/// format is deliberately forgiving.
pub fn parse(contents: &str) -> FeatureAst {
    let mut feature = FeatureAst::default();
    let mut background: Vec<StepLine> = Vec::new();
    let mut pending_tags: Vec<String> = Vec::new();
    let mut current: Option<Scenario> = None;
    let mut in_background = false;

    for (idx, raw_line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Feature:") {
            feature.name = rest.trim().to_string();
            continue;
        }

        if line.starts_with("Background:") {
            in_background = true;
            if let Some(scenario) = current.take() {
                feature.scenarios.push(scenario);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("Scenario:").or_else(|| line.strip_prefix("Scenario Outline:"))
        {
            in_background = false;
            if let Some(scenario) = current.take() {
                feature.scenarios.push(scenario);
            }
            current = Some(Scenario {
                name: rest.trim().to_string(),
                tags: std::mem::take(&mut pending_tags),
                steps: background.clone(),
            });
            continue;
        }

        if line.starts_with('@') {
            pending_tags.extend(line.split_whitespace().map(|t| t.trim_start_matches('@').to_string()));
            continue;
        }

        if let Some(text) = strip_step_keyword(line) {
            let step = StepLine { text: text.trim().to_string(), line: line_no };
            if in_background {
                background.push(step);
            } else if let Some(scenario) = current.as_mut() {
                scenario.steps.push(step);
            }
            continue;
        }
    }

    if let Some(scenario) = current.take() {
        feature.scenarios.push(scenario);
    }

    feature
}

/// True if `scenario` should run given a comma-separated tag filter.
/// An empty filter always matches. A scenario matches if any of its tags
/// appears in the filter list.
pub fn matches_tags(scenario: &Scenario, filter: &[String]) -> bool {
    if filter.is_empty() {
        return true;
    }
    scenario.tags.iter().any(|t| filter.contains(t))
}

#[cfg(test)]
#[path = "feature_tests.rs"]
mod tests;

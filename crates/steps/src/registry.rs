// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregates step patterns contributed by every driver and resolves free
//! text step lines against them.

use drover_core::{DriverId, UnmatchedStep};
use drover_wire::StepDefinition;
use parking_lot::RwLock;
use regex::Regex;

use crate::levenshtein;
use crate::pattern;

struct CompiledStep {
    driver_id: DriverId,
    definition: StepDefinition,
    regex: Regex,
}

/// Populated from static manifests at startup, then augmented in place as
/// drivers are lazily started and introspected over the lifetime of a run —
/// `register_driver` takes `&self` so concurrent scenario dispatch can grow
/// it without a `&mut Engine`.
#[derive(Default)]
pub struct StepRegistry {
    steps: RwLock<Vec<CompiledStep>>,
}

/// A step text resolved to the driver that should execute it.
pub struct Match {
    pub driver_id: DriverId,
    pub action: String,
    pub args: Vec<String>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every step a driver contributed, in the order it reported
    /// them. A `(driver_id, pattern)` pair already present is skipped, so
    /// lazily re-registering a driver's introspected steps on top of its
    /// static manifest steps never duplicates a pattern. Registration order
    /// across drivers affects first-wins matching, but callers racing each
    /// other here (concurrent scenario dispatch) are registering disjoint
    /// drivers in practice.
    pub fn register_driver(&self, driver_id: DriverId, steps: Vec<StepDefinition>) {
        let mut guard = self.steps.write();
        for definition in steps {
            if guard.iter().any(|s| s.driver_id == driver_id && s.definition.pattern == definition.pattern) {
                continue;
            }
            match pattern::compile(&definition.pattern) {
                Ok(regex) => {
                    guard.push(CompiledStep { driver_id: driver_id.clone(), definition, regex })
                }
                Err(e) => {
                    tracing::warn!(
                        %driver_id,
                        pattern = %definition.pattern,
                        error = %e,
                        "step pattern failed to compile, skipping"
                    );
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.steps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.read().is_empty()
    }

    /// Resolve `text` against every registered pattern in registration
    /// order, returning the first match. Additional matches are logged as
    /// warnings, never as an error — first-wins is the contract.
    pub fn resolve(&self, text: &str) -> Result<Match, UnmatchedStep> {
        let guard = self.steps.read();
        let mut found: Option<Match> = None;
        let mut extra_matches = 0usize;

        for step in guard.iter() {
            if let Some(caps) = step.regex.captures(text) {
                if found.is_none() {
                    let args = caps
                        .iter()
                        .skip(1)
                        .filter_map(|m| m.map(|m| m.as_str().to_string()))
                        .collect();
                    found = Some(Match {
                        driver_id: step.driver_id.clone(),
                        action: step.definition.action.clone(),
                        args,
                    });
                } else {
                    extra_matches += 1;
                }
            }
        }

        if extra_matches > 0 {
            tracing::warn!(step = %text, extra_matches, "step text matched more than one pattern, first-wins");
        }

        match found {
            Some(m) => Ok(m),
            None => Err(self.unmatched(text, &guard)),
        }
    }

    fn unmatched(&self, text: &str, guard: &[CompiledStep]) -> UnmatchedStep {
        let did_you_mean = guard
            .iter()
            .map(|step| {
                let literal = pattern::literal_text(&step.definition.pattern);
                (levenshtein::distance(text, &literal), step.definition.pattern.clone())
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, pattern)| pattern);

        UnmatchedStep { step: text.to_string(), did_you_mean }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A step pattern contributed by a driver, either statically in its manifest
//! or dynamically via `introspect("steps")`.

use serde::{Deserialize, Serialize};

/// `{id, pattern, action, description?, parameters?, examples?}` per the wire schema.
/// Compiled into an anchored regex by `drover-steps`; this type only carries the
/// wire shape, not the compiled form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDefinition {
    pub id: String,
    pub pattern: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

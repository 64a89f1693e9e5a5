// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writes the three run artifacts: a machine-readable JSON report, a
//! human-readable HTML rendering, and a one-page stdout summary.

use std::path::Path;

use drover_wire::Report;

/// Write `<path>.json` and `<path>.html` next to each other, and log the
/// one-page summary. `path` is the base path with no extension; if it
/// already carries one it is stripped first.
pub fn write_artifacts(report: &Report, path: &Path) -> std::io::Result<()> {
    let base = path.with_extension("");
    let json_path = base.with_extension("json");
    let html_path = base.with_extension("html");

    std::fs::write(&json_path, serde_json::to_string_pretty(report).expect("Report always serializes"))?;
    std::fs::write(&html_path, render_html(report))?;
    Ok(())
}

/// A one-page text summary, suitable for printing straight to stdout.
pub fn stdout_summary(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Run finished in {}ms: {} total, {} passed, {} failed\n",
        report.duration_ms, report.summary.total, report.summary.passed, report.summary.failed
    ));
    for result in &report.results {
        let mark = if result.success { "PASS" } else { "FAIL" };
        out.push_str(&format!("  [{mark}] {} ({}ms)\n", result.step, result.duration_ms));
        if let Some(error) = &result.error {
            out.push_str(&format!("        {}\n", error.message));
        }
    }
    out
}

fn render_html(report: &Report) -> String {
    let mut rows = String::new();
    for result in &report.results {
        let status_class = if result.success { "pass" } else { "fail" };
        let status_text = if result.success { "PASS" } else { "FAIL" };
        let error = result.error.as_ref().map(|e| html_escape(&e.message)).unwrap_or_default();
        rows.push_str(&format!(
            "<tr class=\"{status_class}\"><td>{}</td><td>{status_text}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&result.step),
            result.duration_ms,
            error,
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Run report</title>\n<style>\n\
         body {{ font-family: sans-serif; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         td, th {{ border: 1px solid #ccc; padding: 4px 8px; text-align: left; }}\n\
         tr.fail {{ background: #fdd; }}\n\
         tr.pass {{ background: #dfd; }}\n\
         </style></head><body>\n\
         <h1>Run report</h1>\n\
         <p>{} total, {} passed, {} failed, {}ms</p>\n\
         <table><thead><tr><th>Step</th><th>Status</th><th>Duration (ms)</th><th>Error</th></tr></thead>\n\
         <tbody>\n{rows}</tbody></table>\n\
         </body></html>\n",
        report.summary.total, report.summary.passed, report.summary.failed, report.duration_ms,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

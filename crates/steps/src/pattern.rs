// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiles a step pattern string into an anchored regex.
//!
//! Patterns use `(...)` to mark capture groups, e.g. `I open the browser at
//! "(.*)"`. Every parenthesized substring is rewritten to a non-greedy
//! `(.+?)` group; everything else is escaped so literal regex metacharacters
//! in step text (`.`, `?`, `[`, ...) aren't treated specially.

use regex::Regex;

/// Compile `pattern` into a regex anchored with `^...$`.
///
/// One escape pass over literal text, capture groups substituted in a
/// second pass.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    let mut compiled = String::from("^");
    let mut chars = pattern.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c == '(' {
            compiled.push_str(&regex::escape(&literal));
            literal.clear();
            // consume up to the matching close paren, discarding its contents
            let mut depth = 1;
            for inner in chars.by_ref() {
                if inner == '(' {
                    depth += 1;
                } else if inner == ')' {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            compiled.push_str("(.+?)");
        } else {
            literal.push(c);
        }
    }
    compiled.push_str(&regex::escape(&literal));
    compiled.push('$');

    Regex::new(&compiled)
}

/// The literal (non-capture-group) portion of a pattern, used for
/// "did you mean" distance scoring against unmatched step text.
pub fn literal_text(pattern: &str) -> String {
    let mut out = String::new();
    let mut depth = 0;
    for c in pattern.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

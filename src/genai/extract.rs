// src/genai/extract.rs
//! Best-effort recovery of a JSON value embedded in free-form generated text.
//!
//! Generated output is not guaranteed well-formed: it may be fenced, wrapped
//! in prose, truncated, or contain several candidate objects. Recovery order:
//! fence strip → direct parse → balanced-brace scan. Never fails; unusable
//! text yields `None`.

use serde_json::Value;

pub fn extract_json(text: &str) -> Option<Value> {
    let unfenced = strip_code_fence(text);
    if let Ok(v) = serde_json::from_str::<Value>(unfenced.trim()) {
        return Some(v);
    }
    // The scanner treats fences and prose as noise, so scan the raw text.
    scan_balanced_object(text)
}

/// Remove an optional markdown fence (```json / ```), keeping only the fenced
/// body. Text without a leading fence is returned unchanged.
fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    if !t.starts_with("```") {
        return t;
    }
    let body = match t.find('\n') {
        Some(i) => &t[i + 1..],
        None => return t,
    };
    match body.find("```") {
        Some(i) => &body[..i],
        None => body,
    }
}

/// Scan for the first balanced top-level object that parses as JSON. The scan
/// is quote-aware: braces inside string literals do not affect depth. A
/// candidate that fails to parse resets the start marker and the scan
/// continues, so prose or broken objects before the real payload are skipped.
fn scan_balanced_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start: Option<usize> = None;
    let mut depth = 0i32;
    let mut in_str = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_str {
            if escape {
                escape = false;
            } else if b == b'\\' {
                escape = true;
            } else if b == b'"' {
                in_str = false;
            }
            continue;
        }
        match b {
            // Quotes only matter inside a candidate object; unbalanced quotes
            // in surrounding prose must not swallow the payload.
            b'"' if start.is_some() => in_str = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                    depth = 0;
                }
                depth += 1;
            }
            b'}' if start.is_some() => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start.unwrap()..=i];
                    if let Ok(v) = serde_json::from_str::<Value>(candidate) {
                        return Some(v);
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }
    None
}

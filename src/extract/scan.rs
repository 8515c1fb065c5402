//! Schema-agnostic traversal of arbitrary JSON payloads.
//!
//! Walks a payload once, collecting objects that may hold a review and
//! string values that look like links to the next page of results.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::utils::is_absolute_http;

/// Key fragments that mark an object as possibly review-shaped.
const REVIEW_KEY_HINTS: [&str; 4] = ["review", "rating", "comment", "feedback"];

/// Query fragments that mark a URL as a pagination link.
const PAGINATION_HINTS: [&str; 3] = ["page=", "offset=", "cursor="];

/// Everything found in one payload.
#[derive(Debug, Default)]
pub struct ScanResult<'a> {
    /// Objects worth handing to the normalizer, in document order
    pub candidates: Vec<&'a Value>,
    /// Distinct pagination URLs, in document order
    pub next_urls: Vec<String>,
}

/// Whether any key of `map` hints at review content.
pub fn looks_like_review(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| {
        let key = key.to_ascii_lowercase();
        REVIEW_KEY_HINTS.iter().any(|hint| key.contains(hint))
    })
}

/// Whether the string entry `key: value` looks like a next-page link.
pub fn looks_like_next_page(key: &str, value: &str) -> bool {
    is_absolute_http(value)
        && (PAGINATION_HINTS.iter().any(|hint| value.contains(hint))
            || key.to_ascii_lowercase().contains("next"))
}

/// Scan `root` for review candidates and pagination URLs.
///
/// Iterative, with a visited set keyed by node identity, so every composite
/// node is handled at most once and depth never touches the call stack.
/// Elements of arrays are always candidates; other objects only when
/// [`looks_like_review`] holds. Traversal continues below matched nodes.
pub fn scan(root: &Value) -> ScanResult<'_> {
    let mut result = ScanResult::default();
    let mut visited: HashSet<*const Value> = HashSet::new();
    let mut emitted: HashSet<*const Value> = HashSet::new();
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&Value> = vec![root];

    while let Some(node) = stack.pop() {
        if !(node.is_array() || node.is_object()) {
            continue;
        }
        if !visited.insert(node as *const Value) {
            continue;
        }

        match node {
            Value::Array(items) => {
                for item in items.iter().filter(|item| item.is_object()) {
                    emit(item, &mut emitted, &mut result.candidates);
                }
                stack.extend(items.iter().rev());
            }
            Value::Object(map) => {
                if looks_like_review(map) {
                    emit(node, &mut emitted, &mut result.candidates);
                }
                for (key, value) in map {
                    if let Value::String(s) = value {
                        if looks_like_next_page(key, s) && seen_urls.insert(s.as_str()) {
                            result.next_urls.push(s.clone());
                        }
                    }
                }
                stack.extend(map.values().rev());
            }
            _ => {}
        }
    }

    result
}

fn emit<'a>(node: &'a Value, emitted: &mut HashSet<*const Value>, out: &mut Vec<&'a Value>) {
    if emitted.insert(node as *const Value) {
        out.push(node);
    }
}

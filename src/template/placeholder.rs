use serde_json::Value;

const PREFIX: &str = "${";

/// A `${name}` or `${name:default}` token located in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placeholder<'a> {
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset one past the closing brace.
    pub end: usize,
    pub name: &'a str,
    pub default: Option<&'a str>,
}

impl Placeholder<'_> {
    pub fn spans(&self, text: &str) -> bool {
        self.start == 0 && self.end == text.len()
    }
}

/// Finds every placeholder in `text`, left to right. Braces nested inside a
/// placeholder body are balanced before the closing brace is accepted.
pub(crate) fn scan(text: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(offset) = text[from..].find(PREFIX) {
        let start = from + offset;
        let body_start = start + PREFIX.len();
        let Some(close) = closing_brace(text, body_start) else {
            break;
        };
        let body = &text[body_start..close];
        let (name, default) = match body.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };
        found.push(Placeholder {
            start,
            end: close + 1,
            name,
            default,
        });
        from = close + 1;
    }
    found
}

fn closing_brace(text: &str, body_start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[body_start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            '}' => return Some(body_start + i),
            _ => {}
        }
    }
    None
}

/// True when `text` contains a `${...}` token.
pub fn is_templated(text: &str) -> bool {
    !scan(text).is_empty()
}

/// True when any string in the document still carries a `${...}` token.
pub fn has_unresolved(value: &Value) -> bool {
    match value {
        Value::String(s) => is_templated(s),
        Value::Array(items) => items.iter().any(has_unresolved),
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| is_templated(k) || has_unresolved(v)),
        _ => false,
    }
}

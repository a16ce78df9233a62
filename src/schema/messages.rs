use itertools::Itertools;
use jsonschema::Validator;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;

/// Converts a JSON pointer (`/a/0/b`) into the `$.a[0].b` form operators see.
pub(crate) fn json_path(pointer: &str) -> String {
    let mut path = String::from("$");
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(&segment);
        }
    }
    path
}

fn child(path: &str, name: &str) -> String {
    format!("{path}.{name}")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strings that read as the expected primitive pass when validation is type-loose.
fn loosely_matches(instance: &Value, expected: &str) -> bool {
    match (expected, instance) {
        ("integer", Value::String(s)) => s.trim().parse::<i64>().is_ok(),
        ("number", Value::String(s)) => s.trim().parse::<f64>().is_ok(),
        ("boolean", Value::String(s)) => matches!(s.trim(), "true" | "false"),
        _ => false,
    }
}

fn enumeration(options: &Value) -> String {
    match options {
        Value::Array(items) => format!(
            "[{}]",
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .join(", ")
        ),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn within(path: &str, scope: &str) -> bool {
    path.strip_prefix(scope)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('[') || rest.starts_with('.'))
}

/// Validates `instance` and renders one message per violation, ordered by path.
pub(crate) fn violations(validator: &Validator, instance: &Value, type_loose: bool) -> Vec<String> {
    let mut found = collect(validator, instance, type_loose);
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.into_iter().map(|(_, message)| message).collect()
}

/// A single value where an array is expected is checked as a one element array,
/// so the array's `items` rules still apply to it.
fn as_single_item(
    validator: &Validator,
    instance: &Value,
    pointer: &str,
    type_loose: bool,
) -> Vec<(String, String)> {
    let mut wrapped = instance.clone();
    let Some(slot) = wrapped.pointer_mut(pointer) else {
        return Vec::new();
    };
    *slot = Value::Array(vec![slot.take()]);
    let scope = json_path(pointer);
    collect(validator, &wrapped, type_loose)
        .into_iter()
        .filter(|(path, _)| within(path, &scope))
        .collect()
}

fn collect(validator: &Validator, instance: &Value, type_loose: bool) -> Vec<(String, String)> {
    let mut found: Vec<(String, String)> = Vec::new();
    for error in validator.iter_errors(instance) {
        let pointer = error.instance_path.to_string();
        let path = json_path(&pointer);
        match &error.kind {
            ValidationErrorKind::Type { kind } => {
                let expected = match kind {
                    TypeKind::Single(expected) => expected.to_string(),
                    TypeKind::Multiple(_) => {
                        found.push((path.clone(), format!("{path}: {error}")));
                        continue;
                    }
                };
                if type_loose && expected == "array" && is_scalar(&error.instance) {
                    found.extend(as_single_item(validator, instance, &pointer, type_loose));
                    continue;
                }
                if type_loose && loosely_matches(&error.instance, &expected) {
                    continue;
                }
                let message = format!(
                    "{path}: {} found, {expected} expected",
                    json_type(&error.instance)
                );
                found.push((path, message));
            }
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                let path = child(&path, &name);
                let message = format!("{path}: is missing but it is required");
                found.push((path, message));
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                for name in unexpected {
                    let path = child(&path, name);
                    let message = format!(
                        "{path}: is not defined in the schema and the schema does not allow additional properties"
                    );
                    found.push((path, message));
                }
            }
            ValidationErrorKind::Enum { options } => {
                let message = format!(
                    "{path}: does not have a value in the enumeration {}",
                    enumeration(options)
                );
                found.push((path, message));
            }
            ValidationErrorKind::Minimum { limit, .. } => {
                let message = format!("{path}: must have a minimum value of {limit}");
                found.push((path, message));
            }
            ValidationErrorKind::Maximum { limit, .. } => {
                let message = format!("{path}: must have a maximum value of {limit}");
                found.push((path, message));
            }
            ValidationErrorKind::MinLength { limit, .. } => {
                let message = format!("{path}: must be at least {limit} characters long");
                found.push((path, message));
            }
            ValidationErrorKind::MaxLength { limit, .. } => {
                let message = format!("{path}: may only be {limit} characters long");
                found.push((path, message));
            }
            ValidationErrorKind::Pattern { pattern, .. } => {
                let message = format!("{path}: does not match the regex pattern {pattern}");
                found.push((path, message));
            }
            ValidationErrorKind::MinItems { limit, .. } => {
                let message =
                    format!("{path}: there must be a minimum of {limit} items in the array");
                found.push((path, message));
            }
            ValidationErrorKind::MaxItems { limit, .. } => {
                let message =
                    format!("{path}: there must be a maximum of {limit} items in the array");
                found.push((path, message));
            }
            ValidationErrorKind::UniqueItems => {
                found.push((path.clone(), format!("{path}: the items in the array must be unique")));
            }
            _ => {
                found.push((path.clone(), format!("{path}: {error}")));
            }
        }
    }
    found
}

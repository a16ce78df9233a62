use serde::{Deserialize, Serialize};

/// Text substituted for the value of a masked variable wherever it is shown to operators.
pub const MASKED_VALUE: &str = "********";

/// The declared type of a template variable. Controls how its raw text is
/// converted when it is substituted into a plan document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableDataType {
    #[default]
    String,
    Number,
    Boolean,
    List,
    Map,
}

impl VariableDataType {
    /// Normalizes raw text for inline substitution. Only booleans are rewritten.
    pub fn format_text(&self, raw: &str) -> String {
        match self {
            VariableDataType::Boolean => raw.trim().to_lowercase(),
            _ => raw.to_string(),
        }
    }

    /// Checks that a raw value can be converted to this type.
    pub fn validate_value(&self, raw: &str) -> Result<(), String> {
        match self {
            VariableDataType::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "false" => Ok(()),
                _ => Err("A boolean value must be true or false".to_string()),
            },
            VariableDataType::Number => raw
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| format!("The value {} cannot be converted to a number", raw)),
            VariableDataType::Map => match parse_map(raw) {
                // Text that is not blank must yield at least one entry.
                Ok(entries)
                    if !entries.is_empty() || strip_wrapper(raw, '{', '}').trim().is_empty() =>
                {
                    Ok(())
                }
                _ => Err(
                    "A map value must be of the form of 'key: value, nextKey: nextValue'"
                        .to_string(),
                ),
            },
            VariableDataType::String | VariableDataType::List => Ok(()),
        }
    }
}

/// A named, typed value that can be substituted into `${...}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub data_type: VariableDataType,
    #[serde(default)]
    pub masked: bool,
}

impl Variable {
    pub fn new(name: &str, data_type: VariableDataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_default(mut self, default_value: &str) -> Self {
        self.default_value = Some(default_value.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// The explicit value if set, otherwise the default.
    pub fn effective_value(&self) -> Option<&str> {
        self.value.as_deref().or(self.default_value.as_deref())
    }

    /// Returns a copy that is safe to show to operators.
    pub fn mask_if_sensitive(&self) -> Variable {
        if !self.masked {
            return self.clone();
        }
        Variable {
            value: self.value.as_ref().map(|_| MASKED_VALUE.to_string()),
            default_value: self.default_value.as_ref().map(|_| MASKED_VALUE.to_string()),
            ..self.clone()
        }
    }
}

/// Splits `text` on `delimiter`, honoring a backslash as an escape for the delimiter.
fn split_escaped(text: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&delimiter) {
            current.push(delimiter);
            chars.next();
        } else if c == delimiter {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Splits at the first unescaped `delimiter`, unescaping both halves.
fn split_first_escaped(text: &str, delimiter: char) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&delimiter) {
            key.push(delimiter);
            chars.next();
        } else if c == delimiter {
            let rest: String = chars.collect();
            return Some((key, rest.replace(&format!("\\{delimiter}"), &delimiter.to_string())));
        } else {
            key.push(c);
        }
    }
    None
}

fn strip_wrapper(text: &str, open: char, close: char) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(open)
        .and_then(|inner| inner.strip_suffix(close))
        .unwrap_or(trimmed)
}

/// Parses the text of a LIST variable. Elements are trimmed; empty source text
/// yields an empty list.
pub fn parse_list(raw: &str) -> Vec<String> {
    let inner = strip_wrapper(raw, '[', ']');
    if inner.trim().is_empty() {
        return Vec::new();
    }
    split_escaped(inner, ',')
        .into_iter()
        .map(|element| element.trim().to_string())
        .collect()
}

/// Parses the text of a MAP variable into ordered key/value pairs. Each entry is split
/// on its first colon. Returns the offending entry when one has no colon.
pub fn parse_map(raw: &str) -> Result<Vec<(String, String)>, String> {
    let inner = strip_wrapper(raw, '{', '}');
    let mut entries = Vec::new();
    for entry in split_escaped(inner, ',') {
        if entry.trim().is_empty() {
            continue;
        }
        let (key, value) =
            split_first_escaped(&entry, ':').ok_or_else(|| entry.trim().to_string())?;
        entries.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(entries)
}

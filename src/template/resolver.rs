use super::placeholder::{Placeholder, scan};
use crate::types::{
    FlowConfigError, FlowErrorType, MASKED_VALUE, Variable, VariableDataType, parse_list,
    parse_map,
};
use ahash::AHashMap;
use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::trace;

/// What a single node of the document turned into. A whole-value LIST placeholder
/// expands to several elements, which the enclosing sequence splices in.
enum Resolved {
    Value(Value),
    Splice(Vec<Value>),
}

/// How entries that resolve to blank text are treated inside a map.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Blanks {
    Drop,
    Keep,
}

impl Resolved {
    fn into_value(self) -> Value {
        match self {
            Resolved::Value(v) => v,
            Resolved::Splice(items) => Value::Array(items),
        }
    }
}

/// Substitutes variable placeholders throughout a document.
///
/// One resolver owns the error list for one resolution pass. Errors are recorded
/// against the configuration named by [`TemplateResolver::in_config`] and any string
/// that fails to resolve is left exactly as written.
pub struct TemplateResolver<'v> {
    variables: AHashMap<&'v str, &'v Variable>,
    masked: bool,
    config_name: String,
    errors: Vec<FlowConfigError>,
    applied: Vec<&'v Variable>,
}

impl<'v> TemplateResolver<'v> {
    pub fn new(variables: &'v [Variable]) -> Self {
        let mut lookup = AHashMap::with_capacity(variables.len());
        for variable in variables {
            lookup.entry(variable.name.as_str()).or_insert(variable);
        }
        Self {
            variables: lookup,
            masked: false,
            config_name: String::new(),
            errors: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Substitutes masked variables with a mask instead of their value.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Names the configuration that subsequent errors are reported against.
    pub fn in_config(&mut self, config_name: &str) -> &mut Self {
        self.config_name = config_name.to_string();
        self
    }

    pub fn resolve(&mut self, document: &Value) -> Value {
        self.resolve_node(document, Blanks::Drop).into_value()
    }

    /// Resolves an action parameter map. Entries whose key or value resolves to
    /// nothing or to blank text are left out.
    pub fn resolve_map(&mut self, map: &Map<String, Value>) -> Map<String, Value> {
        self.resolve_object(map, Blanks::Drop)
    }

    /// Resolves plan fields. Blank keys and values written in the plan are kept so
    /// they can still be reported; only entries whose placeholder resolved to an
    /// absent optional value are left out.
    pub fn resolve_fields(&mut self, map: &Map<String, Value>) -> Map<String, Value> {
        self.resolve_object(map, Blanks::Keep)
    }

    /// Resolves a standalone string as text. LIST and MAP values are substituted
    /// as their raw text; an absent optional value yields `None`.
    pub fn resolve_text(&mut self, text: &str) -> Option<String> {
        let placeholders = scan(text);
        if placeholders.is_empty() {
            return Some(text.to_string());
        }
        if let [only] = placeholders.as_slice()
            && only.spans(text)
        {
            return match self.lookup(only, text) {
                Err(()) => Some(text.to_string()),
                Ok(None) => None,
                Ok(Some((raw, data_type))) => Some(data_type.format_text(&raw)),
            };
        }
        self.interpolate(&placeholders, text)
            .as_str()
            .map(str::to_string)
    }

    /// Errors recorded so far, de-duplicated in first-seen order.
    pub fn errors(&self) -> Vec<FlowConfigError> {
        self.errors.iter().unique().cloned().collect()
    }

    /// The variables this resolver substituted, masked where sensitive.
    pub fn applied_variables(&self) -> Vec<Variable> {
        self.applied
            .iter()
            .map(|variable| variable.mask_if_sensitive())
            .collect()
    }

    fn resolve_object(&mut self, map: &Map<String, Value>, blanks: Blanks) -> Map<String, Value> {
        let mut resolved = Map::new();
        for (key, value) in map {
            let key = match self.resolve_string(key) {
                Resolved::Value(Value::Null) => continue,
                Resolved::Value(Value::String(k)) if blanks == Blanks::Keep || !k.trim().is_empty() => k,
                Resolved::Value(Value::String(_)) => continue,
                _ => key.clone(),
            };
            match self.resolve_node(value, blanks) {
                Resolved::Value(Value::Null) => {}
                Resolved::Value(Value::String(s)) if blanks == Blanks::Drop && s.is_empty() => {}
                other => {
                    resolved.insert(key, other.into_value());
                }
            }
        }
        resolved
    }

    fn resolve_node(&mut self, value: &Value, blanks: Blanks) -> Resolved {
        match value {
            Value::String(s) => self.resolve_string(s),
            Value::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    match self.resolve_node(item, blanks) {
                        // An absent optional value leaves no element behind.
                        Resolved::Value(Value::Null) if item.is_string() => {}
                        Resolved::Value(v) => resolved.push(v),
                        Resolved::Splice(spliced) => resolved.extend(spliced),
                    }
                }
                Resolved::Value(Value::Array(resolved))
            }
            Value::Object(map) => Resolved::Value(Value::Object(self.resolve_object(map, blanks))),
            other => Resolved::Value(other.clone()),
        }
    }

    fn resolve_string(&mut self, text: &str) -> Resolved {
        let placeholders = scan(text);
        match placeholders.as_slice() {
            [] => Resolved::Value(Value::String(text.to_string())),
            [only] if only.spans(text) => self.resolve_whole(only, text),
            _ => Resolved::Value(self.interpolate(&placeholders, text)),
        }
    }

    /// A placeholder that is the entire string takes on its variable's type.
    fn resolve_whole(&mut self, placeholder: &Placeholder<'_>, text: &str) -> Resolved {
        let (raw, data_type) = match self.lookup(placeholder, text) {
            Err(()) => return Resolved::Value(Value::String(text.to_string())),
            Ok(None) => return Resolved::Value(Value::Null),
            Ok(Some(found)) => found,
        };
        match data_type {
            VariableDataType::List => Resolved::Splice(
                parse_list(&raw).into_iter().map(Value::String).collect(),
            ),
            VariableDataType::Map => match parse_map(&raw) {
                Ok(entries) => Resolved::Value(Value::Object(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, Value::String(v)))
                        .collect(),
                )),
                Err(entry) => {
                    self.record(format!(
                        "Variable named: {} has a map entry '{}' without a ':' used in value \"{}\"",
                        placeholder.name, entry, text
                    ));
                    Resolved::Value(Value::String(text.to_string()))
                }
            },
            _ => Resolved::Value(Value::String(data_type.format_text(&raw))),
        }
    }

    /// Substitutes every placeholder in place as text. Any failure keeps the original string.
    fn interpolate(&mut self, placeholders: &[Placeholder<'_>], text: &str) -> Value {
        let mut result = String::with_capacity(text.len());
        let mut failed = false;
        let mut last = 0;
        for placeholder in placeholders {
            result.push_str(&text[last..placeholder.start]);
            match self.lookup(placeholder, text) {
                Err(()) => failed = true,
                Ok(None) => {}
                Ok(Some((raw, data_type))) => result.push_str(&data_type.format_text(&raw)),
            }
            last = placeholder.end;
        }
        result.push_str(&text[last..]);
        if failed {
            Value::String(text.to_string())
        } else {
            Value::String(result)
        }
    }

    /// Finds the raw text for a placeholder. `Err` means an error was recorded;
    /// `Ok(None)` means an optional variable has no value.
    fn lookup(
        &mut self,
        placeholder: &Placeholder<'_>,
        text: &str,
    ) -> Result<Option<(String, VariableDataType)>, ()> {
        let Some(variable) = self.variables.get(placeholder.name).copied() else {
            if let Some(default) = placeholder.default {
                return Ok(Some((default.to_string(), VariableDataType::String)));
            }
            self.record(format!(
                "Could not find a variable named '{}' used in value \"{}\"",
                placeholder.name, text
            ));
            return Err(());
        };

        if !self.applied.iter().any(|applied| applied.name == variable.name) {
            self.applied.push(variable);
        }

        let raw = match variable.effective_value() {
            Some(_) if self.masked && variable.masked => Some(MASKED_VALUE),
            Some(value) => Some(value),
            None => placeholder.default,
        };
        match raw {
            Some(raw) => {
                trace!(placeholder = placeholder.name, "resolved placeholder");
                Ok(Some((raw.to_string(), variable.data_type)))
            }
            None if variable.required => {
                self.record(format!(
                    "Found required variable {} without a value set",
                    variable.name
                ));
                Err(())
            }
            None => Ok(None),
        }
    }

    fn record(&mut self, message: String) {
        self.errors.push(FlowConfigError::new(
            &self.config_name,
            FlowErrorType::UnresolvedVariable,
            message,
        ));
    }
}

/// Resolves every placeholder in `document` against `variables` in a single pass.
pub fn resolve(document: &Value, variables: &[Variable]) -> (Value, Vec<FlowConfigError>) {
    let mut resolver = TemplateResolver::new(variables);
    let resolved = resolver.resolve(document);
    (resolved, resolver.errors())
}

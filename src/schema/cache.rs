use crate::error::SchemaError;
use ahash::{AHashMap, RandomState};
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A compiled validator and the fingerprint of the schema text it was built from.
type Entry = (u64, Arc<Validator>);

/// Compiled validators keyed by action type. A plugin publishing a new schema
/// version replaces the validator held for that type.
pub(crate) struct SchemaCache {
    validators: RwLock<AHashMap<String, Entry>>,
    hasher: RandomState,
    reject_additional_properties: bool,
}

impl SchemaCache {
    pub fn new(reject_additional_properties: bool) -> Self {
        Self {
            validators: RwLock::new(AHashMap::new()),
            hasher: RandomState::new(),
            reject_additional_properties,
        }
    }

    pub fn get_or_compile(
        &self,
        type_name: &str,
        schema: &Value,
    ) -> Result<Arc<Validator>, SchemaError> {
        let fingerprint = self.hasher.hash_one(schema.to_string());
        {
            let validators = self
                .validators
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some((held, validator)) = validators.get(type_name)
                && *held == fingerprint
            {
                return Ok(Arc::clone(validator));
            }
        }

        debug!(action_type = type_name, "compiling parameter schema");
        let prepared = self.prepare(schema);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft201909)
            .build(&prepared)
            .map_err(|e| SchemaError::Invalid {
                type_name: type_name.to_string(),
                detail: e.to_string(),
            })?;
        let validator = Arc::new(validator);

        let mut validators = self
            .validators
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match validators.get(type_name) {
            Some((held, existing)) if *held == fingerprint => Ok(Arc::clone(existing)),
            _ => {
                validators.insert(type_name.to_string(), (fingerprint, Arc::clone(&validator)));
                Ok(validator)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.validators
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Object schemas that list `properties` but say nothing about additional
    /// properties are closed when strict rejection is enabled.
    fn prepare(&self, schema: &Value) -> Value {
        let mut prepared = schema.clone();
        if self.reject_additional_properties
            && let Value::Object(root) = &mut prepared
            && root.contains_key("properties")
            && !root.contains_key("additionalProperties")
        {
            root.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        prepared
    }
}

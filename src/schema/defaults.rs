use serde_json::{Map, Value};

/// Fills `default` values declared under the schema's `properties` into parameters
/// that were not supplied, descending into nested object parameters.
pub(crate) fn apply_defaults(schema: &Value, parameters: &mut Map<String, Value>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    for (name, property) in properties {
        match parameters.get_mut(name) {
            None => {
                if let Some(default) = property.get("default") {
                    parameters.insert(name.clone(), default.clone());
                }
            }
            Some(Value::Object(nested)) => apply_defaults(property, nested),
            Some(_) => {}
        }
    }
}

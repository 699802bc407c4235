//! `{"components": [...]}` payload decoding and encoding.

use serde_json::{Map, Value};

use crate::{ComponentKind, ComponentModel, Error, Result};

pub const DEFAULT_PAYLOAD_KEY: &str = "components";

/// Parses a payload stored under the default `"components"` key.
pub fn parse_payload(json: &str) -> Result<Vec<ComponentModel>> {
    parse_payload_with_key(json, DEFAULT_PAYLOAD_KEY)
}

pub fn parse_payload_with_key(json: &str, key: &str) -> Result<Vec<ComponentModel>> {
    let value: Value = serde_json::from_str(json)?;
    models_from_value(&value, key, None)
}

pub(crate) fn models_from_json(
    json: &str,
    key: &str,
    default_kind: &ComponentKind,
) -> Result<Vec<ComponentModel>> {
    let value: Value = serde_json::from_str(json)?;
    models_from_value(&value, key, Some(default_kind))
}

/// Decodes the array under `key`.
///
/// Entries without a `kind` get `default_kind` when one is given. Model and item indexes are
/// assigned from array positions.
pub fn models_from_value(
    value: &Value,
    key: &str,
    default_kind: Option<&ComponentKind>,
) -> Result<Vec<ComponentModel>> {
    let Value::Object(object) = value else {
        return Err(Error::invalid_payload("expected a JSON object"));
    };
    let Some(Value::Array(entries)) = object.get(key) else {
        return Err(Error::missing_key(key));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut model: ComponentModel = serde_json::from_value(entry.clone())?;
            if let Some(kind) = default_kind {
                if entry.get("kind").is_none() {
                    model.kind = kind.clone();
                }
            }
            model.index = index;
            model.refresh_indexes();
            Ok(model)
        })
        .collect()
}

/// Encodes `models` under the default `"components"` key.
pub fn to_payload(models: &[ComponentModel]) -> Result<String> {
    to_payload_with_key(models, DEFAULT_PAYLOAD_KEY)
}

pub fn to_payload_with_key(models: &[ComponentModel], key: &str) -> Result<String> {
    let mut object = Map::new();
    object.insert(key.to_owned(), serde_json::to_value(models)?);
    Ok(serde_json::to_string(&Value::Object(object))?)
}

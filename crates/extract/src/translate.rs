use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::schema::{Entity, RawMatch, ServiceResponse};

/// The service has no confidence score, every match is reported as certain.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Convert a NeuralSpace response body into host entities.
///
/// A body without `data.entities` is an error. Offsets are copied as-is.
pub fn translate(response: &Value) -> Result<Vec<Entity>> {
    translate_with(response, false)
}

/// Like [`translate`], optionally replacing each `value` with [`extract_value`].
pub fn translate_with(response: &Value, normalize_values: bool) -> Result<Vec<Entity>> {
    let parsed = ServiceResponse::deserialize(response)
        .context("NeuralSpace response is missing `data.entities`")?;

    Ok(parsed
        .data
        .entities
        .into_iter()
        .map(|raw| to_entity(raw, normalize_values))
        .collect())
}

fn to_entity(raw: RawMatch, normalize_values: bool) -> Entity {
    let value = if normalize_values {
        extract_value(&raw.value)
    } else {
        raw.value.clone()
    };

    Entity {
        start: raw.start_idx,
        end: raw.end_idx,
        // a `body` key wins even when null
        text: match raw.body {
            Some(body) => body,
            None => raw.text,
        },
        value,
        confidence: DEFAULT_CONFIDENCE,
        additional_info: raw.value,
        entity: raw.entity_type,
        extractor: None,
    }
}

/// Flatten a structured value: intervals become `{to, from}`, anything else its inner `value`.
pub fn extract_value(value: &Value) -> Value {
    if value.get("type").and_then(Value::as_str) == Some("interval") {
        let bound = |key: &str| {
            value
                .get(key)
                .and_then(|b| b.get("value"))
                .cloned()
                .unwrap_or(Value::Null)
        };
        json!({ "to": bound("to"), "from": bound("from") })
    } else {
        value.get("value").cloned().unwrap_or(Value::Null)
    }
}

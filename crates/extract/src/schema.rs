use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entity annotation in the host's format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub additional_info: Value,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
}

/// A single match as returned by the NeuralSpace NER endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    pub start_idx: i64,
    pub end_idx: i64,
    /// Outer `None` when the key is absent, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "present")]
    pub body: Option<Option<String>>,
    #[serde(default)]
    pub text: Option<String>,
    pub value: Value,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceData {
    pub entities: Vec<RawMatch>,
}

/// Successful response body: `{"data": {"entities": [...]}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub data: ServiceData,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

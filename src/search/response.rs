//! Search API response as held by the search model

use crate::convert::keys_to_camel;
use crate::error::Result;
use crate::session::IndexDesc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Response metadata
///
/// Fields the model reads are typed, everything else the server sends is kept
/// in `extra` with camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    /// Authoritative index list, including the selection used for this search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<IndexDesc>>,
    /// Zero-based offset of the first result
    #[serde(default, deserialize_with = "count_or_zero")]
    pub results_from: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub page_size: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub max_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_time: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Non-negative integer, 0 for `null` or anything else the server sends
fn count_or_zero<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + Default,
{
    let value = Value::deserialize(deserializer)?;
    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    });
    Ok(count.and_then(|n| T::try_from(n).ok()).unwrap_or_default())
}

/// Search response: metadata plus the list of result hits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub meta: SearchMeta,
    /// Result hits with camelCase keys
    pub results: Vec<Value>,
}

impl SearchResponse {
    /// Decode a snake_case API response
    ///
    /// The hit list may be named `results` or `hits`.
    pub fn from_json(json: &Value) -> Result<Self> {
        let meta = match json.get("meta") {
            Some(meta) if !meta.is_null() => keys_to_camel(meta.clone()),
            _ => Value::Object(Map::new()),
        };
        let mut meta: SearchMeta = serde_json::from_value(meta)?;
        meta.indices = meta.indices.map(IndexDesc::dedup);

        let results = match json.get("results").or_else(|| json.get("hits")) {
            Some(Value::Array(items)) => items.iter().cloned().map(keys_to_camel).collect(),
            _ => Vec::new(),
        };

        Ok(Self { meta, results })
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

//! URL helpers shared by the search model and the CLI

use crate::error::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

/// Query string value, either a single value or a repeated key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// All values as a list; a single value becomes a one-element list
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(v) => vec![v.clone()],
            Self::Many(v) => v.clone(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

/// Characters escaped in a URI component: all but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single query string key or value
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Build a query string from key/value pairs; list values repeat their key
pub fn build_query_string(params: &[(String, QueryValue)]) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        for v in value.to_vec() {
            pairs.push(format!("{}={}", encode_component(key), encode_component(&v)));
        }
    }
    pairs.join("&")
}

/// URL for a new query on the current route
///
/// Other parameters of the current query string are kept. `index` replaces the
/// current index parameter only when given.
pub fn query_url(
    path: &str,
    current: &[(String, QueryValue)],
    query: &str,
    index: Option<QueryValue>,
) -> String {
    let mut params = current.to_vec();
    set_param(&mut params, "q", QueryValue::from(query));
    if let Some(index) = index {
        set_param(&mut params, "index", index);
    }
    format!("{}?{}", path, build_query_string(&params))
}

fn set_param(params: &mut Vec<(String, QueryValue)>, key: &str, value: QueryValue) {
    match params.iter().position(|(k, _)| k == key) {
        Some(pos) => params[pos].1 = value,
        None => params.push((key.to_string(), value)),
    }
}

/// Default separator inserted where an abbreviated URL was cut
pub const ABBREVIATION: &str = "\u{2009}\u{2026}\u{2009}";

/// Abbreviate an absolute URL to at most `max_segments` path segments
///
/// A `max_segments` of 0 keeps every segment and only applies `max_length`.
/// Query string and fragment are dropped. `max_length` limits the path part
/// only, the full URL may be longer.
pub fn abbreviate_url(
    url: &str,
    max_segments: usize,
    max_length: usize,
    replacement: &str,
) -> Result<String> {
    let mut url = Url::parse(url)?;
    url.set_query(None);
    url.set_fragment(None);

    let pathname = url.path().to_string();
    let segments: Vec<&str> = pathname.trim_start_matches('/').split('/').collect();
    if segments.len() <= max_segments && pathname.chars().count() <= max_length {
        return Ok(url.to_string());
    }

    let keep = if max_segments == 0 {
        segments.len()
    } else {
        max_segments
    };
    let path = segments[segments.len().saturating_sub(keep)..].join("/");
    let skip = path.chars().count().saturating_sub(max_length);
    let path: String = path.chars().skip(skip).collect();

    Ok([url.origin().ascii_serialization(), replacement.to_string(), path].join("/"))
}

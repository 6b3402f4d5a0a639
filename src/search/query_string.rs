//! URL query string representations of a search (`q`, `index`, `p`)

use crate::common::{build_query_string, QueryValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Query parameters as read from a URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Query text
    pub q: Option<String>,
    /// One or many index ids
    pub index: Option<QueryValue>,
    /// Raw 1-based page number, parsed leniently
    pub p: Option<String>,
}

impl QueryParams {
    /// Parse a raw query string, with or without the leading `?`
    ///
    /// Repeated `index` keys are collected into a list. Unknown keys are
    /// ignored; for `q` and `p` the first occurrence wins.
    pub fn parse(query_string: &str) -> Self {
        let raw = query_string.trim_start_matches('?');
        let mut params = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "q" if params.q.is_none() => params.q = Some(value),
                "p" if params.p.is_none() => params.p = Some(value),
                "index" => {
                    params.index = Some(match params.index.take() {
                        None => QueryValue::One(value),
                        Some(existing) => {
                            let mut all = existing.to_vec();
                            all.push(value);
                            QueryValue::Many(all)
                        }
                    })
                }
                _ => {}
            }
        }

        params
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_index(mut self, index: impl Into<QueryValue>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_page(mut self, p: impl Into<String>) -> Self {
        self.p = Some(p.into());
        self
    }

    /// Requested index ids; a scalar `index` becomes a one-element list
    pub fn index_ids(&self) -> Vec<String> {
        self.index.as_ref().map(QueryValue::to_vec).unwrap_or_default()
    }

    /// Requested page, at least 1
    pub fn page(&self) -> u32 {
        self.p
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|p| *p != 0)
            .unwrap_or(1)
            .clamp(1, u32::MAX as i64) as u32
    }
}

/// Query string object produced by a search model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStringObj {
    pub q: String,
    /// Single id when exactly one index is selected, a list otherwise
    pub index: QueryValue,
    pub p: u32,
}

impl QueryStringObj {
    /// Key/value pairs in `q`, `index`, `p` order
    pub fn to_pairs(&self) -> Vec<(String, QueryValue)> {
        vec![
            ("q".to_string(), QueryValue::One(self.q.clone())),
            ("index".to_string(), self.index.clone()),
            ("p".to_string(), QueryValue::One(self.p.to_string())),
        ]
    }
}

impl fmt::Display for QueryStringObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_query_string(&self.to_pairs()))
    }
}

/// Parse the leading integer of a string, ignoring trailing garbage
/// (`"12abc"` is 12, `"  -3"` is -3, `"abc"` is nothing)
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first()? {
        b'-' => (-1, &s[1..]),
        b'+' => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate on overflow rather than failing
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

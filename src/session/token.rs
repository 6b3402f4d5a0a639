//! API token and index descriptors issued by the backend

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Time-boxed, quota-limited request token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    /// Bearer token value
    pub token: String,
    /// Issue time as Unix seconds
    pub timestamp: f64,
    /// Validity in seconds from `timestamp`
    pub max_age: f64,
    /// Number of search requests the token may be used for
    pub quota: u64,
}

impl ApiToken {
    /// Seconds since the token was issued
    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }

    /// Seconds of validity left, negative once expired
    pub fn remaining(&self, now: f64) -> f64 {
        self.max_age - self.age(now)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) >= self.max_age
    }

    pub fn is_exhausted(&self, counter: i64) -> bool {
        counter >= 0 && counter as u64 >= self.quota
    }

    /// Whether the token can be used without refreshing: more than `margin`
    /// seconds of validity left and quota not yet used up
    pub fn is_usable(&self, now: f64, counter: i64, margin: f64) -> bool {
        self.age(now) < self.max_age - margin && !self.is_exhausted(counter)
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Selectable search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDesc {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selected: bool,
}

impl IndexDesc {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Drop entries whose id was already seen, keeping the first one
    pub fn dedup(indices: Vec<IndexDesc>) -> Vec<IndexDesc> {
        let mut seen = HashSet::new();
        indices
            .into_iter()
            .filter(|i| seen.insert(i.id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(timestamp: f64, max_age: f64, quota: u64) -> ApiToken {
        ApiToken {
            token: "t".to_string(),
            timestamp,
            max_age,
            quota,
        }
    }

    #[test]
    fn test_expiry() {
        let t = token(1000.0, 60.0, 10);
        assert!(!t.is_expired(1059.0));
        assert!(t.is_expired(1060.0));
        assert_eq!(t.remaining(1030.0), 30.0);
    }

    #[test]
    fn test_usable_respects_margin_and_quota() {
        let t = token(1000.0, 60.0, 3);
        assert!(t.is_usable(1039.0, 0, 20.0));
        assert!(!t.is_usable(1040.0, 0, 20.0));
        assert!(t.is_usable(1000.0, 2, 20.0));
        assert!(!t.is_usable(1000.0, 3, 20.0));
    }

    #[test]
    fn test_decode_wire_token() {
        let t: ApiToken = serde_json::from_value(json!({
            "token": "abc",
            "timestamp": 1700000000.5,
            "max_age": 600,
            "quota": 50
        }))
        .unwrap();

        assert_eq!(t.max_age, 600.0);
        assert_eq!(t.quota, 50);
        assert_eq!(t.bearer(), "Bearer abc");
    }

    #[test]
    fn test_index_defaults_and_dedup() {
        let indices: Vec<IndexDesc> = serde_json::from_value(json!([
            {"id": "cw12", "name": "ClueWeb12"},
            {"id": "cc", "name": "Common Crawl", "selected": true},
            {"id": "cw12", "name": "duplicate", "selected": true}
        ]))
        .unwrap();

        assert!(!indices[0].selected);
        let unique = IndexDesc::dedup(indices);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name, "ClueWeb12");
    }
}

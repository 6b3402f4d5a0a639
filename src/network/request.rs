//! Request and response types for backend calls

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP request to be made against the backend
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers, keyed by lowercase name
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Per-request deadline, client default when unset
    pub timeout: Option<Duration>,
    /// Echo the CSRF cookie in the CSRF header
    pub with_xsrf_token: bool,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: Vec::new(),
            body: None,
            timeout: None,
            with_xsrf_token: false,
        }
    }

    /// Add a header, replacing any header of the same name
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(header_key(key.as_ref()), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send the CSRF header with this request
    pub fn xsrf(mut self) -> Self {
        self.with_xsrf_token = true;
        self
    }

    /// Apply caller supplied options on top of this request
    pub fn merge(mut self, options: RequestOptions) -> Self {
        if let Some(url) = options.url {
            self.url = url;
        }
        if let Some(body) = options.body {
            self.body = Some(body);
        }
        if let Some(timeout) = options.timeout {
            self.timeout = Some(timeout);
        }
        self.headers.extend(
            options
                .headers
                .into_iter()
                .map(|(key, value)| (header_key(&key), value)),
        );
        self.params.extend(options.params);
        self
    }
}

/// Caller overrides for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replace the target URL
    pub url: Option<String>,
    /// Replace the JSON body
    pub body: Option<Value>,
    /// Replace the deadline
    pub timeout: Option<Duration>,
    /// Extra headers, replacing defaults of the same name
    pub headers: HashMap<String, String>,
    /// Extra query parameters
    pub params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(header_key(key.as_ref()), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Header names compare case-insensitively
fn header_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// HTTP response from the backend
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ApiResponse {
    /// Parse response as JSON
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = ApiRequest::post("http://localhost/?init")
            .header("Authorization", "Bearer t")
            .json(json!({"a": 1}))
            .xsrf();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers["authorization"], "Bearer t");
        assert!(request.with_xsrf_token);
        assert!(request.timeout.is_none());
    }

    #[test]
    fn test_merge_overrides_and_extends() {
        let request = ApiRequest::post("http://localhost/_search")
            .header("Authorization", "Bearer t")
            .header("Accept", "application/json")
            .json(json!({"query": "a"}))
            .timeout(Duration::from_secs(30));

        let merged = request.merge(
            RequestOptions::new()
                .with_timeout(Duration::from_secs(5))
                .with_header("Accept", "text/plain")
                .with_param("pretty", "1"),
        );

        assert_eq!(merged.url, "http://localhost/_search");
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert_eq!(merged.headers["authorization"], "Bearer t");
        assert_eq!(merged.headers["accept"], "text/plain");
        assert_eq!(merged.body, Some(json!({"query": "a"})));
        assert_eq!(merged.params, vec![("pretty".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_merge_header_names_ignore_case() {
        let mut options = RequestOptions::new().with_header("authorization", "Bearer other");
        options
            .headers
            .insert("X-Trace".to_string(), "1".to_string());

        let merged = ApiRequest::post("http://localhost/_search")
            .header("Authorization", "Bearer t")
            .merge(options);

        assert_eq!(merged.headers.len(), 2);
        assert_eq!(merged.headers["authorization"], "Bearer other");
        assert_eq!(merged.headers["x-trace"], "1");
    }

    #[test]
    fn test_response_status() {
        let response = ApiResponse {
            status: 204,
            headers: HashMap::new(),
            text: String::new(),
            url: "http://localhost/".to_string(),
        };
        assert!(response.is_success());
    }
}

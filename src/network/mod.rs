//! HTTP networking module
//!
//! Provides the HTTP client used for token issuance and search requests.

mod client;
mod csrf;
mod request;

pub use client::HttpClient;
pub use csrf::{csrf_token_from_cookies, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
pub use request::{ApiRequest, ApiResponse, HttpMethod, RequestOptions};

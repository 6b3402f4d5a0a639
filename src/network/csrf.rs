//! CSRF cookie/header pair

/// Cookie the backend stores its CSRF token in
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header that echoes the CSRF token back to the backend
pub const CSRF_HEADER_NAME: &str = "X-Csrf-Token";

/// Extract the CSRF token from a `Cookie` header value (`a=b; csrftoken=...`)
pub fn csrf_token_from_cookies(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE_NAME)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

//! HTTP client for talking to the search backend

use super::csrf::{csrf_token_from_cookies, CSRF_HEADER_NAME};
use super::request::{ApiRequest, ApiResponse, HttpMethod};
use crate::config::OutgoingSettings;
use crate::error::{Error, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client wrapper with backend specific defaults
///
/// Every request carries `X-Requested-With: XMLHttpRequest` and a JSON
/// content type. Cookies set by the backend are kept in a jar shared by all
/// clones of the client, which is where the CSRF token comes from.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cookies: Arc<Jar>,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let cookies = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (key, value) in &settings.extra_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {key}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid value for header {key}: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_provider(cookies.clone())
            .timeout(settings.request_timeout())
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            cookies,
            default_timeout: settings.request_timeout(),
        })
    }

    /// Execute a backend request
    ///
    /// Non-2xx answers are returned as [`Error::Status`].
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = Url::parse(&request.url)?;

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(url.clone()),
            HttpMethod::Post => self.client.post(url.clone()),
        };

        req_builder = req_builder.timeout(request.timeout.unwrap_or(self.default_timeout));

        if request.with_xsrf_token {
            match self.csrf_token(&url) {
                Some(token) => req_builder = req_builder.header(CSRF_HEADER_NAME, token),
                None => debug!("No CSRF cookie known for {}", url),
            }
        }

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(ref body) = request.body {
            req_builder = req_builder.json(body);
        }

        debug!("{:?} {}", request.method, request.url);
        let response = req_builder.send().await?;

        let response = Self::parse_response(response).await?;
        if !response.is_success() {
            warn!("Request to {} failed with status {}", response.url, response.status);
            return Err(Error::Status {
                status: response.status,
                url: response.url,
            });
        }

        Ok(response)
    }

    /// Simple GET request
    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::get(url)).await
    }

    /// Fetch the backend address once so it can set its CSRF cookie
    pub async fn bootstrap_csrf(&self, backend_address: &str) -> Result<()> {
        self.get(backend_address).await.map_err(Error::csrf)?;

        let url = Url::parse(backend_address)?;
        if self.csrf_token(&url).is_none() {
            warn!("Backend at {} did not set a CSRF cookie", backend_address);
        }
        Ok(())
    }

    /// CSRF token stored for the given URL, if any
    pub fn csrf_token(&self, url: &Url) -> Option<String> {
        let header = self.cookies.cookies(url)?;
        csrf_token_from_cookies(header.to_str().ok()?)
    }

    /// Parse response into ApiResponse
    async fn parse_response(response: Response) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            text,
            url,
        })
    }
}

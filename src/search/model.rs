//! Search request/response model

use super::query_string::{QueryParams, QueryStringObj};
use super::response::SearchResponse;
use crate::common::QueryValue;
use crate::config::SearchSettings;
use crate::convert::keys_to_snake;
use crate::error::{Error, Result};
use crate::network::{ApiRequest, RequestOptions};
use crate::session::{IndexDesc, Session};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Current search parameters and the last response
///
/// `page` is 1-based and never below 1, `page_size` is never 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchModel {
    pub query: String,
    pub indices: Vec<IndexDesc>,
    pub page: u32,
    pub page_size: u32,
    pub response: Option<SearchResponse>,
    /// Ask the API for extended result metadata
    pub extended_meta: bool,
}

impl Default for SearchModel {
    fn default() -> Self {
        Self {
            query: String::new(),
            indices: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            response: None,
            extended_meta: true,
        }
    }
}

impl SearchModel {
    pub fn new(query: impl Into<String>, indices: Vec<IndexDesc>, page: i64, page_size: u32) -> Self {
        Self::default()
            .with_query(query)
            .with_indices(indices)
            .with_page(page)
            .with_page_size(page_size)
    }

    /// Empty model using the configured page size
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let mut model = Self::default().with_page_size(settings.page_size);
        model.extended_meta = settings.extended_meta;
        model
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_indices(mut self, indices: Vec<IndexDesc>) -> Self {
        self.indices = IndexDesc::dedup(indices);
        self
    }

    /// Set page number, clamped to at least 1
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page.clamp(1, u32::MAX as i64) as u32;
        self
    }

    /// Set page size, 0 falls back to the default
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    /// Load the available indices from the session
    pub async fn init_state(&mut self, session: &Session) -> Result<()> {
        self.indices = session.available_indices().await?;
        Ok(())
    }

    /// Indices with `selected` set
    pub fn selected_indices(&self) -> Vec<&IndexDesc> {
        self.indices.iter().filter(|i| i.selected).collect()
    }

    fn selected_ids(&self) -> Vec<String> {
        self.selected_indices()
            .into_iter()
            .map(|i| i.id.clone())
            .collect()
    }

    /// Zero-based offset of the first requested result
    pub fn results_from(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Maximum page from the last response, 0 without one
    pub fn max_page(&self) -> u32 {
        self.response
            .as_ref()
            .map(|r| r.meta.max_page)
            .unwrap_or(0)
    }

    /// Query string object of the current request data
    pub fn to_query_string_obj(&self) -> QueryStringObj {
        let mut ids = self.selected_ids();
        let index = if ids.len() == 1 {
            QueryValue::One(ids.remove(0))
        } else {
            QueryValue::Many(ids)
        };
        QueryStringObj {
            q: self.query.clone(),
            index,
            p: self.page,
        }
    }

    /// Encoded query string of the current request data
    pub fn to_query_string(&self) -> String {
        self.to_query_string_obj().to_string()
    }

    /// API request body of the current request data
    ///
    /// Additional fields are converted to snake_case and override the
    /// generated ones.
    pub fn to_api_request_body(&self, additional: Option<Map<String, Value>>) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(self.query));
        body.insert("index".to_string(), json!(self.selected_ids()));
        body.insert("from".to_string(), json!(self.results_from()));
        body.insert("size".to_string(), json!(self.page_size));
        if self.extended_meta {
            body.insert("extended_meta".to_string(), json!(true));
        }

        if let Some(additional) = additional {
            if let Value::Object(fields) = keys_to_snake(Value::Object(additional)) {
                body.extend(fields);
            }
        }

        Value::Object(body)
    }

    /// Update the model from a search API response
    ///
    /// Page and page size follow the response metadata and the index list is
    /// replaced by the one the server sent. Applying the same response twice
    /// leaves the model unchanged.
    pub fn update_from_response(&mut self, json: &Value) -> Result<()> {
        let response = SearchResponse::from_json(json)?;

        let meta = &response.meta;
        if meta.page_size > 0 {
            let page = meta.results_from / u64::from(meta.page_size) + 1;
            self.page = page.min(u64::from(u32::MAX)) as u32;
            self.page_size = meta.page_size;
        }
        if let Some(ref indices) = meta.indices {
            self.indices = indices.clone();
        }

        self.response = Some(response);
        Ok(())
    }

    /// Update request data from URL query parameters and drop the response
    ///
    /// Without an `index` parameter the current selection is kept.
    pub fn update_from_query_string(&mut self, params: &QueryParams) {
        let ids = params.index_ids();

        self.query = params.q.clone().unwrap_or_default();
        if !ids.is_empty() {
            for index in &mut self.indices {
                index.selected = ids.contains(&index.id);
            }
        }
        self.page = params.page();
        self.response = None;
    }

    /// Send the search request and return the raw JSON body
    ///
    /// Counts the request against the session quota and authenticates with
    /// the session's current token. `options` override the URL, body and
    /// deadline; its headers are merged over the defaults.
    pub async fn search(&self, session: &Session, options: RequestOptions) -> Result<Value> {
        session.record_request().await;
        let token = session.api_token().await?;

        let request = ApiRequest::post(session.search_url())
            .header("Authorization", token.bearer())
            .json(self.to_api_request_body(None))
            .timeout(session.search_timeout())
            .merge(options);

        debug!(
            "Searching for '{}' in {:?}, page {}",
            self.query,
            self.selected_ids(),
            self.page
        );

        let response = session
            .client()
            .execute(request)
            .await
            .map_err(Error::search)?;
        response.json().map_err(Error::search)
    }

    /// Send the search request and apply the response to the model
    pub async fn search_and_update(
        &mut self,
        session: &Session,
        options: RequestOptions,
    ) -> Result<&SearchResponse> {
        let json = self.search(session, options).await?;
        self.update_from_response(&json).map_err(Error::search)?;

        let response = self
            .response
            .as_ref()
            .ok_or_else(|| Error::Config("search response missing".to_string()))?;
        info!(
            "Search '{}' returned {} results (page {}/{})",
            self.query,
            response.results.len(),
            self.page,
            response.meta.max_page
        );
        Ok(response)
    }
}

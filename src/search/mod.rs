//! Search module
//!
//! Holds the search request parameters, serializes them for the URL and the
//! API, and ingests API responses.

mod model;
mod query_string;
mod response;

pub use model::{SearchModel, DEFAULT_PAGE_SIZE};
pub use query_string::{parse_leading_int, QueryParams, QueryStringObj};
pub use response::{SearchMeta, SearchResponse};

//! ChatNoir front end: search state and session client for the ChatNoir
//! search API
//!
//! Keeps the state of a search (query, selected indices, pagination),
//! serializes it to URL query strings and API request bodies, ingests API
//! responses, and manages the short-lived API tokens needed to search.

pub mod common;
pub mod config;
pub mod convert;
pub mod error;
pub mod network;
pub mod search;
pub mod session;

pub use config::Settings;
pub use error::{Error, Result};
pub use network::{HttpClient, RequestOptions};
pub use search::{QueryParams, SearchModel, SearchResponse};
pub use session::{ApiToken, IndexDesc, Session};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

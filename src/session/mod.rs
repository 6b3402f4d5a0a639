//! Session module
//!
//! Holds the temporary API token, the list of available indices and the
//! request counter, refreshed lazily from the backend.

mod state;
mod token;

pub use state::{Session, SessionState};
pub use token::{ApiToken, IndexDesc};

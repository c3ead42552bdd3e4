//! Search API client abstraction.
//!
//! The `FeedClient` trait is the only place the engine touches the network:
//! one call per search request and one per result download.

mod hydra;
mod types;

pub use hydra::HydraClient;
pub use types::*;

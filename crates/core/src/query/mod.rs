//! Search queries: URL construction, result parsing and download of found
//! NZB files into the output directory.

mod naming;
mod request;
mod session;
mod types;

pub use naming::{file_name_from_title, file_name_from_url, NZB_EXTENSION};
pub use request::{SearchRequest, PAGE_SIZE};
pub use session::QuerySession;
pub use types::*;

use std::time::Duration;

/// Pause after a query so the API is not hammered.
pub async fn cooldown(secs: u64) {
    if secs > 0 {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

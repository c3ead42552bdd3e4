//! Search feed parsing.
//!
//! NZBHydra answers searches with an RSS 2.0 document carrying Newznab
//! extensions. Only the `<item>` elements matter here; the surrounding
//! `<rss>`/`<channel>` wrapper is walked through without being inspected.

mod parser;
mod types;

pub use parser::parse_feed;
pub use types::*;

//! Search term discovery.
//!
//! For every show, a query for the show alone tells which release groups
//! publish it; groups whose name appears in a result title together with the
//! configured resolution become candidates. Candidates are tried in a random
//! order with a `"<group> <show> <resolution>"` query and the first one that
//! returns anything is appended to the search terms file.

mod engine;
mod types;

pub use engine::{candidate_groups, clean_show_name, TermDiscovery};
pub use types::{DiscoveryError, DiscoveryOutcome, DiscoveryReport, ShowReport};

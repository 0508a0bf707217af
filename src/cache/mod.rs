//! Normalized query cache
//!
//! Reads are keyed by endpoint and arguments, tagged with the resources
//! they contain, and refetched when a successful write invalidates one of
//! those tags.

pub mod graph;
pub mod key;
pub mod query;
pub mod tags;

pub use graph::{MutationEndpoint, QueryEndpoint};
pub use key::QueryKey;
pub use query::{fetcher, Fetcher, DEFAULT_KEEP_UNUSED, ListStatus, Listing, Query, QueryCache, QueryState};
pub use tags::{Tag, TagId, TagKind};

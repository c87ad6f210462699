//! Upstream fetchers - retrieve JSON items from external REST APIs
//!
//! Two sequential, blocking fetchers share the same plumbing: a corporate
//! registry (one lookup per corporate number) and a paginated web search.
//! Both return plain `serde_json::Value` items for the flattening core and
//! degrade per item: a failed lookup or a broken page is logged and
//! skipped, never aborting the batch.
//!
//! All endpoints, credentials, and pacing live in explicit config structs
//! passed at construction; nothing is read from globals.

pub mod http;
pub mod registry;
pub mod search;

pub use http::FetchError;
pub use registry::{RegistryClient, RegistryConfig};
pub use search::{SearchClient, SearchConfig};

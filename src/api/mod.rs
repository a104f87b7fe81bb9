//! Backend gateway: endpoint wrappers and their payload types.

mod client;
pub mod types;

pub use client::{ApiClient, FetchRequest};
pub use types::RawGraph;

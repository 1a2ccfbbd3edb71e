//! Persistence layer for the School Portal backend.
//!
//! This crate contains:
//! - The PostgREST client and query builder
//! - The Storage client
//! - Entity definitions (row mappings and write payloads)
//! - Repository implementations

pub mod client;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod query;
pub mod repositories;
pub mod storage;

pub use client::{build_http_client, ApiKey, PostgrestClient, SupabaseConfig};
pub use error::UpstreamError;
pub use query::{Condition, Query};
pub use storage::{StorageClient, StorageObject};

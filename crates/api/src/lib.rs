//! HTTP API for the school portal: session cookie auth, role allow-lists
//! and handlers proxying to the Supabase REST and Storage endpoints.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;

//! Shared utilities and common types for the School Portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Signed session tokens
//! - Common validation logic
//! - Pagination helpers

pub mod pagination;
pub mod session;
pub mod validation;

//! Domain layer for the School Portal backend.
//!
//! This crate contains:
//! - Domain models (profiles, courses, subjects, attendance, grades,
//!   enrollment applications, news)
//! - Pure services (grade averaging, attendance statistics, storage paths)

pub mod models;
pub mod services;

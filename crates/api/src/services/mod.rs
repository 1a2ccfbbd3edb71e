//! Request-independent helpers used by the route handlers.

pub mod cookies;
pub mod dashboards;
pub mod documents;

pub use cookies::CookieHelper;

//! # Dhriti Shared Library
//!
//! This crate contains the data layer, authentication primitives and
//! dashboard aggregation used by the Dhriti API server and tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL operations
//! - `auth`: Password hashing, JWT tokens, request auth context, role checks
//! - `db`: Connection pool and migration runner
//! - `dashboard`: Summary statistics and per-user task dashboards

pub mod auth;
pub mod dashboard;
pub mod db;
pub mod models;

/// Current version of the Dhriti shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

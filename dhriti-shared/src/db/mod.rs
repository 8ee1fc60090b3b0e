//! Database layer: connection pool and migrations
//!
//! Models live in [`crate::models`].

pub mod migrations;
pub mod pool;

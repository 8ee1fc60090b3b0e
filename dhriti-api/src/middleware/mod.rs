//! Middleware for the API server
//!
//! - [`auth`]: bearer token authentication and the admin gate

pub mod auth;

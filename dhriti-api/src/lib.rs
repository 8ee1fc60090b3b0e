//! # Dhriti API Server Library
//!
//! HTTP surface of the Dhriti task-tracking backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Body, path and query extractors that reject with `ApiError`
//! - `middleware`: Bearer token authentication and the admin gate
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

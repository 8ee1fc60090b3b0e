//! API route handlers
//!
//! - [`health`]: liveness and health probes
//! - [`auth`]: registration and login
//! - [`protected`]: token introspection probes
//! - [`dashboard`]: admin summary statistics
//! - [`tasks`]: user task dashboard and admin project/assignment management
//! - [`users`]: admin user management

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod protected;
pub mod tasks;
pub mod users;

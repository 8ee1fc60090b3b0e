//! # Dhriti Tools
//!
//! Offline utilities that ship next to the API server.
//!
//! ## Modules
//!
//! - `flatten`: nested JSON to an xlsx or CSV sheet, behind the `json-to-sheet` binary
//! - `seed`: idempotent sample data, behind the `seed-tasks` binary
//!
//! ## Example
//!
//! ```
//! use dhriti_tools::flatten::{detect_records, flatten};
//! use serde_json::json;
//!
//! let records = detect_records(json!([{"id": 1, "meta": {"lang": "pt"}}]), None);
//! let table = flatten(&records, &["id".to_string()]);
//! assert_eq!(table.columns, vec!["id", "meta.lang"]);
//! ```

pub mod flatten;
pub mod seed;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the stderr log subscriber shared by the binaries
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

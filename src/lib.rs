//! requery — a resilient, synchronous PostgreSQL access layer.
//!
//! The client opens one connection, executes raw SQL, and transparently
//! recovers from connection loss by closing, reconnecting, and retrying the
//! query exactly once. Connect and query work runs on background workers
//! while the caller blocks on a bounded, cancellable wait.

// Core infrastructure modules
pub mod core;

// Supporting modules
pub mod config;
pub mod net;

pub use crate::config::{load_config, Config, ConnectionParams};
pub use crate::core::db::{Client, QueryOutcome, QueryResult};
pub use crate::core::{RequeryError, Result};

//! Core infrastructure for requery.
//!
//! Holds the error taxonomy and the database layer: driver capability,
//! result decoding, the blocking call facade, and the client itself.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{RequeryError, Result};

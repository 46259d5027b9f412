//! Database layer.
//!
//! Split by concern:
//! - **Driver capability** (`driver.rs`, `postgres.rs`): the opaque interface
//!   that mints and uses connection handles, plus the PostgreSQL backend.
//! - **Decoding** (`decode.rs`): declared-type-name driven cell decoding.
//! - **Query plumbing** (`query.rs`): result types, tagged outcomes, and the
//!   bounded blocking call facade.
//! - **Connection management** (`connection.rs`): the client — lifecycle,
//!   reachability gating, and the one-shot reconnect-and-retry protocol.

pub mod connection;
pub mod decode;
pub mod driver;
pub mod postgres;
pub mod query;

pub use connection::Client;
pub use driver::{Column, Connection, Driver, RawTable, RawValue};
pub use query::{Call, QueryOutcome, QueryResult};

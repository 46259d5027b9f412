//! Driver capability interface.
//!
//! The client never talks to a database crate directly; it depends on the
//! `Driver`/`Connection` traits defined here. This keeps the reconnect and
//! retry logic backend-agnostic and lets tests substitute a scripted driver
//! for the real PostgreSQL one.

use chrono::NaiveDateTime;

use crate::core::Result;

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name as reported by the backend
    pub name: String,
    /// Declared type name (e.g. "int4", "varchar", "timestamp")
    pub type_name: String,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A raw cell value as extracted by the driver, before decoding.
///
/// Drivers extract whatever the backend hands them into this neutral form;
/// the decoder then decides, per declared column type, what becomes visible
/// to callers. A value the driver cannot extract is `Unsupported`, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// SQL NULL
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    /// A value of a type the driver does not extract
    Unsupported,
}

/// Raw tabular result of one statement: column metadata plus rows of raw
/// cells, in backend order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<RawValue>>,
}

/// A live connection handle.
///
/// Owned exclusively by one client; at most one exists per client at any
/// time. `close` consumes the handle, so a failed close can still never
/// resurrect it.
pub trait Connection: Send {
    /// Execute one statement and collect its full result set.
    fn execute(&mut self, sql: &str) -> Result<RawTable>;

    /// Close the connection. Best-effort: the handle is gone either way.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A database driver capability: something that can validate itself once and
/// then mint connection handles from a target URL plus credentials.
pub trait Driver: Send + Sync {
    /// Driver name for logging.
    fn name(&self) -> &'static str;

    /// One-time validation, called at client construction. A failure here
    /// leaves the client permanently unable to connect.
    fn register(&self) -> Result<()> {
        Ok(())
    }

    /// Open a connection to `url` with the given credentials.
    fn open(&self, url: &str, user: &str, password: &str) -> Result<Box<dyn Connection>>;
}

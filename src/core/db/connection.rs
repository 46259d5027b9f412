//! Connection management and the retry protocol.
//!
//! The client owns at most one connection handle at a time. Connect and query
//! work is moved onto a background worker and the caller blocks on a bounded
//! wait, so callers see a synchronous API over asynchronous work. A query
//! that fails while a handle was present is interpreted as "the connection
//! died mid-use": the client disconnects, reconnects, and retries the query
//! exactly once. Failures never propagate past this boundary; callers observe
//! only a `QueryOutcome`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, ConnectionParams};
use crate::core::db::decode::decode_row;
use crate::core::db::driver::{Connection, Driver, RawTable};
use crate::core::db::postgres::PostgresDriver;
use crate::core::db::query::{Call, QueryOutcome, QueryResult};
use crate::core::{RequeryError, Result};
use crate::net::{Reachability, TcpProbe};

/// A resilient database client.
///
/// Construction checks network reachability and, when reachable, blocks until
/// the first connect attempt finishes. Afterwards `query` transparently
/// recovers from connection loss with a single reconnect-and-retry.
pub struct Client {
    params: ConnectionParams,
    target: String,
    driver: Arc<dyn Driver>,
    reachability: Arc<dyn Reachability>,
    /// False when one-time driver validation failed; the client can then
    /// never connect, but construction still succeeds.
    driver_ready: bool,
    conn: Option<Box<dyn Connection>>,
    last_result: Option<QueryResult>,
    call_timeout: Duration,
}

impl Client {
    /// Constructs a client against PostgreSQL with default tuning.
    pub fn connect(params: ConnectionParams) -> Self {
        Self::connect_with(params, &ClientConfig::default())
    }

    /// Constructs a client against PostgreSQL with explicit tuning.
    ///
    /// Reachability is probed with a bounded TCP connect against the
    /// configured server.
    pub fn connect_with(params: ConnectionParams, config: &ClientConfig) -> Self {
        let probe = TcpProbe::new(&params.host, params.port, config.probe_timeout());
        Self::with_driver(params, Arc::new(PostgresDriver), Arc::new(probe), config)
    }

    /// Constructs a client over an explicit driver and reachability predicate.
    ///
    /// This is the seam tests use; `connect`/`connect_with` delegate here.
    pub fn with_driver(
        params: ConnectionParams,
        driver: Arc<dyn Driver>,
        reachability: Arc<dyn Reachability>,
        config: &ClientConfig,
    ) -> Self {
        let target = params.url();

        let driver_ready = match driver.register() {
            Ok(()) => true,
            Err(e) => {
                error!("Driver '{}' unavailable: {}", driver.name(), e);
                false
            }
        };

        let mut client = Client {
            params,
            target,
            driver,
            reachability,
            driver_ready,
            conn: None,
            last_result: None,
            call_timeout: config.call_timeout(),
        };

        if client.reachability.is_reachable() {
            client.establish();
        } else {
            debug!(
                "Network unreachable; client for {} constructed without a connection",
                client.target
            );
        }

        client
    }

    /// Opens a connection if none is present. Idempotent.
    ///
    /// The open call runs on a worker thread and this method blocks until it
    /// finishes or the bounded wait elapses. Failures are logged and leave
    /// the handle absent; nothing is raised to the caller.
    pub fn establish(&mut self) {
        if self.conn.is_some() {
            return;
        }
        if !self.driver_ready {
            warn!("Driver unavailable; cannot connect to {}", self.target);
            return;
        }

        let driver = Arc::clone(&self.driver);
        let target = self.target.clone();
        let user = self.params.user.clone();
        let password = self.params.password.clone();

        let opened = Call::spawn("requery-connect", move || {
            driver.open(&target, &user, &password)
        })
        .and_then(|call| call.wait(self.call_timeout));

        match opened {
            Ok(Ok(conn)) => {
                info!("Connected to {}", self.target);
                self.conn = Some(conn);
            }
            Ok(Err(e)) => error!("Failed to connect to {}: {}", self.target, e),
            Err(e) => error!("Connect to {} did not complete: {}", self.target, e),
        }
    }

    /// Closes the connection if one is present. Idempotent.
    ///
    /// A close failure is logged; the handle is cleared regardless.
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => debug!("Disconnected from {}", self.target),
                Err(e) => warn!("Failed to close connection to {}: {}", self.target, e),
            }
        }
    }

    /// Executes `sql` and returns the tagged outcome. Never raises.
    ///
    /// With the network unreachable the last stored result is returned
    /// unchanged and no network traffic occurs. Otherwise the statement is
    /// attempted once; any failure (including an absent handle or a timed-out
    /// worker) triggers disconnect, reconnect, and exactly one more attempt.
    /// A second failure again returns the last stored result.
    pub fn query(&mut self, sql: &str) -> QueryOutcome {
        if !self.reachability.is_reachable() {
            warn!("Network unreachable; returning last stored result unchanged");
            return QueryOutcome::Unreachable(self.last_result.clone());
        }

        match self.attempt(sql) {
            Ok(raw) => self.store(raw),
            Err(first) => {
                warn!("Query failed ({}); reconnecting and retrying once", first);
                self.disconnect();
                self.establish();

                match self.attempt(sql) {
                    Ok(raw) => self.store(raw),
                    Err(second) => {
                        error!("Retried query failed: {}", second);
                        QueryOutcome::Failed(self.last_result.clone())
                    }
                }
            }
        }
    }

    /// One query attempt over the currently held handle.
    ///
    /// The handle moves into the worker for the duration of the call and is
    /// reinstalled when the worker finishes in time. On a timed-out or
    /// cancelled wait the abandoned worker drops the handle instead, so a
    /// stale handle is never re-installed behind a newer connection.
    fn attempt(&mut self, sql: &str) -> Result<RawTable> {
        let mut conn = self
            .conn
            .take()
            .ok_or_else(|| RequeryError::Connection("no open connection".to_string()))?;

        let statement = sql.to_string();
        let call = Call::spawn("requery-query", move || {
            let result = conn.execute(&statement);
            (conn, result)
        })?;

        let (conn, result) = call.wait(self.call_timeout)?;
        self.conn = Some(conn);
        result
    }

    /// Decodes a raw table, stores it as the last result, returns it fresh.
    fn store(&mut self, raw: RawTable) -> QueryOutcome {
        let columns = raw.columns.iter().map(|c| c.name.clone()).collect();
        let rows = raw
            .rows
            .iter()
            .map(|row| decode_row(&raw.columns, row))
            .collect();

        let result = QueryResult::new(columns, rows);
        self.last_result = Some(result.clone());
        QueryOutcome::Fresh(result)
    }

    /// Whether a connection handle is currently present.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// The most recent successfully stored result, if any.
    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    /// The connection parameters this client was built with.
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// The connection target identifier (no credentials).
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::driver::{Column, RawValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Offline;

    impl Reachability for Offline {
        fn is_reachable(&self) -> bool {
            false
        }
    }

    struct Online;

    impl Reachability for Online {
        fn is_reachable(&self) -> bool {
            true
        }
    }

    /// Driver whose connections echo a one-cell table and count opens.
    struct CountingDriver {
        opens: AtomicUsize,
    }

    struct EchoConnection;

    impl Connection for EchoConnection {
        fn execute(&mut self, _sql: &str) -> Result<RawTable> {
            Ok(RawTable {
                columns: vec![Column::new("n", "int4")],
                rows: vec![vec![RawValue::Int(1)]],
            })
        }

        fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    impl Driver for CountingDriver {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn open(&self, _url: &str, _user: &str, _password: &str) -> Result<Box<dyn Connection>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(EchoConnection))
        }
    }

    fn params() -> ConnectionParams {
        ConnectionParams {
            host: "localhost".to_string(),
            port: 5432,
            database: "test".to_string(),
            user: "u".to_string(),
            password: "p".to_string(),
        }
    }

    #[test]
    fn test_unreachable_construction_skips_connect() {
        let driver = Arc::new(CountingDriver {
            opens: AtomicUsize::new(0),
        });
        let client = Client::with_driver(
            params(),
            Arc::clone(&driver) as Arc<dyn Driver>,
            Arc::new(Offline),
            &ClientConfig::default(),
        );

        assert!(!client.is_connected());
        assert_eq!(driver.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reachable_construction_connects() {
        let driver = Arc::new(CountingDriver {
            opens: AtomicUsize::new(0),
        });
        let client = Client::with_driver(
            params(),
            Arc::clone(&driver) as Arc<dyn Driver>,
            Arc::new(Online),
            &ClientConfig::default(),
        );

        assert!(client.is_connected());
        assert_eq!(driver.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_establish_is_idempotent() {
        let driver = Arc::new(CountingDriver {
            opens: AtomicUsize::new(0),
        });
        let mut client = Client::with_driver(
            params(),
            Arc::clone(&driver) as Arc<dyn Driver>,
            Arc::new(Online),
            &ClientConfig::default(),
        );

        client.establish();
        client.establish();
        assert_eq!(driver.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let driver = Arc::new(CountingDriver {
            opens: AtomicUsize::new(0),
        });
        let mut client = Client::with_driver(
            params(),
            Arc::clone(&driver) as Arc<dyn Driver>,
            Arc::new(Online),
            &ClientConfig::default(),
        );

        client.disconnect();
        assert!(!client.is_connected());
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[test]
    fn test_target_has_no_credentials() {
        let driver = Arc::new(CountingDriver {
            opens: AtomicUsize::new(0),
        });
        let client = Client::with_driver(
            params(),
            driver as Arc<dyn Driver>,
            Arc::new(Offline),
            &ClientConfig::default(),
        );

        assert_eq!(client.target(), "postgres://localhost:5432/test");
    }
}

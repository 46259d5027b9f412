//! Network reachability.
//!
//! The client consults a yes/no predicate before constructing a connection
//! and before every query. The check is point-in-time only: the network can
//! drop between the check and the actual I/O, which is exactly the case the
//! retry protocol absorbs.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

/// A point-in-time reachability predicate.
pub trait Reachability: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Reachability via a bounded TCP connect against the database server.
///
/// Hosts with a better signal (an interface monitor, a captive-portal check)
/// can supply their own `Reachability` instead.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        TcpProbe {
            addr: format!("{}:{}", host, port),
            timeout,
        }
    }
}

impl Reachability for TcpProbe {
    fn is_reachable(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Probe address '{}' did not resolve: {}", self.addr, e);
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }

        debug!("Probe to '{}' found no reachable address", self.addr);
        false
    }
}

//! Transport layer
//!
//! The device drops idle sessions, so the client opens a fresh connection for
//! every exchange. `Connector` produces those connections and `Link` is one
//! open connection. Protocol logic only ever talks to these traits, which lets
//! tests substitute an instrumented mock for TCP.

mod traits;

pub mod tcp;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use tcp::{TcpConnector, TcpLink};
pub use traits::{Connector, Link, TransportError};

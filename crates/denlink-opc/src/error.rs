//! Error types for the OPC UA layer.

use thiserror::Error;

/// Errors surfaced by OPC UA operations.
///
/// Every operation converts faults from the protocol stack into one of
/// these at its boundary; nothing panics or propagates an uncaught fault,
/// because the orchestrating caller treats OPC UA failures as skippable.
#[derive(Error, Debug)]
pub enum OpcError {
    /// Operation requires an open session.
    #[error("not connected to OPC UA server")]
    NotConnected,

    /// A node id string could not be parsed by the stack.
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    /// Session establishment failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// A service call failed or returned a bad status.
    #[error("service call failed: {0}")]
    Service(String),

    /// Client configuration was rejected.
    #[error("client configuration error: {0}")]
    Config(String),

    /// Filesystem failure (PKI bootstrap).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

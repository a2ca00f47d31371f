//! OPC UA session client for the denlink pipeline.
//!
//! Wraps the `opcua` crate's synchronous client behind the small surface the
//! export run needs: one session, batched writes with per-item outcomes,
//! single reads, and a root browse for diagnostics. All calls here block;
//! drive them from a blocking context.

pub mod client;
pub mod diagnostic;
pub mod error;
pub mod pki;

pub use client::{BatchOutcome, BrowseEntry, ItemOutcome, OpcClient};
pub use diagnostic::{diagnose, DiagnosticReport};
pub use error::OpcError;
pub use pki::ensure_pki_dirs;

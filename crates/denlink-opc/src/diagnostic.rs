//! Staged connection diagnostics.
//!
//! Used by the `diagnose` CLI mode: checks run in order and stop at the
//! first hard failure, so the report points at the lowest broken layer
//! (address → network → session) instead of a generic connect error.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::info;
use url::Url;

use denlink_core::models::config::OpcSettings;

use crate::client::OpcClient;
use crate::error::OpcError;

/// Results of one diagnostic run.
#[derive(Debug, Default)]
pub struct DiagnosticReport {
    /// Endpoint URL parsed into host/port.
    pub url_ok: bool,
    /// TCP connection to the endpoint's port succeeded.
    pub tcp_ok: bool,
    /// An OPC UA session could be created.
    pub session_ok: bool,
    /// Number of root-folder children seen, when the session came up.
    pub browse_count: Option<usize>,
    /// Step-by-step findings, in check order.
    pub messages: Vec<String>,
}

impl DiagnosticReport {
    pub fn passed(&self) -> bool {
        self.url_ok && self.tcp_ok && self.session_ok
    }
}

/// Run all diagnostic stages against the configured endpoint.
pub fn diagnose(settings: &OpcSettings) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    info!("diagnosing connection to {}", settings.endpoint_url);

    let (host, port) = match endpoint_host_port(&settings.endpoint_url) {
        Ok(parts) => {
            report.url_ok = true;
            report
                .messages
                .push(format!("endpoint resolves to {}:{}", parts.0, parts.1));
            parts
        }
        Err(e) => {
            report.messages.push(format!("endpoint URL invalid: {e}"));
            return report;
        }
    };

    // The configured operation timeout bounds the probe, matching its
    // transport-level role.
    let timeout = Duration::from_millis(u64::from(settings.operation_timeout_ms.max(1)));
    match tcp_probe(&host, port, timeout) {
        Ok(()) => {
            report.tcp_ok = true;
            report.messages.push(format!("TCP reachable on port {port}"));
        }
        Err(e) => {
            report.messages.push(format!("TCP probe failed: {e}"));
            return report;
        }
    }

    let mut client = OpcClient::new(settings.clone());
    match client.connect() {
        Ok(()) => {
            report.session_ok = true;
            report.messages.push("session created".to_string());
            match client.browse_root() {
                Ok(entries) => {
                    report.browse_count = Some(entries.len());
                    report
                        .messages
                        .push(format!("root browse returned {} nodes", entries.len()));
                }
                Err(e) => report.messages.push(format!("root browse failed: {e}")),
            }
            client.disconnect();
        }
        Err(e) => report.messages.push(format!("session creation failed: {e}")),
    }

    report
}

/// Split an `opc.tcp://host:port/...` endpoint URL into host and port.
pub fn endpoint_host_port(endpoint_url: &str) -> Result<(String, u16), OpcError> {
    let url = Url::parse(endpoint_url)
        .map_err(|e| OpcError::Config(format!("bad endpoint URL '{endpoint_url}': {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| OpcError::Config(format!("endpoint URL '{endpoint_url}' has no host")))?
        .to_string();
    // 4840 is the registered OPC UA port.
    let port = url.port().unwrap_or(4840);
    Ok((host, port))
}

fn tcp_probe(host: &str, port: u16, timeout: Duration) -> Result<(), OpcError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| OpcError::Config(format!("cannot resolve {host}: {e}")))?;
    let addr = addrs
        .next()
        .ok_or_else(|| OpcError::Config(format!("no address for {host}")))?;
    TcpStream::connect_timeout(&addr, timeout)
        .map(|_| ())
        .map_err(|e| OpcError::Connect(e.to_string()))
}

//! OPC UA session client.

use std::str::FromStr;
use std::sync::Arc;

use opcua::client::prelude::*;
use opcua::sync::RwLock;
use tracing::{debug, info, warn};

use denlink_core::export::mapping::{WriteItem, WriteValue as ItemValue};
use denlink_core::models::config::OpcSettings;

use crate::error::OpcError;

/// Outcome of one item in a batch write.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub node_id: String,
    pub description: String,
    pub good: bool,
    /// Status code as reported by the server.
    pub status: String,
}

/// Per-item results of a batch write. Writes are not transactional: items
/// that succeeded stay written even when the batch as a whole failed.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchOutcome {
    /// Overall success: every item returned a good status. An empty batch
    /// is trivially good.
    pub fn all_good(&self) -> bool {
        self.outcomes.iter().all(|o| o.good)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.good).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// One entry from a root-folder browse.
#[derive(Debug, Clone)]
pub struct BrowseEntry {
    pub display_name: String,
    pub node_class: String,
}

/// Client owning at most one OPC UA session.
///
/// Lifecycle is `Disconnected → Connecting → Connected → Disconnected` with
/// no automatic retry: a failed connect leaves the client disconnected and
/// the caller decides whether to try again. Single-threaded use is assumed;
/// there is exactly one logical caller per export run.
pub struct OpcClient {
    settings: OpcSettings,
    session: Option<Arc<RwLock<Session>>>,
}

impl OpcClient {
    pub fn new(settings: OpcSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Open the session. A no-op when already connected; on failure the
    /// client stays disconnected and a later attempt is not blocked.
    pub fn connect(&mut self) -> Result<(), OpcError> {
        if self.session.is_some() {
            return Ok(());
        }

        info!("connecting to {}", self.settings.endpoint_url);

        let mut client = ClientBuilder::new()
            .application_name(self.settings.application_name.as_str())
            .application_uri("urn:denlink:client")
            .product_uri("urn:denlink:client")
            .pki_dir(self.settings.pki_dir.clone())
            .create_sample_keypair(true)
            .trust_server_certs(self.settings.auto_accept_untrusted_certs)
            .session_retry_limit(0)
            .session_timeout(self.settings.session_timeout_ms)
            .client()
            .ok_or_else(|| OpcError::Config("invalid client configuration".to_string()))?;

        let (policy, mode) = if self.settings.use_security {
            ("Basic256Sha256", MessageSecurityMode::SignAndEncrypt)
        } else {
            ("None", MessageSecurityMode::None)
        };
        let endpoint: EndpointDescription = (
            self.settings.endpoint_url.as_str(),
            policy,
            mode,
            UserTokenPolicy::anonymous(),
        )
            .into();

        let identity = if self.settings.username.is_empty() {
            IdentityToken::Anonymous
        } else {
            IdentityToken::UserName(
                self.settings.username.clone(),
                self.settings.password.clone(),
            )
        };

        match client.connect_to_endpoint(endpoint, identity) {
            Ok(session) => {
                info!("connected to OPC UA server");
                self.session = Some(session);
                Ok(())
            }
            Err(status) => {
                warn!("connection failed: {:?}", status);
                Err(OpcError::Connect(format!("{status:?}")))
            }
        }
    }

    /// Close the session. Idempotent: closing a never-opened or already
    /// closed session does nothing.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            session.write().disconnect();
            info!("disconnected from OPC UA server");
        }
    }

    /// Write one value to one node.
    pub fn write_single(&self, node_id: &str, value: &ItemValue) -> Result<(), OpcError> {
        let session = self.session.as_ref().ok_or(OpcError::NotConnected)?;
        let write_value = build_write_value(node_id, value)?;

        let results = session
            .read()
            .write(&[write_value])
            .map_err(|status| OpcError::Service(format!("{status:?}")))?;

        match results.first() {
            Some(status) if status.is_good() => {
                debug!("write ok: {}", node_id);
                Ok(())
            }
            Some(status) => Err(OpcError::Service(format!(
                "write to {node_id} returned {status:?}"
            ))),
            None => Err(OpcError::Service(format!(
                "write to {node_id} returned no status"
            ))),
        }
    }

    /// Write a batch in a single service call, reporting per-item outcomes.
    /// Successful items are not rolled back when others fail.
    pub fn write_batch(&self, items: &[WriteItem]) -> Result<BatchOutcome, OpcError> {
        let session = self.session.as_ref().ok_or(OpcError::NotConnected)?;

        if items.is_empty() {
            debug!("empty write batch");
            return Ok(BatchOutcome::default());
        }

        let mut write_values = Vec::with_capacity(items.len());
        for item in items {
            write_values.push(build_write_value(&item.node_id, &item.value)?);
        }

        info!("writing batch of {} items", items.len());
        let results = session
            .read()
            .write(&write_values)
            .map_err(|status| OpcError::Service(format!("{status:?}")))?;

        let outcomes: Vec<ItemOutcome> = items
            .iter()
            .zip(results.iter())
            .map(|(item, status)| {
                let good = status.is_good();
                if good {
                    debug!("{}: write ok", item.description);
                } else {
                    warn!("{}: write failed with {:?}", item.description, status);
                }
                ItemOutcome {
                    node_id: item.node_id.clone(),
                    description: item.description.clone(),
                    good,
                    status: format!("{status:?}"),
                }
            })
            .collect();

        let outcome = BatchOutcome { outcomes };
        info!(
            "batch write completed: {}/{} successful",
            outcome.succeeded(),
            outcome.outcomes.len()
        );
        Ok(outcome)
    }

    /// Read one node's value. Absent on any non-good status.
    pub fn read_single(&self, node_id: &str) -> Result<Option<Variant>, OpcError> {
        let session = self.session.as_ref().ok_or(OpcError::NotConnected)?;
        let read_value = ReadValueId {
            node_id: parse_node_id(node_id)?,
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            data_encoding: QualifiedName::null(),
        };

        let results = session
            .read()
            .read(&[read_value], TimestampsToReturn::Neither, 0.0)
            .map_err(|status| OpcError::Service(format!("{status:?}")))?;

        let Some(data_value) = results.into_iter().next() else {
            return Ok(None);
        };
        // Absent status means Good on the wire.
        let good = data_value.status.is_none_or(|s| s.is_good());
        if !good {
            warn!("read of {} returned {:?}", node_id, data_value.status);
            return Ok(None);
        }
        Ok(data_value.value)
    }

    /// List the immediate children of the server's Objects folder.
    /// Diagnostics only; the write path never browses.
    pub fn browse_root(&self) -> Result<Vec<BrowseEntry>, OpcError> {
        let session = self.session.as_ref().ok_or(OpcError::NotConnected)?;
        let browse = BrowseDescription {
            node_id: ObjectId::ObjectsFolder.into(),
            browse_direction: BrowseDirection::Forward,
            reference_type_id: ReferenceTypeId::HierarchicalReferences.into(),
            include_subtypes: true,
            node_class_mask: (NodeClass::Object as u32)
                | (NodeClass::Variable as u32)
                | (NodeClass::Method as u32),
            result_mask: 0x3f,
        };

        let results = session
            .read()
            .browse(&[browse])
            .map_err(|status| OpcError::Service(format!("{status:?}")))?;

        let mut entries = Vec::new();
        if let Some(results) = results {
            for result in results {
                let Some(references) = result.references else {
                    continue;
                };
                for reference in references {
                    entries.push(BrowseEntry {
                        display_name: reference.display_name.text.to_string(),
                        node_class: format!("{:?}", reference.node_class),
                    });
                }
            }
        }
        Ok(entries)
    }
}

impl Drop for OpcClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn parse_node_id(raw: &str) -> Result<NodeId, OpcError> {
    NodeId::from_str(raw).map_err(|_| OpcError::InvalidNodeId(raw.to_string()))
}

/// Encode one write: strings pass through, the array slot goes out as a
/// native double array, nothing else is accepted by the mapper.
fn build_write_value(node_id: &str, value: &ItemValue) -> Result<WriteValue, OpcError> {
    let variant = match value {
        ItemValue::Text(text) => Variant::from(text.as_str()),
        ItemValue::DoubleArray(values) => Variant::from(values.clone()),
    };
    Ok(WriteValue {
        node_id: parse_node_id(node_id)?,
        attribute_id: AttributeId::Value as u32,
        index_range: UAString::null(),
        value: DataValue::value_only(variant),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pki: &std::path::Path) -> OpcSettings {
        OpcSettings {
            // Port 1 is never an OPC UA server; connects fail fast.
            endpoint_url: "opc.tcp://127.0.0.1:1".to_string(),
            pki_dir: pki.to_path_buf(),
            ..OpcSettings::default()
        }
    }

    #[test]
    fn operations_require_a_connection() {
        let dir = tempfile::tempdir().unwrap();
        let client = OpcClient::new(settings(dir.path()));

        assert!(!client.is_connected());
        assert!(matches!(
            client.write_single("ns=2;s=x", &ItemValue::Text("v".to_string())),
            Err(OpcError::NotConnected)
        ));
        assert!(matches!(
            client.write_batch(&[]),
            Err(OpcError::NotConnected)
        ));
        assert!(matches!(
            client.read_single("ns=2;s=x"),
            Err(OpcError::NotConnected)
        ));
        assert!(matches!(client.browse_root(), Err(OpcError::NotConnected)));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = OpcClient::new(settings(dir.path()));
        client.disconnect();
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[test]
    fn failed_connect_leaves_client_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = OpcClient::new(settings(dir.path()));

        assert!(client.connect().is_err());
        assert!(!client.is_connected());

        // Disconnect after a failed connect is a safe no-op, and a second
        // attempt is not blocked by the first failure.
        client.disconnect();
        assert!(client.connect().is_err());
        assert!(!client.is_connected());
    }

    #[test]
    fn batch_outcome_aggregates_per_item_results() {
        let outcome = BatchOutcome {
            outcomes: vec![
                ItemOutcome {
                    node_id: "ns=2;s=a".to_string(),
                    description: "A".to_string(),
                    good: true,
                    status: "Good".to_string(),
                },
                ItemOutcome {
                    node_id: "ns=2;s=b".to_string(),
                    description: "B".to_string(),
                    good: false,
                    status: "BadNodeIdUnknown".to_string(),
                },
            ],
        };
        assert!(!outcome.all_good());
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 1);

        assert!(BatchOutcome::default().all_good());
    }

    #[test]
    fn unparseable_node_id_is_rejected_at_encoding() {
        assert!(matches!(
            build_write_value("", &ItemValue::Text("v".to_string())),
            Err(OpcError::InvalidNodeId(_))
        ));
    }
}

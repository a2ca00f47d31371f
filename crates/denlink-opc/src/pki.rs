//! PKI directory bootstrap for the client certificate store.

use std::path::Path;

use tracing::debug;

use crate::error::OpcError;

/// Subdirectories the `opcua` client expects under its PKI root.
const PKI_SUBDIRS: [&str; 4] = ["own", "private", "trusted", "rejected"];

/// Create the PKI directory tree if any part of it is missing. The client
/// generates its sample keypair into `own`/`private` on first connect; this
/// only guarantees the directories exist so that generation can succeed.
pub fn ensure_pki_dirs(pki_dir: &Path) -> Result<(), OpcError> {
    for sub in PKI_SUBDIRS {
        std::fs::create_dir_all(pki_dir.join(sub))?;
    }
    debug!("PKI directories ready under {}", pki_dir.display());
    Ok(())
}

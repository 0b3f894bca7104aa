//! Discovery of the namespace Jobs are created in

use std::path::Path;

use tracing::debug;

use cetok_common::SERVICE_ACCOUNT_NAMESPACE_PATH;

use crate::error::ReceiverError;

/// Resolve the target namespace.
///
/// An explicit, non-blank value wins; otherwise the pod's service account
/// namespace file is read.
pub fn resolve_namespace(explicit: Option<&str>) -> Result<String, ReceiverError> {
    if let Some(ns) = explicit.map(str::trim).filter(|ns| !ns.is_empty()) {
        debug!(namespace = %ns, "using configured namespace");
        return Ok(ns.to_string());
    }
    read_namespace_file(Path::new(SERVICE_ACCOUNT_NAMESPACE_PATH))
}

/// Read a namespace from `path`, trimming surrounding whitespace
pub fn read_namespace_file(path: &Path) -> Result<String, ReceiverError> {
    let contents =
        std::fs::read_to_string(path).map_err(|source| ReceiverError::NamespaceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    match contents.trim() {
        "" => Err(ReceiverError::NamespaceEmpty {
            path: path.to_path_buf(),
        }),
        ns => Ok(ns.to_string()),
    }
}
